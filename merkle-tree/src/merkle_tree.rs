use sha3::{Digest, Keccak256};

pub const HASH_BYTES: usize = 32;

pub type MerkleHash = [u8; HASH_BYTES];

/// Keccak-256 over the concatenation of `vals`.
pub fn hashv(vals: &[&[u8]]) -> MerkleHash {
    let mut hasher = Keccak256::new();
    for val in vals {
        hasher.update(val);
    }
    hasher.finalize().into()
}

/// Domain-separated leaf hash: `keccak(prefix || fields[0] || fields[1] ..)`.
pub fn hash_leaf(prefix: &[u8], fields: &[&[u8]]) -> MerkleHash {
    let mut hasher = Keccak256::new();
    hasher.update(prefix);
    for field in fields {
        hasher.update(field);
    }
    hasher.finalize().into()
}

/// Combines two nodes, smaller hash first.
pub fn hash_pair(a: &MerkleHash, b: &MerkleHash) -> MerkleHash {
    if a <= b {
        hashv(&[a, b])
    } else {
        hashv(&[b, a])
    }
}

/// Folds `proof` into `leaf` and compares the result against `root`.
pub fn verify_proof(proof: &[MerkleHash], root: &MerkleHash, leaf: &MerkleHash) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |node, sibling| hash_pair(&node, sibling));
    computed == *root
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` holds the sorted leaves, the last level holds the root.
    levels: Vec<Vec<MerkleHash>>,
}

impl MerkleTree {
    pub fn new(leaves: &[MerkleHash]) -> Self {
        let mut first = leaves.to_vec();
        first.sort_unstable();
        first.dedup();
        if first.is_empty() {
            return Self::default();
        }

        let mut levels = vec![first];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let next: Vec<MerkleHash> = level
                .chunks(2)
                .filter_map(|pair| pair.iter().copied().reduce(|l, r| hash_pair(&l, &r)))
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    /// `None` for an empty leaf set.
    pub fn root(&self) -> Option<MerkleHash> {
        self.levels.last().and_then(|level| level.first()).copied()
    }

    /// Number of distinct leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Sibling hashes from the leaf level upwards, or `None` if `leaf` is not
    /// part of the tree. Levels where the node was promoted add nothing.
    pub fn find_proof(&self, leaf: &MerkleHash) -> Option<Vec<MerkleHash>> {
        let mut index = self.levels.first()?.binary_search(leaf).ok()?;
        let (_root_level, lower_levels) = self.levels.split_last()?;

        let mut proof = Vec::with_capacity(lower_levels.len());
        for level in lower_levels {
            if let Some(sibling) = level.get(index ^ 1) {
                proof.push(*sibling);
            }
            index /= 2;
        }
        Some(proof)
    }
}
