//! Off-ledger side of the allowlist: turning wallets into leaves, a root and
//! per-wallet proofs that `ClaimAllowlist` accepts.

use {
    crate::constants::ALLOWLIST_LEAF_PREFIX,
    solana_pubkey::Pubkey,
    win_merkle_tree::{hash_leaf, MerkleHash, MerkleTree},
};

pub fn leaf_for(account: &Pubkey) -> MerkleHash {
    hash_leaf(ALLOWLIST_LEAF_PREFIX, &[account.as_ref()])
}

#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    tree: MerkleTree,
}

impl Allowlist {
    pub fn new<'a>(accounts: impl IntoIterator<Item = &'a Pubkey>) -> Self {
        let leaves: Vec<MerkleHash> = accounts.into_iter().map(leaf_for).collect();
        Self {
            tree: MerkleTree::new(&leaves),
        }
    }

    /// `None` when no account was listed.
    pub fn root(&self) -> Option<MerkleHash> {
        self.tree.root()
    }

    pub fn proof(&self, account: &Pubkey) -> Option<Vec<MerkleHash>> {
        self.tree.find_proof(&leaf_for(account))
    }

    pub fn len(&self) -> usize {
        self.tree.leaf_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use {super::*, win_merkle_tree::verify_proof};

    #[test]
    fn test_leaf_matches_prefixed_keccak() {
        let account = Pubkey::new_from_array([0xab; 32]);
        let mut preimage = b"win-whitelist-user".to_vec();
        preimage.extend_from_slice(&[0xab; 32]);
        assert_eq!(leaf_for(&account), win_merkle_tree::hashv(&[&preimage]));
    }

    #[test]
    fn test_members_prove_and_outsiders_do_not() {
        let members: Vec<Pubkey> = (0..10).map(|_| Pubkey::new_unique()).collect();
        let allowlist = Allowlist::new(&members);
        let root = allowlist.root().unwrap();
        assert_eq!(allowlist.len(), 10);

        for member in &members {
            let proof = allowlist.proof(member).unwrap();
            assert!(verify_proof(&proof, &root, &leaf_for(member)));
        }
        assert_eq!(allowlist.proof(&Pubkey::new_unique()), None);
    }

    #[test]
    fn test_root_ignores_listing_order() {
        let mut members: Vec<Pubkey> = (0..10).map(|_| Pubkey::new_unique()).collect();
        let root = Allowlist::new(&members).root();
        members.reverse();
        assert_eq!(Allowlist::new(&members).root(), root);

        let mut bytes = members[3].to_bytes();
        bytes[0] ^= 1;
        members[3] = Pubkey::new_from_array(bytes);
        assert_ne!(Allowlist::new(&members).root(), root);
    }

    #[test]
    fn test_empty_allowlist() {
        let allowlist = Allowlist::new(std::iter::empty());
        assert!(allowlist.is_empty());
        assert_eq!(allowlist.root(), None);
    }
}
