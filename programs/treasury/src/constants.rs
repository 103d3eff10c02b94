//! Constants for the WIN treasury program.

// ── Derivation seeds ─────────────────────────────────────────────────────────

/// Seed of the `GlobalConfig` singleton.
pub const WIN_SEED: &[u8] = b"win";

/// Seed of the vault authority. The registry record lives at this address.
pub const VAULT_AUTHORITY_SEED: &[u8] = b"win-airdrop-auth";

pub const AIRDROP_VAULT_SEED: &[u8] = b"win-airdrop-vault";
pub const DAO_TREASURY_VAULT_SEED: &[u8] = b"win-airdrop-dao-treasury";
pub const CONTRIBUTORS_VAULT_SEED: &[u8] = b"win-airdrop-contributors";
pub const PLAY_TO_EARN_VAULT_SEED: &[u8] = b"win-airdrop-p2e";
pub const GAME_WIN_POOL_VAULT_SEED: &[u8] = b"win-game-win-pool";

/// Seed of the system-owned lamport vault drained by `WithdrawPdaSol`.
pub const COMMUNITY_SEED: &[u8] = b"win-community";

/// Seed of the `MerkleRoot` singleton.
pub const MERKLE_ROOT_SEED: &[u8] = b"win-whitelist";

/// Seed prefix of per-claimant `ClaimStatus` markers.
pub const CLAIM_STATUS_SEED: &[u8] = b"win-whitelist-claim";

/// Seed prefix of per-wallet `UserDetails` reward records.
pub const USER_DETAILS_SEED: &[u8] = b"win-user-details";

/// Domain prefix hashed in front of every allowlist leaf.
pub const ALLOWLIST_LEAF_PREFIX: &[u8] = b"win-whitelist-user";

// ── Fees ─────────────────────────────────────────────────────────────────────

/// `sale_fee` is expressed in thousandths (50 means 5%) and cannot exceed the
/// whole price.
pub const MAX_SALE_FEE: u16 = 1_000;

// ── Tokenomics ───────────────────────────────────────────────────────────────

pub const TOTAL_BPS: u16 = 10_000;

/// Units minted at launch.
pub const DEFAULT_TOTAL_SUPPLY: u64 = 1_000_000_000;

pub const AIRDROP_BPS: u16 = 500; //  5%
pub const DAO_TREASURY_BPS: u16 = 1_000; // 10%
pub const CONTRIBUTORS_BPS: u16 = 1_000; // 10%
pub const PLAY_TO_EARN_BPS: u16 = 4_000; // 40%
pub const GAME_WIN_POOL_BPS: u16 = 0;

// ── Limits ───────────────────────────────────────────────────────────────────

/// Longest proof `ClaimAllowlist` accepts; enough for 2^32 leaves.
pub const MAX_PROOF_LEN: usize = 32;

/// Compute units charged for every treasury instruction, before nested calls.
pub const DEFAULT_COMPUTE_UNITS: u64 = 1_500;
