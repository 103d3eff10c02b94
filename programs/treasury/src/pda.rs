//! Address derivation for every account the treasury owns or signs for.
//!
//! All addresses are program derived: `find_program_address(seeds, id())`.
//! Nothing here touches account data, so clients and the processor share the
//! same functions.

use {
    crate::{constants::*, error::TreasuryError, id},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

/// Derives `(address, bump)` for `seeds` under the treasury program.
pub fn derive_address(seeds: &[&[u8]]) -> (Pubkey, u8) {
    Pubkey::find_program_address(seeds, &id())
}

pub fn config_address() -> (Pubkey, u8) {
    derive_address(&[WIN_SEED])
}

pub fn community_vault_address() -> (Pubkey, u8) {
    derive_address(&[COMMUNITY_SEED])
}

pub fn merkle_root_address() -> (Pubkey, u8) {
    derive_address(&[MERKLE_ROOT_SEED])
}

pub fn claim_status_address(claimant: &Pubkey) -> (Pubkey, u8) {
    derive_address(&[CLAIM_STATUS_SEED, claimant.as_ref()])
}

pub fn user_details_address(user_wallet: &Pubkey) -> (Pubkey, u8) {
    derive_address(&[USER_DETAILS_SEED, user_wallet.as_ref()])
}

pub fn vault_address(kind: VaultKind) -> (Pubkey, u8) {
    derive_address(&[kind.seed()])
}

/// Fails with `InvalidAddress` unless `key` is the derivation of `seeds`.
pub fn verify_derived(key: &Pubkey, seeds: &[&[u8]]) -> Result<u8, TreasuryError> {
    let (expected, bump) = derive_address(seeds);
    if *key == expected {
        Ok(bump)
    } else {
        Err(TreasuryError::InvalidAddress)
    }
}

/// Purpose-bound token vaults, in registry order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub enum VaultKind {
    Airdrop,
    DaoTreasury,
    Contributors,
    PlayToEarn,
    GameWinPool,
}

impl VaultKind {
    pub const ALL: [VaultKind; 5] = [
        VaultKind::Airdrop,
        VaultKind::DaoTreasury,
        VaultKind::Contributors,
        VaultKind::PlayToEarn,
        VaultKind::GameWinPool,
    ];

    pub fn seed(self) -> &'static [u8] {
        match self {
            VaultKind::Airdrop => AIRDROP_VAULT_SEED,
            VaultKind::DaoTreasury => DAO_TREASURY_VAULT_SEED,
            VaultKind::Contributors => CONTRIBUTORS_VAULT_SEED,
            VaultKind::PlayToEarn => PLAY_TO_EARN_VAULT_SEED,
            VaultKind::GameWinPool => GAME_WIN_POOL_VAULT_SEED,
        }
    }

    /// Position in [`Self::ALL`] and in the registry.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Signing capability over every token vault. Holds no secret: the runtime
/// accepts the address as a signer of a cross-program call because it is
/// derived from this program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultAuthority {
    pub address: Pubkey,
    pub bump: u8,
}

impl VaultAuthority {
    pub fn derive() -> Self {
        let (address, bump) = derive_address(&[VAULT_AUTHORITY_SEED]);
        Self { address, bump }
    }

    /// Rebuilds the capability from a stored bump, checking it still lands on
    /// `address`.
    pub fn from_bump(address: &Pubkey, bump: u8) -> Result<Self, TreasuryError> {
        let derived = Pubkey::create_program_address(&[VAULT_AUTHORITY_SEED, &[bump]], &id())
            .map_err(|_| TreasuryError::InvalidAddress)?;
        if derived != *address {
            return Err(TreasuryError::InvalidAddress);
        }
        Ok(Self {
            address: derived,
            bump,
        })
    }
}
