//! Account state types for the WIN treasury program.
//!
//! Every record is Borsh-serialised behind a one-byte discriminator so that a
//! record can never be mistaken for another record, an empty account, or data
//! written by a different program.

use {
    crate::{constants::MAX_SALE_FEE, error::TreasuryError, pda::VaultKind},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

pub const GLOBAL_CONFIG_DISCRIMINATOR: u8 = 1;
pub const VAULT_REGISTRY_DISCRIMINATOR: u8 = 2;
pub const MERKLE_ROOT_DISCRIMINATOR: u8 = 3;
pub const CLAIM_STATUS_DISCRIMINATOR: u8 = 4;
pub const USER_DETAILS_DISCRIMINATOR: u8 = 5;

/// A program-owned record stored at a derived address.
pub trait Record: BorshSerialize + BorshDeserialize {
    const DISCRIMINATOR: u8;

    /// Discriminator plus Borsh payload.
    const SERIALIZED_SIZE: usize;

    /// Whether an account owned by `owner` and holding `data` already stores
    /// this record. Lamports alone never count: anyone can fund an address.
    fn is_initialized(owner: &Pubkey, data: &[u8]) -> bool {
        owner == &crate::id() && data.first() == Some(&Self::DISCRIMINATOR)
    }

    /// Deserialise from raw account data (expects leading discriminator byte).
    fn read_from(data: &[u8]) -> Result<Self, std::io::Error> {
        match data.split_first() {
            Some((discriminator, mut payload)) if *discriminator == Self::DISCRIMINATOR => {
                BorshDeserialize::deserialize_reader(&mut payload)
            }
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "missing or invalid record discriminator",
            )),
        }
    }

    /// Serialise into raw account data (prepends discriminator byte).
    fn write_to(&self, data: &mut [u8]) -> Result<(), std::io::Error> {
        if data.len() < Self::SERIALIZED_SIZE {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "account data buffer too small",
            ));
        }
        data[0] = Self::DISCRIMINATOR;
        let mut cursor = &mut data[1..];
        BorshSerialize::serialize(self, &mut cursor)
    }

    fn to_account_data(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut data = vec![0; Self::SERIALIZED_SIZE];
        self.write_to(&mut data)?;
        Ok(data)
    }
}

/// Singleton holding role wallets, the token identity and the kill switch.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GlobalConfig {
    /// Initializer of the config; creates registry structures and
    /// distributes supply.
    pub admin_wallet: Pubkey,

    /// Sends airdrops out of the vaults.
    pub bot_wallet: Pubkey,

    /// Authorises withdrawals.
    pub dev_wallet: Pubkey,

    /// Receives everything withdrawn.
    pub fund_wallet: Pubkey,

    pub token_mint_address: Pubkey,

    /// Thousandths of a sale price, at most [`MAX_SALE_FEE`].
    pub sale_fee: u16,

    pub emergency_flag: bool,

    pub bump: u8,
}

impl Record for GlobalConfig {
    const DISCRIMINATOR: u8 = GLOBAL_CONFIG_DISCRIMINATOR;
    const SERIALIZED_SIZE: usize = 1 + 32 * 5 + 2 + 1 + 1;
}

impl GlobalConfig {
    pub fn validate_sale_fee(sale_fee: u16) -> Result<(), TreasuryError> {
        if sale_fee > MAX_SALE_FEE {
            Err(TreasuryError::InvalidSaleFee)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct VaultEntry {
    pub address: Pubkey,
    pub bump: u8,
}

/// Written at the vault authority address in the same instruction that
/// creates every vault, so its presence means the whole set exists.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct VaultRegistry {
    pub authority_bump: u8,
    pub vaults: [VaultEntry; 5],
    pub ready: bool,
}

impl Record for VaultRegistry {
    const DISCRIMINATOR: u8 = VAULT_REGISTRY_DISCRIMINATOR;
    const SERIALIZED_SIZE: usize = 1 + 1 + (32 + 1) * 5 + 1;
}

impl VaultRegistry {
    pub fn vault(&self, kind: VaultKind) -> &VaultEntry {
        &self.vaults[kind.index()]
    }
}

/// Commitment to the allowlist. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MerkleRoot {
    pub root: [u8; 32],
    pub bump: u8,
}

impl Record for MerkleRoot {
    const DISCRIMINATOR: u8 = MERKLE_ROOT_DISCRIMINATOR;
    const SERIALIZED_SIZE: usize = 1 + 32 + 1;
}

/// Marker created by a successful claim; its existence blocks a replay.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ClaimStatus {
    pub claimant: Pubkey,
    /// Root the proof was checked against.
    pub root: [u8; 32],
    pub claimed_slot: u64,
    pub bump: u8,
}

impl Record for ClaimStatus {
    const DISCRIMINATOR: u8 = CLAIM_STATUS_DISCRIMINATOR;
    const SERIALIZED_SIZE: usize = 1 + 32 + 32 + 8 + 1;
}

/// Reward buckets tracked per user, each paid out of one vault.
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
pub enum RewardKind {
    Airdrop,
    GameReward,
    Dao,
    Contributors,
}

impl RewardKind {
    pub const ALL: [RewardKind; 4] = [
        RewardKind::Airdrop,
        RewardKind::GameReward,
        RewardKind::Dao,
        RewardKind::Contributors,
    ];

    pub fn vault(self) -> VaultKind {
        match self {
            RewardKind::Airdrop => VaultKind::Airdrop,
            RewardKind::GameReward => VaultKind::PlayToEarn,
            RewardKind::Dao => VaultKind::DaoTreasury,
            RewardKind::Contributors => VaultKind::Contributors,
        }
    }
}

/// Rewards the bot has credited to one wallet and not yet paid out.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserDetails {
    pub user_wallet: Pubkey,
    pub airdrop_reward: u64,
    pub game_reward: u64,
    pub dao_reward: u64,
    pub contributors_reward: u64,

    /// Unix timestamp of the last payout, 0 before the first.
    pub last_reward_claimed_at: i64,

    /// Timestamp of the newest game distribution credited. Starts at the
    /// record's creation time, so rounds that predate the record are refused.
    pub last_game_distributed_at: i64,

    pub bump: u8,
}

impl Record for UserDetails {
    const DISCRIMINATOR: u8 = USER_DETAILS_DISCRIMINATOR;
    const SERIALIZED_SIZE: usize = 1 + 32 + 8 * 4 + 8 + 8 + 1;
}

impl UserDetails {
    pub fn new(user_wallet: Pubkey, bump: u8, created_at: i64) -> Self {
        Self {
            user_wallet,
            airdrop_reward: 0,
            game_reward: 0,
            dao_reward: 0,
            contributors_reward: 0,
            last_reward_claimed_at: 0,
            last_game_distributed_at: created_at,
            bump,
        }
    }

    pub fn reward(&self, kind: RewardKind) -> u64 {
        match kind {
            RewardKind::Airdrop => self.airdrop_reward,
            RewardKind::GameReward => self.game_reward,
            RewardKind::Dao => self.dao_reward,
            RewardKind::Contributors => self.contributors_reward,
        }
    }

    fn reward_mut(&mut self, kind: RewardKind) -> &mut u64 {
        match kind {
            RewardKind::Airdrop => &mut self.airdrop_reward,
            RewardKind::GameReward => &mut self.game_reward,
            RewardKind::Dao => &mut self.dao_reward,
            RewardKind::Contributors => &mut self.contributors_reward,
        }
    }

    /// Adds `amount` to the `kind` bucket. Game rewards carry the time of
    /// their distribution round, which may not go backwards.
    pub fn credit(
        &mut self,
        kind: RewardKind,
        amount: u64,
        distributed_at: i64,
    ) -> Result<(), TreasuryError> {
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount);
        }
        if kind == RewardKind::GameReward {
            if distributed_at < self.last_game_distributed_at {
                return Err(TreasuryError::StaleDistribution);
            }
            self.last_game_distributed_at = distributed_at;
        }
        let bucket = self.reward_mut(kind);
        *bucket = bucket
            .checked_add(amount)
            .ok_or(TreasuryError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Empties the `kind` bucket and returns what it held.
    pub fn take_reward(&mut self, kind: RewardKind, now: i64) -> Result<u64, TreasuryError> {
        let amount = std::mem::take(self.reward_mut(kind));
        if amount == 0 {
            return Err(TreasuryError::NothingToClaim);
        }
        self.last_reward_claimed_at = now;
        Ok(amount)
    }
}
