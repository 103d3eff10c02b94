//! Supply split across the token vaults.
//!
//! The split is an off-ledger concern: the program only moves what
//! `AssetsDistribution` is told to move. This module computes the amounts and
//! the instructions that move them.

use {
    crate::{constants::*, error::ConfigError, instruction::assets_distribution, pda::VaultKind},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_instruction::Instruction,
    solana_pubkey::Pubkey,
};

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct TokenomicsConfig {
    pub total_supply: u64,
    pub airdrop_bps: u16,
    pub dao_treasury_bps: u16,
    pub contributors_bps: u16,
    pub play_to_earn_bps: u16,
    pub game_win_pool_bps: u16,
}

impl Default for TokenomicsConfig {
    fn default() -> Self {
        Self {
            total_supply: DEFAULT_TOTAL_SUPPLY,
            airdrop_bps: AIRDROP_BPS,
            dao_treasury_bps: DAO_TREASURY_BPS,
            contributors_bps: CONTRIBUTORS_BPS,
            play_to_earn_bps: PLAY_TO_EARN_BPS,
            game_win_pool_bps: GAME_WIN_POOL_BPS,
        }
    }
}

impl TokenomicsConfig {
    pub fn bps(&self, kind: VaultKind) -> u16 {
        match kind {
            VaultKind::Airdrop => self.airdrop_bps,
            VaultKind::DaoTreasury => self.dao_treasury_bps,
            VaultKind::Contributors => self.contributors_bps,
            VaultKind::PlayToEarn => self.play_to_earn_bps,
            VaultKind::GameWinPool => self.game_win_pool_bps,
        }
    }

    fn total_bps(&self) -> u32 {
        VaultKind::ALL
            .iter()
            .map(|kind| u32::from(self.bps(*kind)))
            .sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_supply == 0 {
            return Err(ConfigError::ZeroSupply);
        }
        let total_bps = self.total_bps();
        if total_bps > u32::from(TOTAL_BPS) {
            return Err(ConfigError::OverAllocated(total_bps));
        }
        Ok(())
    }

    /// `total_supply * bps / 10000`, rounded down.
    pub fn allocation(&self, kind: VaultKind) -> u64 {
        let scaled = u128::from(self.total_supply) * u128::from(self.bps(kind));
        // bps is validated to at most TOTAL_BPS, so the quotient fits in u64.
        u64::try_from(scaled / u128::from(TOTAL_BPS)).unwrap_or(u64::MAX)
    }

    /// Supply left with the admin after every vault is funded.
    pub fn undistributed(&self) -> u64 {
        let distributed = VaultKind::ALL
            .iter()
            .fold(0u64, |sum, kind| sum.saturating_add(self.allocation(*kind)));
        self.total_supply.saturating_sub(distributed)
    }

    /// One `AssetsDistribution` per vault with a non-zero allocation.
    pub fn distribution_instructions(
        &self,
        admin: &Pubkey,
        admin_token_account: &Pubkey,
    ) -> Result<Vec<Instruction>, ConfigError> {
        self.validate()?;
        Ok(VaultKind::ALL
            .iter()
            .filter_map(|kind| {
                let amount = self.allocation(*kind);
                (amount > 0).then(|| assets_distribution(admin, admin_token_account, *kind, amount))
            })
            .collect())
    }
}
