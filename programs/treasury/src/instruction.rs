//! Instruction definitions for the WIN treasury program.
//!
//! All instructions are serialised / deserialised via `bincode` to stay
//! consistent with the runtime's other builtins. Every variant has a builder
//! below that fills in the derived accounts.

use {
    crate::{
        id,
        pda::{
            claim_status_address, community_vault_address, config_address, merkle_root_address,
            user_details_address, vault_address, VaultAuthority, VaultKind,
        },
        state::RewardKind,
    },
    serde::{Deserialize, Serialize},
    solana_instruction::{AccountMeta, Instruction},
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
    spl_associated_token_account_interface::{
        address::get_associated_token_address, instruction::create_associated_token_account_idempotent,
    },
};

/// Instructions supported by the WIN treasury program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasuryInstruction {
    /// Creates the `GlobalConfig` singleton. The signer becomes the admin.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` Admin, pays for the config account.
    /// 1. `[]`                 Token mint.
    /// 2. `[writable]`         Config address (`win`).
    /// 3. `[]`                 System program.
    Initialize {
        bot_wallet: Pubkey,
        dev_wallet: Pubkey,
        fund_wallet: Pubkey,
        sale_fee: u16,
    },

    /// # Accounts expected
    ///
    /// 0. `[signer]`   Admin.
    /// 1. `[writable]` Config.
    UpdateEmergencyFlag { emergency_flag: bool },

    /// Replaces the fund wallet and the sale fee.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   Admin.
    /// 1. `[writable]` Config.
    UpdateByAdmin { fund_wallet: Pubkey, sale_fee: u16 },

    /// Rotates the bot wallet and sets the emergency flag.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   Dev.
    /// 1. `[writable]` Config.
    UpdateByDev {
        bot_wallet: Pubkey,
        emergency_flag: bool,
    },

    /// Creates every token vault and the vault registry in one step.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` Admin, pays for all accounts.
    /// 1. `[]`                 Config.
    /// 2. `[]`                 Token mint (must be the configured mint).
    /// 3. `[writable]`         Vault authority address (holds the registry).
    /// 4..=8. `[writable]`     Vaults, in `VaultKind::ALL` order.
    /// 9. `[]`                 System program.
    /// 10. `[]`                Token program.
    InitializePda,

    /// Moves `amount` from the admin's token account into a vault.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   Admin.
    /// 1. `[writable]` Admin token account.
    /// 2. `[writable]` Vault.
    /// 3. `[]`         Config.
    /// 4. `[]`         Vault authority.
    /// 5. `[]`         Token program.
    AssetsDistribution { amount: u64, vault: VaultKind },

    /// Moves `amount` from a vault to a token account of the fund wallet.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   Dev.
    /// 1. `[writable]` Recipient token account (owned by the fund wallet).
    /// 2. `[writable]` Vault.
    /// 3. `[]`         Config.
    /// 4. `[]`         Vault authority.
    /// 5. `[]`         Token program.
    WithdrawPdaToken { amount: u64, vault: VaultKind },

    /// Moves `amount` lamports from the community vault to the fund wallet.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   Dev.
    /// 1. `[writable]` Fund wallet.
    /// 2. `[writable]` Community vault.
    /// 3. `[]`         Config.
    /// 4. `[]`         System program.
    WithdrawPdaSol { amount: u64 },

    /// Moves `amount` from a vault to any token account of the configured
    /// mint.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   Bot.
    /// 1. `[writable]` User token account.
    /// 2. `[writable]` Vault.
    /// 3. `[]`         Config.
    /// 4. `[]`         Vault authority.
    /// 5. `[]`         Token program.
    AirdropToken { amount: u64, vault: VaultKind },

    /// Stores the allowlist root. Write-once.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` Admin, pays for the record.
    /// 1. `[writable]`         Merkle root address (`win-whitelist`).
    /// 2. `[]`                 Config.
    /// 3. `[]`                 System program.
    InitializeMerkle { root: [u8; 32] },

    /// Proves the signer is on the allowlist and records the claim.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` Claimant, pays for the claim marker.
    /// 1. `[writable]`         Claim status address of the claimant.
    /// 2. `[]`                 Merkle root.
    /// 3. `[]`                 Config.
    /// 4. `[]`                 System program.
    ClaimAllowlist { proof: Vec<[u8; 32]> },

    /// Opens the signer's reward ledger.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` User, pays for the record.
    /// 1. `[writable]`         User details of the signer.
    /// 2. `[]`                 Config.
    /// 3. `[]`                 System program.
    CreateUserDetailsByUser,

    /// Opens the reward ledger of `user_wallet` on the user's behalf.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` Bot, pays for the record.
    /// 1. `[writable]`         User details of `user_wallet`.
    /// 2. `[]`                 Config.
    /// 3. `[]`                 System program.
    CreateUserDetailsByBot { user_wallet: Pubkey },

    /// Credits `amount` to one reward bucket of `user_wallet`. For game
    /// rewards `distributed_at` is the time of the distribution round and
    /// must not precede the last round credited.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   Bot.
    /// 1. `[writable]` User details of `user_wallet`.
    /// 2. `[]`         Config.
    UpdateUserReward {
        user_wallet: Pubkey,
        kind: RewardKind,
        amount: u64,
        distributed_at: i64,
    },

    /// Pays out and zeroes one reward bucket of the signing user. The bot
    /// co-signs.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   User.
    /// 1. `[signer]`   Bot.
    /// 2. `[writable]` User token account.
    /// 3. `[writable]` Vault paying `kind`.
    /// 4. `[writable]` User details of the user.
    /// 5. `[]`         Config.
    /// 6. `[]`         Vault authority.
    /// 7. `[]`         Token program.
    ClaimUserReward { kind: RewardKind },
}

pub fn initialize(
    admin: &Pubkey,
    mint: &Pubkey,
    bot_wallet: &Pubkey,
    dev_wallet: &Pubkey,
    fund_wallet: &Pubkey,
    sale_fee: u16,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TreasuryInstruction::Initialize {
            bot_wallet: *bot_wallet,
            dev_wallet: *dev_wallet,
            fund_wallet: *fund_wallet,
            sale_fee,
        },
        vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(config_address().0, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}

fn config_update(signer: &Pubkey, instruction: &TreasuryInstruction) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        instruction,
        vec![
            AccountMeta::new_readonly(*signer, true),
            AccountMeta::new(config_address().0, false),
        ],
    )
}

pub fn update_emergency_flag(admin: &Pubkey, emergency_flag: bool) -> Instruction {
    config_update(admin, &TreasuryInstruction::UpdateEmergencyFlag { emergency_flag })
}

pub fn update_by_admin(admin: &Pubkey, fund_wallet: &Pubkey, sale_fee: u16) -> Instruction {
    config_update(
        admin,
        &TreasuryInstruction::UpdateByAdmin {
            fund_wallet: *fund_wallet,
            sale_fee,
        },
    )
}

pub fn update_by_dev(dev: &Pubkey, bot_wallet: &Pubkey, emergency_flag: bool) -> Instruction {
    config_update(
        dev,
        &TreasuryInstruction::UpdateByDev {
            bot_wallet: *bot_wallet,
            emergency_flag,
        },
    )
}

pub fn initialize_pda(admin: &Pubkey, mint: &Pubkey) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new_readonly(config_address().0, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(VaultAuthority::derive().address, false),
    ];
    accounts.extend(
        VaultKind::ALL
            .iter()
            .map(|kind| AccountMeta::new(vault_address(*kind).0, false)),
    );
    accounts.push(AccountMeta::new_readonly(system_program::ID, false));
    accounts.push(AccountMeta::new_readonly(spl_token_interface::ID, false));
    Instruction::new_with_bincode(id(), &TreasuryInstruction::InitializePda, accounts)
}

/// Shared layout of the three vault-touching token instructions.
fn vault_transfer(
    signer: &Pubkey,
    counterparty: &Pubkey,
    vault: VaultKind,
    instruction: &TreasuryInstruction,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        instruction,
        vec![
            AccountMeta::new_readonly(*signer, true),
            AccountMeta::new(*counterparty, false),
            AccountMeta::new(vault_address(vault).0, false),
            AccountMeta::new_readonly(config_address().0, false),
            AccountMeta::new_readonly(VaultAuthority::derive().address, false),
            AccountMeta::new_readonly(spl_token_interface::ID, false),
        ],
    )
}

pub fn assets_distribution(
    admin: &Pubkey,
    admin_token_account: &Pubkey,
    vault: VaultKind,
    amount: u64,
) -> Instruction {
    vault_transfer(
        admin,
        admin_token_account,
        vault,
        &TreasuryInstruction::AssetsDistribution { amount, vault },
    )
}

pub fn withdraw_pda_token(
    dev: &Pubkey,
    recipient_token_account: &Pubkey,
    vault: VaultKind,
    amount: u64,
) -> Instruction {
    vault_transfer(
        dev,
        recipient_token_account,
        vault,
        &TreasuryInstruction::WithdrawPdaToken { amount, vault },
    )
}

/// Creates the fund wallet's associated token account if it is missing, then
/// withdraws into it. The dev wallet pays for the account.
pub fn withdraw_pda_token_to_fund_wallet(
    dev: &Pubkey,
    fund_wallet: &Pubkey,
    mint: &Pubkey,
    vault: VaultKind,
    amount: u64,
) -> Vec<Instruction> {
    vec![
        create_associated_token_account_idempotent(dev, fund_wallet, mint, &spl_token_interface::ID),
        withdraw_pda_token(
            dev,
            &get_associated_token_address(fund_wallet, mint),
            vault,
            amount,
        ),
    ]
}

pub fn withdraw_pda_sol(dev: &Pubkey, fund_wallet: &Pubkey, amount: u64) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TreasuryInstruction::WithdrawPdaSol { amount },
        vec![
            AccountMeta::new_readonly(*dev, true),
            AccountMeta::new(*fund_wallet, false),
            AccountMeta::new(community_vault_address().0, false),
            AccountMeta::new_readonly(config_address().0, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}

pub fn airdrop_token(
    bot: &Pubkey,
    user_token_account: &Pubkey,
    vault: VaultKind,
    amount: u64,
) -> Instruction {
    vault_transfer(
        bot,
        user_token_account,
        vault,
        &TreasuryInstruction::AirdropToken { amount, vault },
    )
}

pub fn initialize_merkle(admin: &Pubkey, root: [u8; 32]) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TreasuryInstruction::InitializeMerkle { root },
        vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(merkle_root_address().0, false),
            AccountMeta::new_readonly(config_address().0, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}

pub fn claim_allowlist(claimant: &Pubkey, proof: Vec<[u8; 32]>) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TreasuryInstruction::ClaimAllowlist { proof },
        vec![
            AccountMeta::new(*claimant, true),
            AccountMeta::new(claim_status_address(claimant).0, false),
            AccountMeta::new_readonly(merkle_root_address().0, false),
            AccountMeta::new_readonly(config_address().0, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}

fn create_user_details(
    payer: &Pubkey,
    user_wallet: &Pubkey,
    instruction: &TreasuryInstruction,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        instruction,
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(user_details_address(user_wallet).0, false),
            AccountMeta::new_readonly(config_address().0, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}

pub fn create_user_details_by_user(user_wallet: &Pubkey) -> Instruction {
    create_user_details(
        user_wallet,
        user_wallet,
        &TreasuryInstruction::CreateUserDetailsByUser,
    )
}

pub fn create_user_details_by_bot(bot: &Pubkey, user_wallet: &Pubkey) -> Instruction {
    create_user_details(
        bot,
        user_wallet,
        &TreasuryInstruction::CreateUserDetailsByBot {
            user_wallet: *user_wallet,
        },
    )
}

pub fn update_user_reward(
    bot: &Pubkey,
    user_wallet: &Pubkey,
    kind: RewardKind,
    amount: u64,
    distributed_at: i64,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TreasuryInstruction::UpdateUserReward {
            user_wallet: *user_wallet,
            kind,
            amount,
            distributed_at,
        },
        vec![
            AccountMeta::new_readonly(*bot, true),
            AccountMeta::new(user_details_address(user_wallet).0, false),
            AccountMeta::new_readonly(config_address().0, false),
        ],
    )
}

pub fn claim_user_reward(
    user_wallet: &Pubkey,
    bot: &Pubkey,
    user_token_account: &Pubkey,
    kind: RewardKind,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TreasuryInstruction::ClaimUserReward { kind },
        vec![
            AccountMeta::new_readonly(*user_wallet, true),
            AccountMeta::new_readonly(*bot, true),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(vault_address(kind.vault()).0, false),
            AccountMeta::new(user_details_address(user_wallet).0, false),
            AccountMeta::new_readonly(config_address().0, false),
            AccountMeta::new_readonly(VaultAuthority::derive().address, false),
            AccountMeta::new_readonly(spl_token_interface::ID, false),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_bincode() {
        let instruction = assets_distribution(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            VaultKind::PlayToEarn,
            400_000_000,
        );
        // u32 variant index, then the fields in order.
        let mut expected = 5u32.to_le_bytes().to_vec();
        expected.extend_from_slice(&400_000_000u64.to_le_bytes());
        expected.extend_from_slice(&3u32.to_le_bytes());
        assert_eq!(instruction.data, expected);

        let decoded: TreasuryInstruction = bincode::deserialize(&instruction.data).unwrap();
        assert_eq!(
            decoded,
            TreasuryInstruction::AssetsDistribution {
                amount: 400_000_000,
                vault: VaultKind::PlayToEarn
            }
        );
    }

    #[test]
    fn test_initialize_pda_accounts() {
        let admin = Pubkey::new_unique();
        let instruction = initialize_pda(&admin, &Pubkey::new_unique());
        assert_eq!(instruction.program_id, id());
        assert_eq!(instruction.accounts.len(), 11);
        assert!(instruction.accounts[0].is_signer && instruction.accounts[0].is_writable);
        for (meta, kind) in instruction.accounts[4..9].iter().zip(VaultKind::ALL) {
            assert_eq!(meta.pubkey, vault_address(kind).0);
            assert!(meta.is_writable);
        }
        assert_eq!(instruction.accounts[9].pubkey, system_program::ID);
        assert_eq!(instruction.accounts[10].pubkey, spl_token_interface::ID);
    }

    #[test]
    fn test_withdraw_to_fund_wallet_creates_account_first() {
        let (dev, fund, mint) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let instructions =
            withdraw_pda_token_to_fund_wallet(&dev, &fund, &mint, VaultKind::DaoTreasury, 10);
        assert_eq!(instructions.len(), 2);
        assert_eq!(
            instructions[0].program_id,
            spl_associated_token_account_interface::program::ID
        );
        assert_eq!(
            instructions[1].accounts[1].pubkey,
            get_associated_token_address(&fund, &mint)
        );
    }

    #[test]
    fn test_claim_accounts_are_claimant_specific() {
        let claimant = Pubkey::new_unique();
        let instruction = claim_allowlist(&claimant, vec![[1; 32]]);
        assert_eq!(instruction.accounts[1].pubkey, claim_status_address(&claimant).0);
    }

    #[test]
    fn test_reward_claim_pays_from_the_matching_vault() {
        let (user, bot) = (Pubkey::new_unique(), Pubkey::new_unique());
        let instruction =
            claim_user_reward(&user, &bot, &Pubkey::new_unique(), RewardKind::GameReward);
        assert_eq!(
            instruction.accounts[3].pubkey,
            vault_address(VaultKind::PlayToEarn).0
        );
        assert_eq!(instruction.accounts[4].pubkey, user_details_address(&user).0);
        assert!(instruction.accounts[0].is_signer && instruction.accounts[1].is_signer);

        let by_bot = create_user_details_by_bot(&bot, &user);
        assert_eq!(by_bot.accounts[0].pubkey, bot);
        assert_eq!(by_bot.accounts[1].pubkey, user_details_address(&user).0);
    }
}
