//! Role checks for the treasury's three privileged wallets.
//!
//! Every privileged handler resolves its signer into a [`Caller`] and asks the
//! config whether that caller holds the needed [`Role`].

use {
    crate::{error::TreasuryError, state::GlobalConfig},
    solana_instruction::error::InstructionError,
    solana_program_runtime::invoke_context::InvokeContext,
    solana_pubkey::Pubkey,
    solana_transaction_context::IndexOfAccount,
};

/// Role wallets recorded in [`GlobalConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Bot,
    Dev,
}

/// Identity that signed the current instruction. Only constructible from a
/// signing instruction account, so holding a `Caller` proves the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(Pubkey);

impl Caller {
    pub fn from_signer(
        invoke_context: &InvokeContext,
        index_in_instruction: IndexOfAccount,
    ) -> Result<Self, InstructionError> {
        let instruction_context = invoke_context
            .transaction_context
            .get_current_instruction_context()?;
        if !instruction_context.is_instruction_account_signer(index_in_instruction)? {
            return Err(InstructionError::MissingRequiredSignature);
        }
        Ok(Self(
            *instruction_context.get_key_of_instruction_account(index_in_instruction)?,
        ))
    }

    pub fn pubkey(&self) -> &Pubkey {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn new_for_tests(pubkey: Pubkey) -> Self {
        Self(pubkey)
    }
}

impl GlobalConfig {
    pub fn role_wallet(&self, role: Role) -> &Pubkey {
        match role {
            Role::Admin => &self.admin_wallet,
            Role::Bot => &self.bot_wallet,
            Role::Dev => &self.dev_wallet,
        }
    }

    /// The one authorization guard: `caller` must be the wallet holding `role`.
    pub fn authorize(&self, role: Role, caller: &Caller) -> Result<(), TreasuryError> {
        if self.role_wallet(role) == caller.pubkey() {
            Ok(())
        } else {
            Err(TreasuryError::Unauthorized)
        }
    }

    /// Value-moving operations refuse to run while the emergency flag is set.
    pub fn ensure_operational(&self) -> Result<(), TreasuryError> {
        if self.emergency_flag {
            Err(TreasuryError::EmergencyHalt)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    fn config() -> GlobalConfig {
        GlobalConfig {
            admin_wallet: Pubkey::new_from_array([1; 32]),
            bot_wallet: Pubkey::new_from_array([2; 32]),
            dev_wallet: Pubkey::new_from_array([3; 32]),
            fund_wallet: Pubkey::new_from_array([4; 32]),
            token_mint_address: Pubkey::new_from_array([5; 32]),
            sale_fee: 50,
            emergency_flag: false,
            bump: 255,
        }
    }

    #[test_case(Role::Admin, 1, true ; "admin as admin")]
    #[test_case(Role::Admin, 3, false ; "dev as admin")]
    #[test_case(Role::Bot, 2, true ; "bot as bot")]
    #[test_case(Role::Bot, 1, false ; "admin as bot")]
    #[test_case(Role::Dev, 3, true ; "dev as dev")]
    #[test_case(Role::Dev, 4, false ; "fund wallet as dev")]
    fn test_authorize(role: Role, signer: u8, allowed: bool) {
        let caller = Caller::new_for_tests(Pubkey::new_from_array([signer; 32]));
        let expected = if allowed {
            Ok(())
        } else {
            Err(TreasuryError::Unauthorized)
        };
        assert_eq!(config().authorize(role, &caller), expected);
    }

    #[test]
    fn test_emergency_flag() {
        let mut config = config();
        assert_eq!(config.ensure_operational(), Ok(()));
        config.emergency_flag = true;
        assert_eq!(config.ensure_operational(), Err(TreasuryError::EmergencyHalt));
    }
}
