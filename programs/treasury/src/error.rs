//! Custom errors for the WIN treasury program.

use {
    num_derive::FromPrimitive, num_traits::FromPrimitive as _,
    solana_instruction::error::InstructionError, thiserror::Error,
};

/// Surfaced to callers as `InstructionError::Custom(code)`, `code` being the
/// discriminant below.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum TreasuryError {
    #[error("Account is already initialised")]
    AlreadyInitialized = 0,

    #[error("Account is not initialised")]
    NotInitialized,

    #[error("Signer does not hold the required role")]
    Unauthorized,

    #[error("Source holds less than the requested amount")]
    InsufficientBalance,

    #[error("Emergency flag is set")]
    EmergencyHalt,

    #[error("Account address does not match its derivation")]
    InvalidAddress,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Token account or mint does not match the configured mint")]
    InvalidMint,

    #[error("Token account is not owned by the expected wallet")]
    InvalidTokenOwner,

    #[error("Sale fee exceeds 1000")]
    InvalidSaleFee,

    #[error("Account is not owned by the treasury program")]
    InvalidAccountOwner,

    #[error("Account data is invalid or corrupted")]
    InvalidAccountData,

    #[error("Merkle proof does not lead to the stored root")]
    InvalidProof,

    #[error("Merkle proof has more than 32 siblings")]
    ProofTooLong,

    #[error("Allowlist entry has already been claimed")]
    AlreadyClaimed,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("No reward of this kind is waiting to be claimed")]
    NothingToClaim,

    #[error("Game reward round is older than the last one credited")]
    StaleDistribution,
}

impl From<TreasuryError> for InstructionError {
    fn from(error: TreasuryError) -> Self {
        InstructionError::Custom(error as u32)
    }
}

impl TreasuryError {
    /// Maps an `InstructionError::Custom` code back to the treasury error.
    pub fn decode_custom(error: &InstructionError) -> Option<Self> {
        match error {
            InstructionError::Custom(code) => Self::from_u32(*code),
            _ => None,
        }
    }
}

/// Problems with a [`TokenomicsConfig`](crate::tokenomics::TokenomicsConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("total supply must be greater than zero")]
    ZeroSupply,

    #[error("allocations sum to {0} bps, more than 10000")]
    OverAllocated(u32),
}

#[cfg(test)]
mod tests {
    use {super::*, assert_matches::assert_matches};

    #[test]
    fn test_custom_codes_are_stable() {
        assert_eq!(
            InstructionError::from(TreasuryError::AlreadyInitialized),
            InstructionError::Custom(0)
        );
        assert_eq!(
            InstructionError::from(TreasuryError::Unauthorized),
            InstructionError::Custom(2)
        );
        assert_eq!(
            InstructionError::from(TreasuryError::ArithmeticOverflow),
            InstructionError::Custom(15)
        );
        assert_eq!(
            InstructionError::from(TreasuryError::StaleDistribution),
            InstructionError::Custom(17)
        );
    }

    #[test]
    fn test_decode_custom() {
        for error in [
            TreasuryError::EmergencyHalt,
            TreasuryError::InvalidProof,
            TreasuryError::AlreadyClaimed,
        ] {
            assert_eq!(
                TreasuryError::decode_custom(&InstructionError::from(error)),
                Some(error)
            );
        }
        assert_matches!(TreasuryError::decode_custom(&InstructionError::Custom(999)), None);
        assert_matches!(
            TreasuryError::decode_custom(&InstructionError::InvalidArgument),
            None
        );
    }
}
