//! WIN Treasury Program
//!
//! Custodies the WIN token supply in purpose-bound vaults, moves it under a
//! three-role authority model, lets allowlisted wallets record a claim
//! against a Merkle root and keeps a per-user ledger of rewards paid out of
//! the vaults.
//!
//! ## Authority model
//!
//! `GlobalConfig`, stored at the address derived from `"win"`, names three
//! role wallets:
//!
//! - **Admin**: the initializer. Creates the vaults, distributes supply into
//!   them, stores the allowlist root and toggles the emergency flag.
//! - **Dev**: withdraws from the vaults and the community lamport vault to the
//!   fund wallet, rotates the bot wallet.
//! - **Bot**: sends airdrops out of the vaults, credits user rewards and
//!   co-signs their payout.
//!
//! While the emergency flag is set, every instruction that moves value, records
//! a claim or touches a reward ledger fails with `EmergencyHalt`.
//!
//! ## Instructions
//!
//! | Instruction          | Signer   | Description                                   |
//! |----------------------|----------|-----------------------------------------------|
//! | Initialize           | anyone   | One-time setup of `GlobalConfig`              |
//! | UpdateEmergencyFlag  | admin    | Set or clear the emergency flag               |
//! | UpdateByAdmin        | admin    | Replace fund wallet and sale fee              |
//! | UpdateByDev          | dev      | Replace bot wallet, set the emergency flag    |
//! | InitializePda        | admin    | Create every token vault and the registry     |
//! | AssetsDistribution   | admin    | Admin token account to a vault                |
//! | WithdrawPdaToken     | dev      | Vault to the fund wallet's token account      |
//! | WithdrawPdaSol       | dev      | Community lamports to the fund wallet         |
//! | AirdropToken         | bot      | Vault to any token account of the mint        |
//! | InitializeMerkle     | admin    | Store the allowlist root (write-once)         |
//! | ClaimAllowlist       | claimant | Prove membership, record the claim            |
//! | CreateUserDetailsByUser | user  | Open the signer's reward ledger               |
//! | CreateUserDetailsByBot  | bot   | Open a user's reward ledger                   |
//! | UpdateUserReward     | bot      | Credit one reward bucket of a user            |
//! | ClaimUserReward      | user+bot | Pay out and zero one reward bucket            |

#![allow(clippy::arithmetic_side_effects)]

pub mod access;
pub mod allowlist;
pub mod constants;
pub mod error;
pub mod instruction;
pub mod pda;
pub mod processor;
pub mod state;
pub mod tokenomics;

/// Re-export the program ID.
pub use processor::id;
