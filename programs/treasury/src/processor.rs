//! Instruction processing logic for the WIN treasury program.

use {
    crate::{
        access::{Caller, Role},
        allowlist::leaf_for,
        constants::*,
        error::TreasuryError,
        instruction::TreasuryInstruction,
        pda::{verify_derived, VaultAuthority, VaultKind},
        state::{
            ClaimStatus, GlobalConfig, MerkleRoot, Record, RewardKind, UserDetails, VaultEntry,
            VaultRegistry,
        },
    },
    log::*,
    solana_bincode::limited_deserialize,
    solana_instruction::{error::InstructionError, Instruction},
    solana_program_pack::Pack,
    solana_program_runtime::{declare_process_instruction, invoke_context::InvokeContext},
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
    solana_svm_log_collector::ic_msg,
    solana_system_interface::instruction as system_instruction,
    solana_transaction_context::IndexOfAccount,
    spl_token_interface::state::{Account as TokenAccount, Mint},
    win_merkle_tree::verify_proof,
};

// ---------------------------------------------------------------------------
// Program ID
// ---------------------------------------------------------------------------

solana_pubkey::declare_id!("WinTreasury11111111111111111111111111111111");

/// Position of the first vault in `InitializePda`'s account list.
const FIRST_VAULT_ACCOUNT: IndexOfAccount = 4;

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

declare_process_instruction!(Entrypoint, DEFAULT_COMPUTE_UNITS, |invoke_context| {
    let instruction: TreasuryInstruction = {
        let transaction_context = &invoke_context.transaction_context;
        let instruction_context = transaction_context.get_current_instruction_context()?;
        limited_deserialize(
            instruction_context.get_instruction_data(),
            solana_packet::PACKET_DATA_SIZE as u64,
        )?
    };

    trace!("treasury process_instruction: {instruction:?}");

    match instruction {
        TreasuryInstruction::Initialize {
            bot_wallet,
            dev_wallet,
            fund_wallet,
            sale_fee,
        } => process_initialize(invoke_context, bot_wallet, dev_wallet, fund_wallet, sale_fee),
        TreasuryInstruction::UpdateEmergencyFlag { emergency_flag } => {
            process_update_emergency_flag(invoke_context, emergency_flag)
        }
        TreasuryInstruction::UpdateByAdmin {
            fund_wallet,
            sale_fee,
        } => process_update_by_admin(invoke_context, fund_wallet, sale_fee),
        TreasuryInstruction::UpdateByDev {
            bot_wallet,
            emergency_flag,
        } => process_update_by_dev(invoke_context, bot_wallet, emergency_flag),
        TreasuryInstruction::InitializePda => process_initialize_pda(invoke_context),
        TreasuryInstruction::AssetsDistribution { amount, vault } => {
            process_assets_distribution(invoke_context, amount, vault)
        }
        TreasuryInstruction::WithdrawPdaToken { amount, vault } => {
            process_vault_outflow(invoke_context, Role::Dev, amount, vault)
        }
        TreasuryInstruction::WithdrawPdaSol { amount } => {
            process_withdraw_pda_sol(invoke_context, amount)
        }
        TreasuryInstruction::AirdropToken { amount, vault } => {
            process_vault_outflow(invoke_context, Role::Bot, amount, vault)
        }
        TreasuryInstruction::InitializeMerkle { root } => {
            process_initialize_merkle(invoke_context, root)
        }
        TreasuryInstruction::ClaimAllowlist { proof } => {
            process_claim_allowlist(invoke_context, proof)
        }
        TreasuryInstruction::CreateUserDetailsByUser => {
            process_create_user_details(invoke_context, None)
        }
        TreasuryInstruction::CreateUserDetailsByBot { user_wallet } => {
            process_create_user_details(invoke_context, Some(user_wallet))
        }
        TreasuryInstruction::UpdateUserReward {
            user_wallet,
            kind,
            amount,
            distributed_at,
        } => process_update_user_reward(invoke_context, user_wallet, kind, amount, distributed_at),
        TreasuryInstruction::ClaimUserReward { kind } => {
            process_claim_user_reward(invoke_context, kind)
        }
    }
});

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Owned copy of an instruction account, taken so that no account borrow is
/// held across a cross-program call.
struct AccountSnapshot {
    key: Pubkey,
    owner: Pubkey,
    lamports: u64,
    data: Vec<u8>,
}

impl AccountSnapshot {
    fn is_initialized<T: Record>(&self) -> bool {
        T::is_initialized(&self.owner, &self.data)
    }

    fn record<T: Record>(&self) -> Result<T, InstructionError> {
        if self.owner != crate::id() {
            return Err(if self.data.is_empty() {
                TreasuryError::NotInitialized
            } else {
                TreasuryError::InvalidAccountOwner
            }
            .into());
        }
        T::read_from(&self.data).map_err(|_| TreasuryError::InvalidAccountData.into())
    }

    fn token_account(&self) -> Result<TokenAccount, InstructionError> {
        if self.owner != spl_token_interface::ID {
            return Err(TreasuryError::InvalidAccountOwner.into());
        }
        TokenAccount::unpack(&self.data).map_err(|_| TreasuryError::InvalidAccountData.into())
    }
}

fn snapshot(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
) -> Result<AccountSnapshot, InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let key = *instruction_context.get_key_of_instruction_account(account_index)?;
    let account = instruction_context.try_borrow_instruction_account(account_index)?;
    Ok(AccountSnapshot {
        key,
        owner: *account.get_owner(),
        lamports: account.get_lamports(),
        data: account.get_data().to_vec(),
    })
}

fn key_of(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
) -> Result<Pubkey, InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    Ok(*instruction_context.get_key_of_instruction_account(account_index)?)
}

fn check_accounts(
    invoke_context: &InvokeContext,
    expected: IndexOfAccount,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(expected)
}

fn write_record<T: Record>(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
    record: &T,
) -> Result<(), InstructionError> {
    let data = record
        .to_account_data()
        .map_err(|_| TreasuryError::InvalidAccountData)?;
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let mut account = instruction_context.try_borrow_instruction_account(account_index)?;
    account.set_data_from_slice(&data)
}

fn load_config(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
) -> Result<GlobalConfig, InstructionError> {
    let account = snapshot(invoke_context, account_index)?;
    verify_derived(&account.key, &[WIN_SEED])?;
    account.record()
}

/// Loads the registry and rebuilds the vault authority from its stored bump.
fn load_registry(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
) -> Result<(VaultRegistry, VaultAuthority), InstructionError> {
    let account = snapshot(invoke_context, account_index)?;
    let registry: VaultRegistry = account.record()?;
    if !registry.ready {
        return Err(TreasuryError::NotInitialized.into());
    }
    let authority = VaultAuthority::from_bump(&account.key, registry.authority_bump)?;
    Ok((registry, authority))
}

fn load_user_details(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
    user_wallet: &Pubkey,
) -> Result<UserDetails, InstructionError> {
    let account = snapshot(invoke_context, account_index)?;
    verify_derived(&account.key, &[USER_DETAILS_SEED, user_wallet.as_ref()])?;
    account.record()
}

fn check_vault_key(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
    registry: &VaultRegistry,
    kind: VaultKind,
) -> Result<Pubkey, InstructionError> {
    let key = key_of(invoke_context, account_index)?;
    if key != registry.vault(kind).address {
        return Err(TreasuryError::InvalidAddress.into());
    }
    Ok(key)
}

fn authorize(
    invoke_context: &InvokeContext,
    config: &GlobalConfig,
    role: Role,
    caller: &Caller,
) -> Result<(), InstructionError> {
    config.authorize(role, caller).map_err(|err| {
        ic_msg!(invoke_context, "{} does not hold the {:?} role", caller.pubkey(), role);
        err.into()
    })
}

fn ensure_operational(
    invoke_context: &InvokeContext,
    config: &GlobalConfig,
) -> Result<(), InstructionError> {
    config.ensure_operational().map_err(|err| {
        ic_msg!(invoke_context, "Emergency flag is set");
        err.into()
    })
}

fn ensure_nonzero(amount: u64) -> Result<(), TreasuryError> {
    if amount == 0 {
        Err(TreasuryError::InvalidAmount)
    } else {
        Ok(())
    }
}

/// Runs `instruction` as a cross-program call. Every key in `signers` must be
/// an address derived from this program.
fn invoke(
    invoke_context: &mut InvokeContext,
    instruction: Instruction,
    signers: &[Pubkey],
) -> Result<(), InstructionError> {
    invoke_context.native_invoke(instruction.into(), signers)
}

/// Turns the system-owned, data-less account at `account_index` into a
/// rent-exempt account of `space` bytes owned by `owner`. Anyone can send
/// lamports to a derived address, so a funded address is topped up, allocated
/// and assigned instead of created.
fn create_derived_account(
    invoke_context: &mut InvokeContext,
    payer: &Pubkey,
    account_index: IndexOfAccount,
    space: usize,
    owner: &Pubkey,
) -> Result<(), InstructionError> {
    let target = snapshot(invoke_context, account_index)?;
    if target.owner != system_program::ID || !target.data.is_empty() {
        ic_msg!(invoke_context, "{} is already in use", target.key);
        return Err(TreasuryError::AlreadyInitialized.into());
    }
    let address = target.key;
    let required = invoke_context
        .environment_config.sysvar_cache()
        .get_rent()?
        .minimum_balance(space);

    if target.lamports == 0 {
        return invoke(
            invoke_context,
            system_instruction::create_account(payer, &address, required, space as u64, owner),
            &[address],
        );
    }

    let top_up = required.saturating_sub(target.lamports);
    if top_up > 0 {
        invoke(
            invoke_context,
            system_instruction::transfer(payer, &address, top_up),
            &[],
        )?;
    }
    invoke(
        invoke_context,
        system_instruction::allocate(&address, space as u64),
        &[address],
    )?;
    invoke(
        invoke_context,
        system_instruction::assign(&address, owner),
        &[address],
    )
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// `Initialize { bot_wallet, dev_wallet, fund_wallet, sale_fee }`
///
/// Accounts:
///   0. `[signer, writable]` Admin.
///   1. `[]`                 Token mint.
///   2. `[writable]`         Config.
///   3. `[]`                 System program.
fn process_initialize(
    invoke_context: &mut InvokeContext,
    bot_wallet: Pubkey,
    dev_wallet: Pubkey,
    fund_wallet: Pubkey,
    sale_fee: u16,
) -> Result<(), InstructionError> {
    check_accounts(invoke_context, 4)?;
    let admin = Caller::from_signer(invoke_context, 0)?;

    let config_account = snapshot(invoke_context, 2)?;
    let bump = verify_derived(&config_account.key, &[WIN_SEED])?;
    if config_account.is_initialized::<GlobalConfig>() {
        ic_msg!(invoke_context, "Initialize: config already initialised");
        return Err(TreasuryError::AlreadyInitialized.into());
    }
    GlobalConfig::validate_sale_fee(sale_fee)?;

    let mint = snapshot(invoke_context, 1)?;
    if mint.owner != spl_token_interface::ID || Mint::unpack(&mint.data).is_err() {
        ic_msg!(invoke_context, "{} is not a token mint", mint.key);
        return Err(TreasuryError::InvalidMint.into());
    }

    create_derived_account(
        invoke_context,
        admin.pubkey(),
        2,
        GlobalConfig::SERIALIZED_SIZE,
        &crate::id(),
    )?;

    let config = GlobalConfig {
        admin_wallet: *admin.pubkey(),
        bot_wallet,
        dev_wallet,
        fund_wallet,
        token_mint_address: mint.key,
        sale_fee,
        emergency_flag: false,
        bump,
    };
    write_record(invoke_context, 2, &config)?;
    ic_msg!(invoke_context, "Initialize: admin {}, mint {}", admin.pubkey(), mint.key);
    Ok(())
}

/// Loads the config at account 1, checks the signer at account 0 holds `role`
/// and writes back whatever `update` leaves in it.
fn update_config(
    invoke_context: &InvokeContext,
    role: Role,
    update: impl FnOnce(&mut GlobalConfig) -> Result<(), TreasuryError>,
) -> Result<(), InstructionError> {
    check_accounts(invoke_context, 2)?;
    let caller = Caller::from_signer(invoke_context, 0)?;
    let mut config = load_config(invoke_context, 1)?;
    authorize(invoke_context, &config, role, &caller)?;
    update(&mut config)?;
    write_record(invoke_context, 1, &config)
}

fn process_update_emergency_flag(
    invoke_context: &InvokeContext,
    emergency_flag: bool,
) -> Result<(), InstructionError> {
    update_config(invoke_context, Role::Admin, |config| {
        config.emergency_flag = emergency_flag;
        Ok(())
    })?;
    ic_msg!(invoke_context, "UpdateEmergencyFlag: {}", emergency_flag);
    Ok(())
}

fn process_update_by_admin(
    invoke_context: &InvokeContext,
    fund_wallet: Pubkey,
    sale_fee: u16,
) -> Result<(), InstructionError> {
    update_config(invoke_context, Role::Admin, |config| {
        GlobalConfig::validate_sale_fee(sale_fee)?;
        config.fund_wallet = fund_wallet;
        config.sale_fee = sale_fee;
        Ok(())
    })?;
    ic_msg!(invoke_context, "UpdateByAdmin: fund wallet {}, sale fee {}", fund_wallet, sale_fee);
    Ok(())
}

fn process_update_by_dev(
    invoke_context: &InvokeContext,
    bot_wallet: Pubkey,
    emergency_flag: bool,
) -> Result<(), InstructionError> {
    update_config(invoke_context, Role::Dev, |config| {
        config.bot_wallet = bot_wallet;
        config.emergency_flag = emergency_flag;
        Ok(())
    })?;
    ic_msg!(
        invoke_context,
        "UpdateByDev: bot wallet {}, emergency flag {}",
        bot_wallet,
        emergency_flag
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Vaults
// ---------------------------------------------------------------------------

/// `InitializePda`
///
/// Accounts:
///   0. `[signer, writable]` Admin.
///   1. `[]`                 Config.
///   2. `[]`                 Token mint.
///   3. `[writable]`         Vault authority (holds the registry).
///   4..=8. `[writable]`     Vaults in `VaultKind::ALL` order.
///   9. `[]`                 System program.
///   10. `[]`                Token program.
fn process_initialize_pda(invoke_context: &mut InvokeContext) -> Result<(), InstructionError> {
    check_accounts(
        invoke_context,
        FIRST_VAULT_ACCOUNT + VaultKind::ALL.len() as IndexOfAccount + 2,
    )?;
    let admin = Caller::from_signer(invoke_context, 0)?;
    let config = load_config(invoke_context, 1)?;
    authorize(invoke_context, &config, Role::Admin, &admin)?;

    let mint = key_of(invoke_context, 2)?;
    if mint != config.token_mint_address {
        return Err(TreasuryError::InvalidMint.into());
    }

    let authority = VaultAuthority::derive();
    let authority_account = snapshot(invoke_context, 3)?;
    if authority_account.key != authority.address {
        return Err(TreasuryError::InvalidAddress.into());
    }
    if authority_account.is_initialized::<VaultRegistry>() {
        ic_msg!(invoke_context, "InitializePda: vaults already created");
        return Err(TreasuryError::AlreadyInitialized.into());
    }

    let mut vaults = [VaultEntry::default(); 5];
    for (offset, kind) in VaultKind::ALL.iter().enumerate() {
        let address = key_of(invoke_context, FIRST_VAULT_ACCOUNT + offset as IndexOfAccount)?;
        let bump = verify_derived(&address, &[kind.seed()])?;
        vaults[kind.index()] = VaultEntry { address, bump };
    }

    create_derived_account(
        invoke_context,
        admin.pubkey(),
        3,
        VaultRegistry::SERIALIZED_SIZE,
        &crate::id(),
    )?;

    for (offset, kind) in VaultKind::ALL.iter().enumerate() {
        let vault = vaults[kind.index()];
        create_derived_account(
            invoke_context,
            admin.pubkey(),
            FIRST_VAULT_ACCOUNT + offset as IndexOfAccount,
            TokenAccount::LEN,
            &spl_token_interface::ID,
        )?;
        let initialize = spl_token_interface::instruction::initialize_account3(
            &spl_token_interface::ID,
            &vault.address,
            &mint,
            &authority.address,
        )
        .map_err(|_| InstructionError::InvalidArgument)?;
        invoke(invoke_context, initialize, &[])?;
    }

    let registry = VaultRegistry {
        authority_bump: authority.bump,
        vaults,
        ready: true,
    };
    write_record(invoke_context, 3, &registry)?;
    ic_msg!(
        invoke_context,
        "InitializePda: {} vaults under {}",
        vaults.len(),
        authority.address
    );
    Ok(())
}

/// `AssetsDistribution { amount, vault }`
///
/// Accounts:
///   0. `[signer]`   Admin.
///   1. `[writable]` Admin token account.
///   2. `[writable]` Vault.
///   3. `[]`         Config.
///   4. `[]`         Vault authority.
///   5. `[]`         Token program.
fn process_assets_distribution(
    invoke_context: &mut InvokeContext,
    amount: u64,
    kind: VaultKind,
) -> Result<(), InstructionError> {
    ensure_nonzero(amount)?;
    check_accounts(invoke_context, 6)?;

    let admin = Caller::from_signer(invoke_context, 0)?;
    let config = load_config(invoke_context, 3)?;
    authorize(invoke_context, &config, Role::Admin, &admin)?;
    ensure_operational(invoke_context, &config)?;

    let (registry, _) = load_registry(invoke_context, 4)?;
    let vault = check_vault_key(invoke_context, 2, &registry, kind)?;

    let source_account = snapshot(invoke_context, 1)?;
    let source = source_account.token_account()?;
    if source.owner != *admin.pubkey() {
        return Err(TreasuryError::InvalidTokenOwner.into());
    }
    if source.mint != config.token_mint_address {
        return Err(TreasuryError::InvalidMint.into());
    }
    if source.amount < amount {
        ic_msg!(
            invoke_context,
            "AssetsDistribution: source holds {}, {} requested",
            source.amount,
            amount
        );
        return Err(TreasuryError::InsufficientBalance.into());
    }

    let transfer = spl_token_interface::instruction::transfer(
        &spl_token_interface::ID,
        &source_account.key,
        &vault,
        admin.pubkey(),
        &[],
        amount,
    )
    .map_err(|_| InstructionError::InvalidArgument)?;
    invoke(invoke_context, transfer, &[])?;
    ic_msg!(invoke_context, "AssetsDistribution: {} to the {:?} vault", amount, kind);
    Ok(())
}

/// Pays `amount` out of the vault at `vault_index` into `recipient`, signed by
/// the vault authority. Fails before any transfer if the vault is short.
fn pay_from_vault(
    invoke_context: &mut InvokeContext,
    vault_index: IndexOfAccount,
    kind: VaultKind,
    authority: &VaultAuthority,
    recipient: &Pubkey,
    amount: u64,
) -> Result<(), InstructionError> {
    let vault = snapshot(invoke_context, vault_index)?;
    let balance = vault.token_account()?.amount;
    if balance < amount {
        ic_msg!(invoke_context, "{:?} vault holds {}, {} requested", kind, balance, amount);
        return Err(TreasuryError::InsufficientBalance.into());
    }
    let transfer = spl_token_interface::instruction::transfer(
        &spl_token_interface::ID,
        &vault.key,
        recipient,
        &authority.address,
        &[],
        amount,
    )
    .map_err(|_| InstructionError::InvalidArgument)?;
    invoke(invoke_context, transfer, &[authority.address])
}

/// `WithdrawPdaToken` when `role` is `Dev`, `AirdropToken` when it is `Bot`.
/// Withdrawals may only pay a token account of the fund wallet.
///
/// Accounts:
///   0. `[signer]`   Dev or bot.
///   1. `[writable]` Recipient token account.
///   2. `[writable]` Vault.
///   3. `[]`         Config.
///   4. `[]`         Vault authority.
///   5. `[]`         Token program.
fn process_vault_outflow(
    invoke_context: &mut InvokeContext,
    role: Role,
    amount: u64,
    kind: VaultKind,
) -> Result<(), InstructionError> {
    ensure_nonzero(amount)?;
    check_accounts(invoke_context, 6)?;

    let caller = Caller::from_signer(invoke_context, 0)?;
    let config = load_config(invoke_context, 3)?;
    authorize(invoke_context, &config, role, &caller)?;
    ensure_operational(invoke_context, &config)?;

    let (registry, authority) = load_registry(invoke_context, 4)?;
    check_vault_key(invoke_context, 2, &registry, kind)?;

    let recipient_account = snapshot(invoke_context, 1)?;
    let recipient = recipient_account.token_account()?;
    if recipient.mint != config.token_mint_address {
        return Err(TreasuryError::InvalidMint.into());
    }
    if role == Role::Dev && recipient.owner != config.fund_wallet {
        ic_msg!(invoke_context, "Withdrawals must go to the fund wallet {}", config.fund_wallet);
        return Err(TreasuryError::InvalidTokenOwner.into());
    }

    pay_from_vault(
        invoke_context,
        2,
        kind,
        &authority,
        &recipient_account.key,
        amount,
    )?;
    ic_msg!(
        invoke_context,
        "{:?} vault paid {} to {}",
        kind,
        amount,
        recipient_account.key
    );
    Ok(())
}

/// `WithdrawPdaSol { amount }`
///
/// Accounts:
///   0. `[signer]`   Dev.
///   1. `[writable]` Fund wallet.
///   2. `[writable]` Community vault.
///   3. `[]`         Config.
///   4. `[]`         System program.
fn process_withdraw_pda_sol(
    invoke_context: &mut InvokeContext,
    amount: u64,
) -> Result<(), InstructionError> {
    ensure_nonzero(amount)?;
    check_accounts(invoke_context, 5)?;

    let dev = Caller::from_signer(invoke_context, 0)?;
    let config = load_config(invoke_context, 3)?;
    authorize(invoke_context, &config, Role::Dev, &dev)?;
    ensure_operational(invoke_context, &config)?;

    let fund_wallet = key_of(invoke_context, 1)?;
    if fund_wallet != config.fund_wallet {
        return Err(TreasuryError::InvalidAddress.into());
    }

    let community = snapshot(invoke_context, 2)?;
    verify_derived(&community.key, &[COMMUNITY_SEED])?;
    if community.lamports < amount {
        ic_msg!(
            invoke_context,
            "Community vault holds {} lamports, {} requested",
            community.lamports,
            amount
        );
        return Err(TreasuryError::InsufficientBalance.into());
    }

    invoke(
        invoke_context,
        system_instruction::transfer(&community.key, &fund_wallet, amount),
        &[community.key],
    )?;
    ic_msg!(invoke_context, "WithdrawPdaSol: {} lamports to {}", amount, fund_wallet);
    Ok(())
}

// ---------------------------------------------------------------------------
// Allowlist
// ---------------------------------------------------------------------------

/// `InitializeMerkle { root }`
///
/// Accounts:
///   0. `[signer, writable]` Admin.
///   1. `[writable]`         Merkle root.
///   2. `[]`                 Config.
///   3. `[]`                 System program.
fn process_initialize_merkle(
    invoke_context: &mut InvokeContext,
    root: [u8; 32],
) -> Result<(), InstructionError> {
    check_accounts(invoke_context, 4)?;
    let admin = Caller::from_signer(invoke_context, 0)?;
    let config = load_config(invoke_context, 2)?;
    authorize(invoke_context, &config, Role::Admin, &admin)?;

    let merkle_account = snapshot(invoke_context, 1)?;
    let bump = verify_derived(&merkle_account.key, &[MERKLE_ROOT_SEED])?;
    if merkle_account.is_initialized::<MerkleRoot>() {
        ic_msg!(invoke_context, "InitializeMerkle: root already stored");
        return Err(TreasuryError::AlreadyInitialized.into());
    }

    create_derived_account(
        invoke_context,
        admin.pubkey(),
        1,
        MerkleRoot::SERIALIZED_SIZE,
        &crate::id(),
    )?;
    write_record(invoke_context, 1, &MerkleRoot { root, bump })?;
    ic_msg!(invoke_context, "InitializeMerkle: root {:?}", root);
    Ok(())
}

/// `ClaimAllowlist { proof }`
///
/// Accounts:
///   0. `[signer, writable]` Claimant.
///   1. `[writable]`         Claim status of the claimant.
///   2. `[]`                 Merkle root.
///   3. `[]`                 Config.
///   4. `[]`                 System program.
fn process_claim_allowlist(
    invoke_context: &mut InvokeContext,
    proof: Vec<[u8; 32]>,
) -> Result<(), InstructionError> {
    if proof.len() > MAX_PROOF_LEN {
        return Err(TreasuryError::ProofTooLong.into());
    }
    check_accounts(invoke_context, 5)?;

    let claimant = Caller::from_signer(invoke_context, 0)?;
    let config = load_config(invoke_context, 3)?;
    ensure_operational(invoke_context, &config)?;

    let merkle_account = snapshot(invoke_context, 2)?;
    verify_derived(&merkle_account.key, &[MERKLE_ROOT_SEED])?;
    let merkle: MerkleRoot = merkle_account.record()?;
    if !verify_proof(&proof, &merkle.root, &leaf_for(claimant.pubkey())) {
        ic_msg!(invoke_context, "Proof for {} does not match the root", claimant.pubkey());
        return Err(TreasuryError::InvalidProof.into());
    }

    let claim_account = snapshot(invoke_context, 1)?;
    let bump = verify_derived(
        &claim_account.key,
        &[CLAIM_STATUS_SEED, claimant.pubkey().as_ref()],
    )?;
    if claim_account.is_initialized::<ClaimStatus>() {
        ic_msg!(invoke_context, "{} has already claimed", claimant.pubkey());
        return Err(TreasuryError::AlreadyClaimed.into());
    }

    create_derived_account(
        invoke_context,
        claimant.pubkey(),
        1,
        ClaimStatus::SERIALIZED_SIZE,
        &crate::id(),
    )?;
    let claimed_slot = invoke_context.environment_config.sysvar_cache().get_clock()?.slot;
    write_record(
        invoke_context,
        1,
        &ClaimStatus {
            claimant: *claimant.pubkey(),
            root: merkle.root,
            claimed_slot,
            bump,
        },
    )?;
    ic_msg!(
        invoke_context,
        "ClaimAllowlist: {} at slot {}",
        claimant.pubkey(),
        claimed_slot
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// User rewards
// ---------------------------------------------------------------------------

/// `CreateUserDetailsByUser` when `user_wallet` is `None`, the signer being
/// the user. `CreateUserDetailsByBot` otherwise, the signer being the bot.
///
/// Accounts:
///   0. `[signer, writable]` User or bot, pays for the record.
///   1. `[writable]`         User details of the user.
///   2. `[]`                 Config.
///   3. `[]`                 System program.
fn process_create_user_details(
    invoke_context: &mut InvokeContext,
    user_wallet: Option<Pubkey>,
) -> Result<(), InstructionError> {
    check_accounts(invoke_context, 4)?;
    let payer = Caller::from_signer(invoke_context, 0)?;
    let config = load_config(invoke_context, 2)?;
    let user_wallet = match user_wallet {
        Some(user_wallet) => {
            authorize(invoke_context, &config, Role::Bot, &payer)?;
            user_wallet
        }
        None => *payer.pubkey(),
    };
    ensure_operational(invoke_context, &config)?;

    let details_account = snapshot(invoke_context, 1)?;
    let bump = verify_derived(
        &details_account.key,
        &[USER_DETAILS_SEED, user_wallet.as_ref()],
    )?;
    if details_account.is_initialized::<UserDetails>() {
        ic_msg!(invoke_context, "User details for {} already exist", user_wallet);
        return Err(TreasuryError::AlreadyInitialized.into());
    }

    create_derived_account(
        invoke_context,
        payer.pubkey(),
        1,
        UserDetails::SERIALIZED_SIZE,
        &crate::id(),
    )?;
    let created_at = invoke_context.environment_config.sysvar_cache().get_clock()?.unix_timestamp;
    write_record(invoke_context, 1, &UserDetails::new(user_wallet, bump, created_at))?;
    ic_msg!(invoke_context, "CreateUserDetails: {}", user_wallet);
    Ok(())
}

/// `UpdateUserReward { user_wallet, kind, amount, distributed_at }`
///
/// Accounts:
///   0. `[signer]`   Bot.
///   1. `[writable]` User details.
///   2. `[]`         Config.
fn process_update_user_reward(
    invoke_context: &InvokeContext,
    user_wallet: Pubkey,
    kind: RewardKind,
    amount: u64,
    distributed_at: i64,
) -> Result<(), InstructionError> {
    check_accounts(invoke_context, 3)?;
    let bot = Caller::from_signer(invoke_context, 0)?;
    let config = load_config(invoke_context, 2)?;
    authorize(invoke_context, &config, Role::Bot, &bot)?;
    ensure_operational(invoke_context, &config)?;

    let mut details = load_user_details(invoke_context, 1, &user_wallet)?;
    let last_round = details.last_game_distributed_at;
    details.credit(kind, amount, distributed_at).map_err(|err| {
        if err == TreasuryError::StaleDistribution {
            ic_msg!(
                invoke_context,
                "Round at {} is older than {}",
                distributed_at,
                last_round
            );
        }
        err
    })?;
    write_record(invoke_context, 1, &details)?;
    ic_msg!(invoke_context, "UpdateUserReward: {} {:?} to {}", amount, kind, user_wallet);
    Ok(())
}

/// `ClaimUserReward { kind }`
///
/// Accounts:
///   0. `[signer]`   User.
///   1. `[signer]`   Bot.
///   2. `[writable]` User token account.
///   3. `[writable]` Vault paying `kind`.
///   4. `[writable]` User details.
///   5. `[]`         Config.
///   6. `[]`         Vault authority.
///   7. `[]`         Token program.
fn process_claim_user_reward(
    invoke_context: &mut InvokeContext,
    kind: RewardKind,
) -> Result<(), InstructionError> {
    check_accounts(invoke_context, 8)?;
    let user = Caller::from_signer(invoke_context, 0)?;
    let bot = Caller::from_signer(invoke_context, 1)?;
    let config = load_config(invoke_context, 5)?;
    authorize(invoke_context, &config, Role::Bot, &bot)?;
    ensure_operational(invoke_context, &config)?;

    let (registry, authority) = load_registry(invoke_context, 6)?;
    check_vault_key(invoke_context, 3, &registry, kind.vault())?;

    let recipient_account = snapshot(invoke_context, 2)?;
    let recipient = recipient_account.token_account()?;
    if recipient.mint != config.token_mint_address {
        return Err(TreasuryError::InvalidMint.into());
    }
    if recipient.owner != *user.pubkey() {
        return Err(TreasuryError::InvalidTokenOwner.into());
    }

    let mut details = load_user_details(invoke_context, 4, user.pubkey())?;
    let now = invoke_context.environment_config.sysvar_cache().get_clock()?.unix_timestamp;
    let amount = details.take_reward(kind, now)?;
    write_record(invoke_context, 4, &details)?;

    pay_from_vault(
        invoke_context,
        3,
        kind.vault(),
        &authority,
        &recipient_account.key,
        amount,
    )?;
    ic_msg!(invoke_context, "ClaimUserReward: {} {:?} to {}", amount, kind, user.pubkey());
    Ok(())
}
