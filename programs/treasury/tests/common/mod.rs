//! Shared harness for the treasury integration tests.
//!
//! Boots a `ProgramTest` bank with the treasury registered as a builtin next
//! to the SPL token programs, funds the role wallets and creates the WIN mint.

#![allow(dead_code)]

use {
    solana_account::Account,
    solana_clock::Clock,
    solana_instruction::Instruction,
    solana_keypair::Keypair,
    solana_program_pack::Pack,
    solana_program_test::{BanksClientError, ProgramTest, ProgramTestContext},
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    solana_system_interface::instruction as system_instruction,
    solana_transaction::Transaction,
    solana_transaction_error::TransactionError,
    spl_associated_token_account_interface::{
        address::get_associated_token_address,
        instruction::create_associated_token_account_idempotent,
    },
    spl_token_interface::state::{Account as TokenAccount, Mint},
    std::collections::HashSet,
    win_treasury_program::{
        access::Role,
        error::TreasuryError,
        instruction,
        pda::{config_address, vault_address, VaultAuthority, VaultKind},
        processor::Entrypoint,
        state::{GlobalConfig, Record, VaultRegistry},
    },
};

/// One SOL in lamports.
pub const SOL: u64 = 1_000_000_000;

pub const DECIMALS: u8 = 6;

pub const SALE_FEE: u16 = 50;

pub struct TreasuryHarness {
    pub context: ProgramTestContext,
    pub admin: Keypair,
    pub bot: Keypair,
    pub dev: Keypair,
    pub fund: Keypair,
    pub mint: Pubkey,
    mint_authority: Keypair,
    sent: HashSet<Vec<u8>>,
}

impl TreasuryHarness {
    pub async fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut program_test = ProgramTest::default();
        program_test.add_builtin_program(
            "win_treasury_program",
            win_treasury_program::id(),
            Entrypoint::vm,
        );

        let (admin, bot, dev, fund) = (
            Keypair::new(),
            Keypair::new(),
            Keypair::new(),
            Keypair::new(),
        );
        for wallet in [&admin, &bot, &dev, &fund] {
            program_test.add_account(
                wallet.pubkey(),
                Account::new(10 * SOL, 0, &solana_sdk_ids::system_program::ID),
            );
        }

        let mut harness = Self {
            context: program_test.start_with_context().await,
            admin,
            bot,
            dev,
            fund,
            mint: Pubkey::default(),
            mint_authority: Keypair::new(),
            sent: HashSet::new(),
        };
        let mint_authority = harness.mint_authority.pubkey();
        harness.mint = harness.create_mint(&mint_authority).await;
        harness
    }

    /// Config initialized, vaults not yet created.
    pub async fn configured() -> Self {
        let mut harness = Self::new().await;
        harness.initialize().await.unwrap();
        harness
    }

    /// Config and vaults initialized.
    pub async fn with_vaults() -> Self {
        let mut harness = Self::configured().await;
        let admin = harness.admin.pubkey();
        harness
            .execute(instruction::initialize_pda(&admin, &harness.mint), Role::Admin)
            .await
            .unwrap();
        harness
    }

    pub async fn initialize(&mut self) -> Result<(), BanksClientError> {
        let instruction = instruction::initialize(
            &self.admin.pubkey(),
            &self.mint,
            &self.bot.pubkey(),
            &self.dev.pubkey(),
            &self.fund.pubkey(),
            SALE_FEE,
        );
        self.execute(instruction, Role::Admin).await
    }

    pub fn keypair(&self, role: Role) -> Keypair {
        match role {
            Role::Admin => self.admin.insecure_clone(),
            Role::Bot => self.bot.insecure_clone(),
            Role::Dev => self.dev.insecure_clone(),
        }
    }

    pub fn wallet(&self, role: Role) -> Pubkey {
        self.keypair(role).pubkey()
    }

    /// Signs `instructions` with the context payer plus `signers` and sends
    /// them as one transaction. A transaction identical to one already sent
    /// is re-signed under a fresh blockhash.
    pub async fn process(
        &mut self,
        instructions: &[Instruction],
        signers: &[&Keypair],
    ) -> Result<(), BanksClientError> {
        let payer = self.context.payer.insecure_clone();
        let mut keypairs = vec![&payer];
        for signer in signers {
            if keypairs.iter().all(|keypair| keypair.pubkey() != signer.pubkey()) {
                keypairs.push(*signer);
            }
        }

        let mut transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &keypairs[..],
            self.context.last_blockhash,
        );
        if !self.sent.insert(transaction.signatures[0].as_ref().to_vec()) {
            let blockhash = self.context.get_new_latest_blockhash().await.unwrap();
            transaction = Transaction::new_signed_with_payer(
                instructions,
                Some(&payer.pubkey()),
                &keypairs[..],
                blockhash,
            );
            self.sent.insert(transaction.signatures[0].as_ref().to_vec());
        }
        self.context.banks_client.process_transaction(transaction).await
    }

    pub async fn execute_with(
        &mut self,
        instruction: Instruction,
        signer: &Keypair,
    ) -> Result<(), BanksClientError> {
        self.process(&[instruction], &[signer]).await
    }

    /// Runs `instruction` signed by the wallet holding `role`.
    pub async fn execute(
        &mut self,
        instruction: Instruction,
        role: Role,
    ) -> Result<(), BanksClientError> {
        let signer = self.keypair(role);
        self.execute_with(instruction, &signer).await
    }

    /// Sends `lamports` from the context payer to `to`, creating it if needed.
    pub async fn transfer_lamports(&mut self, to: &Pubkey, lamports: u64) {
        let payer = self.context.payer.pubkey();
        self.process(&[system_instruction::transfer(&payer, to, lamports)], &[])
            .await
            .unwrap();
    }

    /// A fresh wallet holding one SOL.
    pub async fn funded_wallet(&mut self) -> Keypair {
        let wallet = Keypair::new();
        self.transfer_lamports(&wallet.pubkey(), SOL).await;
        wallet
    }

    pub async fn create_mint(&mut self, authority: &Pubkey) -> Pubkey {
        let mint = Keypair::new();
        let payer = self.context.payer.pubkey();
        let lamports = self
            .context
            .banks_client
            .get_rent()
            .await
            .unwrap()
            .minimum_balance(Mint::LEN);
        let instructions = [
            system_instruction::create_account(
                &payer,
                &mint.pubkey(),
                lamports,
                Mint::LEN as u64,
                &spl_token_interface::ID,
            ),
            spl_token_interface::instruction::initialize_mint2(
                &spl_token_interface::ID,
                &mint.pubkey(),
                authority,
                None,
                DECIMALS,
            )
            .unwrap(),
        ];
        self.process(&instructions, &[&mint]).await.unwrap();
        mint.pubkey()
    }

    /// The associated token account of `owner` for `mint`, created if missing.
    pub async fn create_token_account(&mut self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        let payer = self.context.payer.pubkey();
        self.process(
            &[create_associated_token_account_idempotent(
                &payer,
                owner,
                mint,
                &spl_token_interface::ID,
            )],
            &[],
        )
        .await
        .unwrap();
        get_associated_token_address(owner, mint)
    }

    /// Mints `amount` WIN into `account`.
    pub async fn mint_to(&mut self, account: &Pubkey, amount: u64) {
        let authority = self.mint_authority.insecure_clone();
        let mint_to = spl_token_interface::instruction::mint_to(
            &spl_token_interface::ID,
            &self.mint,
            account,
            &authority.pubkey(),
            &[],
            amount,
        )
        .unwrap();
        self.process(&[mint_to], &[&authority]).await.unwrap();
    }

    pub async fn get_account(&mut self, address: &Pubkey) -> Option<Account> {
        self.context.banks_client.get_account(*address).await.unwrap()
    }

    pub async fn balance(&mut self, address: &Pubkey) -> u64 {
        self.get_account(address)
            .await
            .map_or(0, |account| account.lamports)
    }

    pub async fn token_account(&mut self, address: &Pubkey) -> Option<TokenAccount> {
        let account = self.get_account(address).await?;
        TokenAccount::unpack(&account.data).ok()
    }

    pub async fn token_balance(&mut self, address: &Pubkey) -> u64 {
        self.token_account(address)
            .await
            .map_or(0, |account| account.amount)
    }

    pub async fn record<T: Record>(&mut self, address: &Pubkey) -> Option<T> {
        let account = self.get_account(address).await?;
        T::read_from(&account.data).ok()
    }

    pub async fn config(&mut self) -> GlobalConfig {
        self.record(&config_address().0).await.unwrap()
    }

    pub async fn registry(&mut self) -> VaultRegistry {
        self.record(&VaultAuthority::derive().address).await.unwrap()
    }

    pub async fn clock(&mut self) -> Clock {
        let account = self
            .get_account(&solana_sdk_ids::sysvar::clock::ID)
            .await
            .unwrap();
        bincode::deserialize(&account.data).unwrap()
    }

    pub async fn set_emergency_flag(&mut self, emergency_flag: bool) {
        let admin = self.admin.pubkey();
        self.execute(
            instruction::update_emergency_flag(&admin, emergency_flag),
            Role::Admin,
        )
        .await
        .unwrap();
    }

    /// Admin's associated token account holding `amount` freshly minted units.
    pub async fn fund_admin(&mut self, amount: u64) -> Pubkey {
        let (admin, mint) = (self.admin.pubkey(), self.mint);
        let account = self.create_token_account(&admin, &mint).await;
        self.mint_to(&account, amount).await;
        account
    }

    /// Moves `amount` from a funded admin account into `kind`'s vault.
    pub async fn fill_vault(&mut self, kind: VaultKind, amount: u64) {
        let source = self.fund_admin(amount).await;
        let admin = self.admin.pubkey();
        self.execute(
            instruction::assets_distribution(&admin, &source, kind, amount),
            Role::Admin,
        )
        .await
        .unwrap();
    }

    pub async fn vault_balance(&mut self, kind: VaultKind) -> u64 {
        self.token_balance(&vault_address(kind).0).await
    }
}

/// The transaction error of a failed submission.
pub fn transaction_error(result: Result<(), BanksClientError>) -> Option<TransactionError> {
    result.err().map(BanksClientError::unwrap)
}

/// The treasury error a failed transaction carries, if any.
pub fn treasury_error(result: Result<(), BanksClientError>) -> Option<TreasuryError> {
    match transaction_error(result) {
        Some(TransactionError::InstructionError(_, err)) => TreasuryError::decode_custom(&err),
        _ => None,
    }
}
