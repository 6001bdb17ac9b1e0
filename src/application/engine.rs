use tracing::info;

use crate::application::dispatch::NotificationDispatcher;
use crate::application::gate::AssignmentGate;
use crate::application::registry::WalletRegistry;
use crate::domain::directory::{BankAccount, BankAccountId, Bus, BusId, Role, User, UserId};
use crate::domain::money::Amount;
use crate::domain::ports::{DirectoryBox, LedgerStoreBox};
use crate::domain::transaction::{Transaction, TransactionDraft};
use crate::domain::wallet::{WalletDelta, WalletKind, WalletOwner};
use crate::error::{LedgerError, Result};

/// A fare payment: passenger wallet to bus wallet, gated on the operator's
/// active assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentRequest {
    pub passenger: UserId,
    pub bus: BusId,
    pub operator: UserId,
    pub amount: Amount,
}

/// A wallet top-up. The bank account reference, when given, is recorded but
/// no bank balance is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RechargeRequest {
    pub passenger: UserId,
    pub amount: Amount,
    pub bank_account: Option<BankAccountId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalSource {
    Bus(BusId),
    Owner(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalTarget {
    Wallet,
    Bank,
}

/// Moves takings out of a bus or owner wallet, either into the owner's
/// wallet or towards the owner's default bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub from: WithdrawalSource,
    pub to: WithdrawalTarget,
    pub amount: Amount,
}

/// Validates, executes, and records atomic balance transfers.
///
/// Each operation resolves its parties, applies the wallet deltas and the
/// ledger row through one [`LedgerStore::commit`] call, and only then hands
/// the committed row to the notification dispatcher. Any rejection on the
/// way leaves every balance untouched and writes no row.
///
/// [`LedgerStore::commit`]: crate::domain::ports::LedgerStore::commit
pub struct TransferEngine {
    directory: DirectoryBox,
    wallets: WalletRegistry,
    ledger: LedgerStoreBox,
    gate: AssignmentGate,
    dispatcher: NotificationDispatcher,
}

impl TransferEngine {
    pub fn new(
        directory: DirectoryBox,
        wallets: WalletRegistry,
        ledger: LedgerStoreBox,
        gate: AssignmentGate,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            directory,
            wallets,
            ledger,
            gate,
            dispatcher,
        }
    }

    /// Collects a fare from a passenger on behalf of a bus.
    pub async fn pay(&self, req: PaymentRequest) -> Result<Transaction> {
        let passenger = self.require_user(req.passenger).await?;
        let bus = self.require_bus(req.bus).await?;
        let operator = self.require_user(req.operator).await?;
        require_role(&operator, Role::Operator)?;

        self.gate.require_active(operator.id, bus.id).await?;

        // Unreachable when the directory upholds its own invariants, but a
        // mislabelled owner must not receive fares.
        let owner = self.require_user(bus.owner).await?;
        if owner.role != Role::Owner {
            return Err(LedgerError::InvalidOwner(owner.id));
        }

        let passenger_wallet = self
            .wallets
            .require(WalletKind::Passenger, WalletOwner::User(passenger.id))
            .await?;
        let bus_wallet = self
            .wallets
            .require(WalletKind::Bus, WalletOwner::Bus(bus.id))
            .await?;

        let draft = TransactionDraft::payment(
            req.amount,
            passenger_wallet.id,
            bus_wallet.id,
            passenger.id,
            operator.id,
            owner.id,
            bus.id,
            format!("fare on bus {}", bus.number),
        );
        let tx = self
            .ledger
            .commit(
                vec![
                    WalletDelta::debit(passenger_wallet.id, req.amount),
                    WalletDelta::credit(bus_wallet.id, req.amount),
                ],
                draft,
            )
            .await?;

        info!(tx = %tx.id, bus = %bus.id, amount = %req.amount, "payment committed");
        self.dispatcher.notify(&tx, Some(&bus)).await;
        Ok(tx)
    }

    /// Tops up a passenger wallet. Recharge is the natural activation path,
    /// so a missing wallet is created rather than rejected.
    pub async fn recharge(&self, req: RechargeRequest) -> Result<Transaction> {
        let passenger = self.require_user(req.passenger).await?;
        require_role(&passenger, Role::Passenger)?;

        let bank_account = match req.bank_account {
            Some(id) => Some(
                self.directory
                    .bank_account(id)
                    .await?
                    .ok_or(LedgerError::BankAccountNotFound(id))?,
            ),
            None => None,
        };

        let wallet = self
            .wallets
            .open(WalletKind::Passenger, WalletOwner::User(passenger.id))
            .await?;

        let draft = TransactionDraft::recharge(
            req.amount,
            wallet.id,
            passenger.id,
            bank_account.as_ref().map(|account| account.id),
            format!("wallet recharge for {}", passenger.name),
        );
        let tx = self
            .ledger
            .commit(vec![WalletDelta::credit(wallet.id, req.amount)], draft)
            .await?;

        info!(tx = %tx.id, passenger = %passenger.id, amount = %req.amount, "recharge committed");
        self.dispatcher.notify(&tx, None).await;
        Ok(tx)
    }

    /// Moves takings out of a bus or owner wallet.
    pub async fn withdraw(&self, req: WithdrawRequest) -> Result<Transaction> {
        let tx = match req.from {
            WithdrawalSource::Bus(bus_id) => self.withdraw_from_bus(bus_id, req).await?,
            WithdrawalSource::Owner(owner_id) => self.withdraw_from_owner(owner_id, req).await?,
        };
        info!(tx = %tx.id, amount = %req.amount, "withdrawal committed");
        Ok(tx)
    }

    async fn withdraw_from_bus(&self, bus_id: BusId, req: WithdrawRequest) -> Result<Transaction> {
        let bus = self.require_bus(bus_id).await?;
        let owner = self.require_user(bus.owner).await?;
        if owner.role != Role::Owner {
            return Err(LedgerError::InvalidOwner(owner.id));
        }
        let bus_wallet = self
            .wallets
            .require(WalletKind::Bus, WalletOwner::Bus(bus.id))
            .await?;

        let tx = match req.to {
            WithdrawalTarget::Wallet => {
                let owner_wallet = self
                    .wallets
                    .open(WalletKind::Owner, WalletOwner::User(owner.id))
                    .await?;
                let draft = TransactionDraft::withdrawal(
                    req.amount,
                    bus_wallet.id,
                    Some(owner_wallet.id),
                    None,
                    owner.id,
                    Some(bus.id),
                    format!("bus {} takings to owner wallet", bus.number),
                );
                self.ledger
                    .commit(
                        vec![
                            WalletDelta::debit(bus_wallet.id, req.amount),
                            WalletDelta::credit(owner_wallet.id, req.amount),
                        ],
                        draft,
                    )
                    .await?
            }
            WithdrawalTarget::Bank => {
                let bank = self.require_default_bank(owner.id).await?;
                // Settlement happens outside this engine; only the debit and
                // the row are ours.
                let draft = TransactionDraft::withdrawal(
                    req.amount,
                    bus_wallet.id,
                    None,
                    Some(bank.id),
                    owner.id,
                    Some(bus.id),
                    format!("bus {} takings to {}", bus.number, bank.bank_name),
                );
                self.ledger
                    .commit(vec![WalletDelta::debit(bus_wallet.id, req.amount)], draft)
                    .await?
            }
        };
        self.dispatcher.notify(&tx, Some(&bus)).await;
        Ok(tx)
    }

    async fn withdraw_from_owner(
        &self,
        owner_id: UserId,
        req: WithdrawRequest,
    ) -> Result<Transaction> {
        let owner = self.require_user(owner_id).await?;
        require_role(&owner, Role::Owner)?;
        let owner_wallet = self
            .wallets
            .require(WalletKind::Owner, WalletOwner::User(owner.id))
            .await?;

        match req.to {
            WithdrawalTarget::Wallet => Err(LedgerError::UnsupportedWithdrawal(
                "an owner wallet can only withdraw to a bank account".into(),
            )),
            WithdrawalTarget::Bank => {
                let bank = self.require_default_bank(owner.id).await?;
                let draft = TransactionDraft::withdrawal(
                    req.amount,
                    owner_wallet.id,
                    None,
                    Some(bank.id),
                    owner.id,
                    None,
                    format!("owner payout to {}", bank.bank_name),
                );
                let tx = self
                    .ledger
                    .commit(vec![WalletDelta::debit(owner_wallet.id, req.amount)], draft)
                    .await?;
                self.dispatcher.notify(&tx, None).await;
                Ok(tx)
            }
        }
    }

    async fn require_user(&self, id: UserId) -> Result<User> {
        self.directory
            .user(id)
            .await?
            .ok_or(LedgerError::UserNotFound(id))
    }

    async fn require_bus(&self, id: BusId) -> Result<Bus> {
        self.directory
            .bus(id)
            .await?
            .ok_or(LedgerError::BusNotFound(id))
    }

    async fn require_default_bank(&self, owner: UserId) -> Result<BankAccount> {
        self.directory
            .default_bank_account(owner)
            .await?
            .ok_or(LedgerError::NoDefaultBankAccount(owner))
    }
}

fn require_role(user: &User, expected: Role) -> Result<()> {
    if user.role == expected {
        Ok(())
    } else {
        Err(LedgerError::RoleMismatch {
            user: user.id,
            expected,
            actual: user.role,
        })
    }
}
