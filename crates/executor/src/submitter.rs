//! Transaction submission through the connected provider

use alloy::providers::Provider;
use alloy::rpc::types::eth::{TransactionInput, TransactionRequest};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tracing::{error, info};

use metamoney_aggregator::WalletSession;
use metamoney_contracts::HttpProvider;
use metamoney_core::{ExecutionError, ExecutionResult};

use crate::builder::{BuiltTransaction, TransactionBuilder, TxAction};

/// Hands a built transaction to whoever signs it
#[async_trait]
pub trait TransactionSender: Send + Sync {
    async fn send(&self, tx: &BuiltTransaction) -> ExecutionResult<B256>;
}

/// `eth_sendTransaction` on the JSON-RPC provider; the node or wallet signs
pub struct RpcTransactionSender {
    provider: HttpProvider,
}

impl RpcTransactionSender {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }
}

/// JSON-RPC request for `tx`; nonce and fees are left to the signer
pub fn transaction_request(tx: &BuiltTransaction) -> TransactionRequest {
    TransactionRequest {
        from: Some(tx.from),
        to: Some(tx.to.into()),
        value: Some(tx.value),
        gas: Some(tx.gas_limit.into()),
        input: TransactionInput::new(tx.data.clone()),
        ..Default::default()
    }
}

#[async_trait]
impl TransactionSender for RpcTransactionSender {
    async fn send(&self, tx: &BuiltTransaction) -> ExecutionResult<B256> {
        let request = transaction_request(tx);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| ExecutionError::Rejected(e.to_string()))?;

        Ok(*pending.tx_hash())
    }
}

/// Record of a transaction the provider accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub action: TxAction,
    pub token: Address,
    pub amount: U256,
    pub tx_hash: B256,
}

/// Transaction submitter
pub struct TransactionSubmitter<S> {
    sender: S,
    builder: TransactionBuilder,
}

impl<S: TransactionSender> TransactionSubmitter<S> {
    pub fn new(sender: S, money_market: Address) -> Self {
        Self {
            sender,
            builder: TransactionBuilder::new(money_market),
        }
    }

    pub async fn deposit(
        &self,
        session: &WalletSession,
        token: Address,
        amount: U256,
    ) -> ExecutionResult<SubmittedTransaction> {
        let from = signer(session)?;
        let tx = self.builder.build_deposit(from, token, amount)?;
        self.submit(tx, token, amount).await
    }

    pub async fn withdraw(
        &self,
        session: &WalletSession,
        token: Address,
        amount: U256,
    ) -> ExecutionResult<SubmittedTransaction> {
        let from = signer(session)?;
        let tx = self.builder.build_withdraw(from, token, amount)?;
        self.submit(tx, token, amount).await
    }

    pub async fn approve(
        &self,
        session: &WalletSession,
        token: Address,
        amount: U256,
    ) -> ExecutionResult<SubmittedTransaction> {
        let from = signer(session)?;
        let tx = self.builder.build_approve(from, token, amount)?;
        self.submit(tx, token, amount).await
    }

    /// Approve the money market for `amount`, then deposit it
    pub async fn approve_and_deposit(
        &self,
        session: &WalletSession,
        token: Address,
        amount: U256,
    ) -> ExecutionResult<(SubmittedTransaction, SubmittedTransaction)> {
        let approval = self.approve(session, token, amount).await?;
        let deposit = self.deposit(session, token, amount).await?;
        Ok((approval, deposit))
    }

    async fn submit(
        &self,
        tx: BuiltTransaction,
        token: Address,
        amount: U256,
    ) -> ExecutionResult<SubmittedTransaction> {
        info!("Submitting {} of {} for {} to {}", tx.action, amount, token, tx.to);

        match self.sender.send(&tx).await {
            Ok(tx_hash) => {
                info!("{} accepted: {}", tx.action, tx_hash);
                Ok(SubmittedTransaction {
                    action: tx.action,
                    token,
                    amount,
                    tx_hash,
                })
            }
            Err(e) => {
                error!("{} failed: {}", tx.action, e);
                Err(e)
            }
        }
    }
}

fn signer(session: &WalletSession) -> ExecutionResult<Address> {
    if !session.is_active() {
        return Err(ExecutionError::NotReady);
    }
    session.account().ok_or(ExecutionError::NoAccount)
}
