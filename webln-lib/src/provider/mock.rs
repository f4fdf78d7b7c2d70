//! Simulated wallet provider.
//!
//! Stands in for an injected wallet in tests and in the terminal demo. It
//! records every call it receives, can be told to reject or to not support
//! specific operations, and can hold calls open for a while so
//! completion-order races are reproducible.

use super::traits::{
    ProviderDiscovery, ProviderRejection, ProviderResult, RejectionCategory, WalletProvider,
};
use super::types::{
    Balance, Invoice, InvoiceRequest, KeysendRequest, KeysendResponse, NodeDescriptor, NodeInfo,
    Operation, PaymentTarget, SendPaymentAsyncResponse, SendPaymentResponse, Transaction,
};
use crate::scheduler::Scheduler;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

/// One call observed by the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCall {
    pub operation: Operation,
    /// Target, destination or memo the call carried, if any.
    pub argument: Option<String>,
}

/// Mock wallet provider.
#[derive(Default)]
pub struct MockWalletProvider {
    alias: String,
    balance_sats: u64,
    rejections: RefCell<HashMap<Operation, ProviderRejection>>,
    unsupported: HashSet<Operation>,
    scheduler: Option<Rc<dyn Scheduler>>,
    latencies: RefCell<VecDeque<Duration>>,
    calls: RefCell<Vec<MockCall>>,
    invoices: RefCell<Vec<Invoice>>,
    nonce: Cell<u64>,
}

impl MockWalletProvider {
    /// Create a mock that supports and approves everything.
    pub fn new() -> Self {
        Self {
            alias: "mock-wallet".to_string(),
            balance_sats: 21_000,
            ..Default::default()
        }
    }

    /// Create a mock that rejects every call.
    pub fn failing() -> Self {
        let mut mock = Self::new();
        for op in Operation::ALL {
            mock.rejections.get_mut().insert(
                op,
                ProviderRejection::new(RejectionCategory::Other, "Simulated failure"),
            );
        }
        mock
    }

    /// Reject `operation` with the given rejection.
    pub fn rejecting(mut self, operation: Operation, rejection: ProviderRejection) -> Self {
        self.rejections.get_mut().insert(operation, rejection);
        self
    }

    /// Start rejecting `operation` from the next call on.
    pub fn reject_next(&self, operation: Operation, rejection: ProviderRejection) {
        self.rejections.borrow_mut().insert(operation, rejection);
    }

    /// Stop rejecting `operation`.
    pub fn approve(&self, operation: Operation) {
        self.rejections.borrow_mut().remove(&operation);
    }

    /// Report `operation` as unsupported.
    pub fn without(mut self, operation: Operation) -> Self {
        self.unsupported.insert(operation);
        self
    }

    /// Set the node alias returned by `getInfo`.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Set the balance returned by `getBalance`.
    pub fn with_balance(mut self, balance_sats: u64) -> Self {
        self.balance_sats = balance_sats;
        self
    }

    /// Use `scheduler` to hold calls open for queued latencies.
    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Queue a latency for the next call. Calls beyond the queue resolve at once.
    pub fn push_latency(&self, latency: Duration) {
        self.latencies.borrow_mut().push_back(latency);
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    /// Calls received for one operation.
    pub fn calls_for(&self, operation: Operation) -> Vec<MockCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Invoices created so far.
    pub fn invoices(&self) -> Vec<Invoice> {
        self.invoices.borrow().clone()
    }

    async fn enter(&self, operation: Operation, argument: Option<String>) -> ProviderResult<u64> {
        self.calls.borrow_mut().push(MockCall {
            operation,
            argument,
        });
        let nonce = self.nonce.get();
        self.nonce.set(nonce + 1);

        let latency = self.latencies.borrow_mut().pop_front();
        if let (Some(latency), Some(scheduler)) = (latency, &self.scheduler) {
            scheduler.sleep(latency).await;
        }

        if self.unsupported.contains(&operation) {
            return Err(ProviderRejection::unsupported(operation));
        }
        if let Some(rejection) = self.rejections.borrow().get(&operation) {
            return Err(rejection.clone());
        }
        Ok(nonce)
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockWalletProvider {
    fn supports(&self, operation: Operation) -> bool {
        !self.unsupported.contains(&operation)
    }

    async fn get_info(&self) -> ProviderResult<NodeInfo> {
        self.enter(Operation::GetInfo, None).await?;
        Ok(NodeInfo {
            node: NodeDescriptor {
                alias: self.alias.clone(),
                pubkey: Some(format!("02{}", digest_hex(&self.alias))),
                color: Some("#3399ff".to_string()),
            },
            methods: Operation::ALL
                .iter()
                .filter(|op| self.supports(**op))
                .map(|op| op.as_str().to_string())
                .collect(),
            extra: Map::new(),
        })
    }

    async fn get_balance(&self) -> ProviderResult<Balance> {
        self.enter(Operation::GetBalance, None).await?;
        Ok(Balance {
            balance: self.balance_sats,
            currency: Some("sats".to_string()),
        })
    }

    async fn get_transactions(&self) -> ProviderResult<Vec<Transaction>> {
        self.enter(Operation::GetTransactions, None).await?;
        Ok(self
            .invoices
            .borrow()
            .iter()
            .map(|invoice| Transaction {
                direction: "incoming".to_string(),
                amount: 0,
                description: None,
                payment_hash: Some(digest_hex(&invoice.payment_request)),
                preimage: None,
                settled_at: None,
                extra: Map::new(),
            })
            .collect())
    }

    async fn make_invoice(&self, request: &InvoiceRequest) -> ProviderResult<Invoice> {
        let nonce = self
            .enter(Operation::MakeInvoice, Some(request.memo.clone()))
            .await?;
        // BOLT11 amounts in nano-bitcoin: 1 sat = 10n
        let nano_btc = request
            .amount_sats
            .checked_mul(10)
            .ok_or_else(|| ProviderRejection::new(RejectionCategory::Other, "invalid amount"))?;
        let body = digest_hex(&format!("invoice:{}:{}:{}", request.amount_sats, request.memo, nonce));
        let mut raw = Map::new();
        raw.insert("rHash".to_string(), Value::String(digest_hex(&body)));
        let invoice = Invoice {
            payment_request: format!("lnbc{}n1p{}", nano_btc, body),
            raw,
        };
        self.invoices.borrow_mut().push(invoice.clone());
        Ok(invoice)
    }

    async fn send_payment(&self, target: &PaymentTarget) -> ProviderResult<SendPaymentResponse> {
        let nonce = self
            .enter(Operation::SendPayment, Some(target.to_string()))
            .await?;
        Ok(SendPaymentResponse {
            preimage: digest_hex(&format!("preimage:{}:{}", target, nonce)),
        })
    }

    async fn send_payment_async(
        &self,
        target: &PaymentTarget,
    ) -> ProviderResult<SendPaymentAsyncResponse> {
        let nonce = self
            .enter(Operation::SendPaymentAsync, Some(target.to_string()))
            .await?;
        let preimage = digest_hex(&format!("preimage:{}:{}", target, nonce));
        Ok(SendPaymentAsyncResponse {
            payment_hash: payment_hash_of(&preimage),
        })
    }

    async fn keysend(&self, request: &KeysendRequest) -> ProviderResult<KeysendResponse> {
        let nonce = self
            .enter(Operation::Keysend, Some(request.destination_pubkey.clone()))
            .await?;
        Ok(KeysendResponse {
            preimage: digest_hex(&format!(
                "keysend:{}:{}:{}",
                request.destination_pubkey, request.amount_sats, nonce
            )),
        })
    }
}

/// Discovery that either always finds a given provider or never finds one.
pub struct MockDiscovery {
    provider: Option<Rc<dyn WalletProvider>>,
    attempts: Cell<u32>,
}

impl MockDiscovery {
    /// Discovery that yields `provider`.
    pub fn found(provider: Rc<dyn WalletProvider>) -> Self {
        Self {
            provider: Some(provider),
            attempts: Cell::new(0),
        }
    }

    /// Discovery that finds nothing.
    pub fn missing() -> Self {
        Self {
            provider: None,
            attempts: Cell::new(0),
        }
    }

    /// How many times discovery ran.
    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }
}

#[async_trait(?Send)]
impl ProviderDiscovery for MockDiscovery {
    async fn request_provider(&self) -> Result<Rc<dyn WalletProvider>, String> {
        self.attempts.set(self.attempts.get() + 1);
        self.provider
            .clone()
            .ok_or_else(|| "no compatible wallet detected".to_string())
    }
}

fn digest_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

/// SHA-256 of the hex-decoded preimage, as Lightning defines the payment hash.
pub fn payment_hash_of(preimage_hex: &str) -> String {
    match hex::decode(preimage_hex) {
        Ok(bytes) => hex::encode(Sha256::digest(&bytes)),
        Err(_) => digest_hex(preimage_hex),
    }
}
