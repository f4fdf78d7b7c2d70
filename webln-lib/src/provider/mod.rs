//! Wallet provider contract, wire types and the simulated wallet.

mod mock;
mod traits;
mod types;

pub use mock::{payment_hash_of, MockCall, MockDiscovery, MockWalletProvider};
pub use traits::{
    ProviderDiscovery, ProviderRejection, ProviderResult, RejectionCategory, WalletProvider,
};
pub use types::{
    Balance, Invoice, InvoiceRequest, KeysendRequest, KeysendResponse, NodeDescriptor, NodeInfo,
    Operation, PaymentTarget, SendPaymentAsyncResponse, SendPaymentResponse, Transaction,
};
