//! Request and response payloads exchanged with a wallet provider.
//!
//! Field names follow the WebLN JSON shapes (camelCase) so the browser
//! adapter can convert provider objects directly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Wallet capability operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    GetInfo,
    GetBalance,
    GetTransactions,
    MakeInvoice,
    SendPayment,
    SendPaymentAsync,
    Keysend,
}

impl Operation {
    /// Every operation, in contract order.
    pub const ALL: [Operation; 7] = [
        Operation::GetInfo,
        Operation::GetBalance,
        Operation::GetTransactions,
        Operation::MakeInvoice,
        Operation::SendPayment,
        Operation::SendPaymentAsync,
        Operation::Keysend,
    ];

    /// The WebLN method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetInfo => "getInfo",
            Self::GetBalance => "getBalance",
            Self::GetTransactions => "getTransactions",
            Self::MakeInvoice => "makeInvoice",
            Self::SendPayment => "sendPayment",
            Self::SendPaymentAsync => "sendPaymentAsync",
            Self::Keysend => "keysend",
        }
    }

    /// Parse a WebLN method name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightning node descriptor returned by `getInfo`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(default)]
    pub node: NodeDescriptor,
    /// Methods the provider advertises, when it reports them.
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Node identity inside [`NodeInfo`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub pubkey: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Balance descriptor returned by `getBalance`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub balance: u64,
    /// Unit reported by the provider; sats when absent.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Transaction descriptor returned by `getTransactions`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// `incoming` or `outgoing`.
    #[serde(rename = "type", default)]
    pub direction: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "payment_hash")]
    pub payment_hash: Option<String>,
    #[serde(default)]
    pub preimage: Option<String>,
    #[serde(default, alias = "settled_at")]
    pub settled_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Arguments for invoice creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    #[serde(rename = "amount")]
    pub amount_sats: u64,
    #[serde(rename = "defaultMemo")]
    pub memo: String,
}

impl InvoiceRequest {
    /// Create an invoice request.
    pub fn new(amount_sats: u64, memo: impl Into<String>) -> Self {
        Self {
            amount_sats,
            memo: memo.into(),
        }
    }

    /// The page's standard memo, "Invoice for N sats".
    pub fn for_amount(amount_sats: u64) -> Self {
        Self::new(amount_sats, format!("Invoice for {} sats", amount_sats))
    }
}

/// Invoice returned by `makeInvoice`. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub payment_request: String,
    /// Provider-specific remainder of the response.
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

impl Invoice {
    /// Create an invoice with no extra provider payload.
    pub fn new(payment_request: impl Into<String>) -> Self {
        Self {
            payment_request: payment_request.into(),
            raw: Map::new(),
        }
    }
}

/// What a payment is sent to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentTarget {
    /// Encoded payment request or another provider-recognized address form.
    Request(String),
    /// Fixed amount resolved by the provider, used by direct auto-pay.
    Amount {
        #[serde(rename = "amount")]
        amount_sats: u64,
        memo: String,
    },
}

impl PaymentTarget {
    /// Target a payment request or alias.
    pub fn request(value: impl Into<String>) -> Self {
        Self::Request(value.into())
    }

    /// Target a fixed amount with a memo.
    pub fn amount(amount_sats: u64, memo: impl Into<String>) -> Self {
        Self::Amount {
            amount_sats,
            memo: memo.into(),
        }
    }

    /// The request string, if this is a request target.
    pub fn as_request(&self) -> Option<&str> {
        match self {
            Self::Request(value) => Some(value),
            Self::Amount { .. } => None,
        }
    }
}

impl fmt::Display for PaymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(value) => f.write_str(value),
            Self::Amount { amount_sats, memo } => write!(f, "{} sats ({})", amount_sats, memo),
        }
    }
}

impl From<&str> for PaymentTarget {
    fn from(value: &str) -> Self {
        Self::Request(value.to_string())
    }
}

impl From<String> for PaymentTarget {
    fn from(value: String) -> Self {
        Self::Request(value)
    }
}

/// Result of a synchronous payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPaymentResponse {
    pub preimage: String,
}

/// Result of an asynchronous payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPaymentAsyncResponse {
    #[serde(default)]
    pub payment_hash: String,
}

/// Arguments for a keysend payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysendRequest {
    #[serde(rename = "destination")]
    pub destination_pubkey: String,
    #[serde(rename = "amount")]
    pub amount_sats: u64,
    /// TLV record type (decimal string) to payload.
    #[serde(default)]
    pub custom_records: BTreeMap<String, String>,
}

impl KeysendRequest {
    /// Create a keysend request with no custom records.
    pub fn new(destination_pubkey: impl Into<String>, amount_sats: u64) -> Self {
        Self {
            destination_pubkey: destination_pubkey.into(),
            amount_sats,
            custom_records: BTreeMap::new(),
        }
    }

    /// Attach a custom TLV record.
    pub fn with_record(mut self, record_type: impl Into<String>, payload: impl Into<String>) -> Self {
        self.custom_records
            .insert(record_type.into(), payload.into());
        self
    }
}

/// Result of a keysend payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysendResponse {
    pub preimage: String,
}
