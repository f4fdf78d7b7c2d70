//! Adapter from the injected `window.webln` object to [`WalletProvider`].

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use serde::de::DeserializeOwned;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use webln_lib::provider::{
    Balance, Invoice, InvoiceRequest, KeysendRequest, KeysendResponse, NodeInfo, Operation,
    PaymentTarget, ProviderDiscovery, ProviderRejection, ProviderResult, RejectionCategory,
    SendPaymentAsyncResponse, SendPaymentResponse, Transaction, WalletProvider,
};

use crate::utils;

/// Wallet reached through a JS object implementing the WebLN methods.
pub struct BrowserWalletProvider {
    webln: JsValue,
}

impl BrowserWalletProvider {
    pub fn new(webln: JsValue) -> Self {
        Self { webln }
    }

    fn method(&self, operation: Operation) -> Option<Function> {
        Reflect::get(&self.webln, &operation.as_str().into())
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
    }

    /// Call `operation` with `args` and await whatever it returns.
    async fn invoke(&self, operation: Operation, args: &[JsValue]) -> ProviderResult<JsValue> {
        let method = self
            .method(operation)
            .ok_or_else(|| ProviderRejection::unsupported(operation))?;
        let args: Array = args.iter().collect();
        let returned = Reflect::apply(&method, &self.webln, &args)
            .map_err(|e| ProviderRejection::from_message(utils::error_message(&e)))?;
        // Wallets return promises; tolerate plain values too.
        let promise = Promise::resolve(&returned);
        JsFuture::from(promise)
            .await
            .map_err(|e| ProviderRejection::from_message(utils::error_message(&e)))
    }

    async fn invoke_as<T: DeserializeOwned>(
        &self,
        operation: Operation,
        args: &[JsValue],
    ) -> ProviderResult<T> {
        let value = self.invoke(operation, args).await?;
        decode(operation, value)
    }
}

fn decode<T: DeserializeOwned>(operation: Operation, value: JsValue) -> ProviderResult<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        ProviderRejection::new(
            RejectionCategory::Other,
            format!("unexpected {} response: {}", operation, e),
        )
    })
}

fn encode<T: serde::Serialize>(value: &T) -> ProviderResult<JsValue> {
    utils::to_js_value(value)
        .map_err(|e| ProviderRejection::new(RejectionCategory::Other, utils::error_message(&e)))
}

#[async_trait(?Send)]
impl WalletProvider for BrowserWalletProvider {
    fn supports(&self, operation: Operation) -> bool {
        self.method(operation).is_some()
    }

    async fn get_info(&self) -> ProviderResult<NodeInfo> {
        self.invoke_as(Operation::GetInfo, &[]).await
    }

    async fn get_balance(&self) -> ProviderResult<Balance> {
        self.invoke_as(Operation::GetBalance, &[]).await
    }

    async fn get_transactions(&self) -> ProviderResult<Vec<Transaction>> {
        let value = self.invoke(Operation::GetTransactions, &[]).await?;
        // Some wallets wrap the list as `{ transactions: [...] }`.
        let list = if Array::is_array(&value) {
            value
        } else {
            Reflect::get(&value, &"transactions".into()).unwrap_or(JsValue::UNDEFINED)
        };
        decode(Operation::GetTransactions, list)
    }

    async fn make_invoice(&self, request: &InvoiceRequest) -> ProviderResult<Invoice> {
        let args = [encode(request)?];
        self.invoke_as(Operation::MakeInvoice, &args).await
    }

    async fn send_payment(&self, target: &PaymentTarget) -> ProviderResult<SendPaymentResponse> {
        let args = [encode(target)?];
        self.invoke_as(Operation::SendPayment, &args).await
    }

    async fn send_payment_async(
        &self,
        target: &PaymentTarget,
    ) -> ProviderResult<SendPaymentAsyncResponse> {
        let args = [encode(target)?];
        self.invoke_as(Operation::SendPaymentAsync, &args).await
    }

    async fn keysend(&self, request: &KeysendRequest) -> ProviderResult<KeysendResponse> {
        let args = [encode(request)?];
        self.invoke_as(Operation::Keysend, &args).await
    }
}

/// Looks up `window.webln` and asks it to enable itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserDiscovery;

#[async_trait(?Send)]
impl ProviderDiscovery for BrowserDiscovery {
    async fn request_provider(&self) -> Result<Rc<dyn WalletProvider>, String> {
        let window = web_sys::window().ok_or_else(|| "No window object".to_string())?;
        let webln = Reflect::get(&window, &"webln".into())
            .ok()
            .filter(|value| value.is_object())
            .ok_or_else(|| "Your browser has no WebLN provider".to_string())?;

        let enable = Reflect::get(&webln, &"enable".into())
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| "WebLN provider has no enable()".to_string())?;
        let returned = enable
            .call0(&webln)
            .map_err(|e| utils::error_message(&e))?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| utils::error_message(&e))?;

        utils::log("WebLN provider enabled");
        Ok(Rc::new(BrowserWalletProvider::new(webln)))
    }
}
