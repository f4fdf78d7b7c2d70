//! The controller as seen from page JavaScript.
//!
//! Every wallet operation returns a `Promise`. Failures reject with a JS
//! `Error` carrying `kind` and `code`; the same outcome is also readable
//! afterwards through `lastOutcome()`.

use futures_channel::mpsc::{unbounded, UnboundedSender};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::Event;
use webln_lib::prelude::*;
use webln_lib::render::render_payment_request_svg;

use crate::provider::BrowserDiscovery;
use crate::scheduler::BrowserScheduler;
use crate::utils;

/// Page-facing wallet controller.
#[wasm_bindgen]
pub struct WeblnController {
    inner: Rc<WalletController>,
    scroll_listener: RefCell<Option<Closure<dyn FnMut(Event)>>>,
    scan_feed: RefCell<Option<UnboundedSender<String>>>,
}

fn js_result<T: serde::Serialize>(result: Result<T>) -> std::result::Result<JsValue, JsValue> {
    match result {
        Ok(value) => utils::to_js_value(&value),
        Err(err) => Err(utils::to_js_error(&err)),
    }
}

#[wasm_bindgen]
impl WeblnController {
    /// Create a controller. `config` is an optional partial configuration
    /// object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<WeblnController, JsValue> {
        let config: ControllerConfig = if config.is_undefined() || config.is_null() {
            ControllerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| utils::js_error(&format!("Invalid configuration: {}", e)))?
        };
        let inner = WalletController::new(config, Rc::new(BrowserScheduler::new()))
            .map_err(|e| utils::to_js_error(&e))?;
        Ok(WeblnController {
            inner: Rc::new(inner),
            scroll_listener: RefCell::new(None),
            scan_feed: RefCell::new(None),
        })
    }

    /// Acquire `window.webln`. Resolves to `true` when connected.
    pub fn connect(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let state = inner.connect(&BrowserDiscovery).await;
            match state {
                SessionState::Connected => utils::log("WebLN provider connected"),
                SessionState::Unavailable { ref cause } => {
                    utils::error(&format!("WebLN Error: {}", cause))
                }
                SessionState::Uninitialized => {}
            }
            Ok(JsValue::from_bool(state == SessionState::Connected))
        })
    }

    #[wasm_bindgen(js_name = isConnected)]
    pub fn is_connected(&self) -> bool {
        self.inner.session().is_connected()
    }

    #[wasm_bindgen(js_name = getInfo)]
    pub fn get_info(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { js_result(inner.invoker().get_info().await) })
    }

    #[wasm_bindgen(js_name = getBalance)]
    pub fn get_balance(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { js_result(inner.invoker().get_balance().await) })
    }

    #[wasm_bindgen(js_name = getTransactions)]
    pub fn get_transactions(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { js_result(inner.invoker().get_transactions().await) })
    }

    /// Create an invoice; `memo` defaults to "Invoice for N sats".
    #[wasm_bindgen(js_name = makeInvoice)]
    pub fn make_invoice(&self, amount: u32, memo: Option<String>) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let request = match memo {
            Some(memo) => InvoiceRequest::new(u64::from(amount), memo),
            None => InvoiceRequest::for_amount(u64::from(amount)),
        };
        future_to_promise(async move { js_result(inner.invoker().make_invoice(&request).await) })
    }

    #[wasm_bindgen(js_name = sendPayment)]
    pub fn send_payment(&self, target: String) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            js_result(
                inner
                    .invoker()
                    .send_payment(&PaymentTarget::request(target))
                    .await,
            )
        })
    }

    #[wasm_bindgen(js_name = sendPaymentAsync)]
    pub fn send_payment_async(&self, target: String) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            js_result(
                inner
                    .invoker()
                    .send_payment_async(&PaymentTarget::request(target))
                    .await,
            )
        })
    }

    /// Keysend to `destination`. `records` is an optional object of TLV
    /// type to string value.
    pub fn keysend(&self, destination: String, amount: u32, records: JsValue) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let records: std::result::Result<BTreeMap<String, String>, _> =
            if records.is_undefined() || records.is_null() {
                Ok(BTreeMap::new())
            } else {
                serde_wasm_bindgen::from_value(records)
            };
        future_to_promise(async move {
            let records = records.map_err(|e| {
                utils::to_js_error(&WeblnError::invalid_input("customRecords", e.to_string()))
            })?;
            let mut request = KeysendRequest::new(destination, u64::from(amount));
            for (key, value) in records {
                request = request.with_record(key, value);
            }
            js_result(inner.invoker().keysend(&request).await)
        })
    }

    /// Switch scroll auto-pay on or off, attaching the window listener only
    /// while it is on.
    #[wasm_bindgen(js_name = setAutoPay)]
    pub fn set_auto_pay(&self, enabled: bool) -> std::result::Result<(), JsValue> {
        let autopay = Rc::clone(self.inner.autopay());
        autopay.set_enabled(enabled);

        let window = web_sys::window().ok_or_else(|| utils::js_error("No window object"))?;
        let mut slot = self.scroll_listener.borrow_mut();
        if enabled && slot.is_none() {
            let listener = Closure::wrap(Box::new(move |_event: Event| {
                autopay.on_signal();
            }) as Box<dyn FnMut(Event)>);
            window
                .add_event_listener_with_callback("scroll", listener.as_ref().unchecked_ref())
                .map_err(|_| utils::js_error("Failed to attach scroll listener"))?;
            *slot = Some(listener);
        } else if !enabled {
            if let Some(listener) = slot.take() {
                let _ = window.remove_event_listener_with_callback(
                    "scroll",
                    listener.as_ref().unchecked_ref(),
                );
            }
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = autoPayEnabled)]
    pub fn auto_pay_enabled(&self) -> bool {
        self.inner.autopay().is_enabled()
    }

    /// "direct" or "invoice-then-pay".
    #[wasm_bindgen(js_name = setAutoPayMode)]
    pub fn set_auto_pay_mode(&self, mode: &str) -> std::result::Result<(), JsValue> {
        let mode: AutoPayMode = mode.parse().map_err(|e| utils::to_js_error(&e))?;
        self.inner.autopay().set_mode(mode);
        Ok(())
    }

    /// Feed one scroll signal by hand. Returns the decision as a string.
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&self) -> String {
        format!("{:?}", self.inner.autopay().on_signal()).to_lowercase()
    }

    /// Open the scan surface and pay the first code pushed with
    /// `pushScanResult`. Resolves to "ignored", "rejected" or the payment.
    #[wasm_bindgen(js_name = startScan)]
    pub fn start_scan(&self) -> js_sys::Promise {
        let (tx, rx) = unbounded::<String>();
        *self.scan_feed.borrow_mut() = Some(tx);
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            match inner.scan().scan(rx).await {
                ScanDisposition::Ignored => Ok(JsValue::from_str("ignored")),
                ScanDisposition::Rejected => Ok(JsValue::from_str("rejected")),
                ScanDisposition::Paid(result) => js_result(result),
            }
        })
    }

    /// Hand decoded text from the camera to an open scan.
    #[wasm_bindgen(js_name = pushScanResult)]
    pub fn push_scan_result(&self, text: String) {
        if let Some(feed) = self.scan_feed.borrow().as_ref() {
            let _ = feed.unbounded_send(text);
        }
    }

    /// Close the scan surface without paying.
    #[wasm_bindgen(js_name = cancelScan)]
    pub fn cancel_scan(&self) {
        self.scan_feed.borrow_mut().take();
        self.inner.scan().close();
    }

    /// Validate and pay text entered without the camera.
    #[wasm_bindgen(js_name = submitScan)]
    pub fn submit_scan(&self, text: String) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            match inner.scan().submit(&text).await {
                ScanDisposition::Ignored => Ok(JsValue::from_str("ignored")),
                ScanDisposition::Rejected => Ok(JsValue::from_str("rejected")),
                ScanDisposition::Paid(result) => js_result(result),
            }
        })
    }

    #[wasm_bindgen(js_name = scanOpen)]
    pub fn scan_open(&self) -> bool {
        self.inner.scan().is_open()
    }

    #[wasm_bindgen(js_name = setManualTarget)]
    pub fn set_manual_target(&self, text: String) {
        self.inner.scan().set_manual_target(text);
    }

    #[wasm_bindgen(js_name = activeOperation)]
    pub fn active_operation(&self) -> Option<String> {
        self.inner
            .invoker()
            .active_operation()
            .map(|op| op.as_str().to_string())
    }

    #[wasm_bindgen(js_name = lastOutcome)]
    pub fn last_outcome(&self) -> std::result::Result<JsValue, JsValue> {
        match self.inner.invoker().last_outcome() {
            Some(outcome) => utils::to_js_value(&outcome),
            None => Ok(JsValue::NULL),
        }
    }

    /// `{ transient, persistent }`, each a message object or null.
    pub fn status(&self) -> std::result::Result<JsValue, JsValue> {
        #[derive(serde::Serialize)]
        struct Snapshot {
            transient: Option<StatusMessage>,
            persistent: Option<StatusMessage>,
        }
        utils::to_js_value(&Snapshot {
            transient: self.inner.status().transient(),
            persistent: self.inner.status().persistent(),
        })
    }

    #[wasm_bindgen(js_name = currentInvoice)]
    pub fn current_invoice(&self) -> Option<String> {
        self.inner
            .invoker()
            .current_invoice()
            .map(|invoice| invoice.payment_request)
    }

    /// SVG QR code of the current invoice.
    #[wasm_bindgen(js_name = invoiceQrSvg)]
    pub fn invoice_qr_svg(&self, size: u32) -> std::result::Result<Option<String>, JsValue> {
        self.inner
            .invoker()
            .current_invoice()
            .map(|invoice| render_payment_request_svg(&invoice.payment_request, size))
            .transpose()
            .map_err(|e| utils::to_js_error(&e))
    }
}

impl Drop for WeblnController {
    fn drop(&mut self) {
        if let (Some(window), Some(listener)) =
            (web_sys::window(), self.scroll_listener.get_mut().take())
        {
            let _ = window
                .remove_event_listener_with_callback("scroll", listener.as_ref().unchecked_ref());
        }
    }
}
