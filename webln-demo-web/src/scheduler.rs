//! Browser clock and timers.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::Promise;
use std::time::Duration;
use wasm_bindgen_futures::JsFuture;
use webln_lib::scheduler::Scheduler;

/// Scheduler backed by `performance.now()` and `setTimeout`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl BrowserScheduler {
    pub fn new() -> Self {
        Self
    }
}

fn timeout(ms: i32) -> Promise {
    Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
        });
        // Without a window (or if scheduling fails) resolve straight away.
        if !matches!(scheduled, Some(Ok(_))) {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        }
    })
}

impl Scheduler for BrowserScheduler {
    fn now_ms(&self) -> u64 {
        // Monotonic; wall-clock steps would stall the auto-pay cooldown.
        web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now) as u64
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let ms = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = timeout(ms);
        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
