//! Clock, delay and task spawning for the single-threaded controller.
//!
//! The controller owns exactly three timing disciplines: the auto-pay
//! cooldown (a timestamp comparison), the invoice settlement delay (an
//! awaited sleep) and the transient status clear (a spawned, abortable
//! task). All three go through [`Scheduler`] so the browser and native
//! runtimes can each supply their own timers.

use futures::future::LocalBoxFuture;
use std::time::Duration;

/// Single-threaded timing and spawning services.
pub trait Scheduler {
    /// Milliseconds on a monotonic clock.
    fn now_ms(&self) -> u64;

    /// Resolve after `duration`.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Run `task` to completion in the background.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::TokioScheduler;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::Scheduler;
    use futures::future::LocalBoxFuture;
    use futures::FutureExt;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Tokio-backed scheduler.
    ///
    /// `spawn` uses `spawn_local`, so it must run inside a `LocalSet`. Under
    /// tokio's paused test clock, time only moves when tests advance it.
    #[derive(Clone, Debug)]
    pub struct TokioScheduler {
        origin: Instant,
    }

    impl TokioScheduler {
        /// Create a scheduler whose clock starts at zero now.
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Default for TokioScheduler {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Scheduler for TokioScheduler {
        fn now_ms(&self) -> u64 {
            self.origin.elapsed().as_millis() as u64
        }

        fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
            tokio::time::sleep(duration).boxed_local()
        }

        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            tokio::task::spawn_local(task);
        }
    }

}
