//! User-facing status messages.
//!
//! Two slots: a transient one that clears itself after a fixed duration, and
//! a persistent one for terminal conditions such as a missing wallet. Each
//! new transient message aborts the previous clear task before scheduling
//! its own, so a stale timer can never erase a newer message.

use crate::scheduler::Scheduler;
use futures::future::{abortable, AbortHandle};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// How a message should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A displayed status line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Holder of the current transient and persistent messages.
pub struct StatusBoard {
    scheduler: Rc<dyn Scheduler>,
    clear_after: Duration,
    transient: RefCell<Option<StatusMessage>>,
    persistent: RefCell<Option<StatusMessage>>,
    pending_clear: RefCell<Option<AbortHandle>>,
}

impl StatusBoard {
    /// Create a board whose transient messages live for `clear_after`.
    pub fn new(scheduler: Rc<dyn Scheduler>, clear_after: Duration) -> Rc<Self> {
        Rc::new(Self {
            scheduler,
            clear_after,
            transient: RefCell::new(None),
            persistent: RefCell::new(None),
            pending_clear: RefCell::new(None),
        })
    }

    /// Show a message that clears itself, replacing any previous transient one.
    pub fn show_transient(self: &Rc<Self>, text: impl Into<String>, severity: Severity) {
        self.cancel_pending_clear();
        *self.transient.borrow_mut() = Some(StatusMessage::new(text, severity));

        let board: Weak<Self> = Rc::downgrade(self);
        let delay = self.scheduler.sleep(self.clear_after);
        let (clear, handle) = abortable(async move {
            delay.await;
            if let Some(board) = board.upgrade() {
                board.transient.borrow_mut().take();
                board.pending_clear.borrow_mut().take();
            }
        });
        *self.pending_clear.borrow_mut() = Some(handle);
        self.scheduler.spawn(clear.map(|_| ()).boxed_local());
    }

    /// Show a message that stays until replaced by another persistent one.
    pub fn show_persistent(&self, text: impl Into<String>, severity: Severity) {
        *self.persistent.borrow_mut() = Some(StatusMessage::new(text, severity));
    }

    /// Drop the transient message now.
    pub fn clear_transient(&self) {
        self.cancel_pending_clear();
        self.transient.borrow_mut().take();
    }

    /// The current transient message.
    pub fn transient(&self) -> Option<StatusMessage> {
        self.transient.borrow().clone()
    }

    /// The current persistent message.
    pub fn persistent(&self) -> Option<StatusMessage> {
        self.persistent.borrow().clone()
    }

    /// Whether a clear task is scheduled.
    pub fn has_pending_clear(&self) -> bool {
        self.pending_clear.borrow().is_some()
    }

    fn cancel_pending_clear(&self) {
        if let Some(handle) = self.pending_clear.borrow_mut().take() {
            handle.abort();
        }
    }
}
