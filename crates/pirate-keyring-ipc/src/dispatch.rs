//! UI-thread dispatch
//!
//! Service replies are produced on the tokio runtime. They are handed to a
//! [`UiDispatcher`] so that every callback runs on the UI thread, which is
//! the thread draining the [`UiLoop`].

use parking_lot::Mutex;
use std::future::poll_fn;
use tokio::sync::mpsc;

/// Unit of work posted to the UI thread
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Posts work to the UI thread
pub trait UiDispatcher: Send + Sync {
    /// Queue `task` to run on the UI thread
    fn post(&self, task: UiTask);
}

/// Single-threaded task queue drained by the UI thread
pub struct UiLoop {
    tx: mpsc::UnboundedSender<UiTask>,
    rx: Mutex<mpsc::UnboundedReceiver<UiTask>>,
}

impl UiLoop {
    /// Create an empty loop
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Run every task already queued, returning how many ran
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.rx.lock().try_recv().ok();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Wait for the next task and run it
    ///
    /// The receiver is locked only while polling, so `run_pending` still
    /// drains the queue while a caller is parked here.
    pub async fn run_next(&self) -> bool {
        let task = poll_fn(|cx| self.rx.lock().poll_recv(cx)).await;
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}

impl Default for UiLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl UiDispatcher for UiLoop {
    fn post(&self, task: UiTask) {
        // The loop owns a sender, so the receiver outlives every post.
        let _ = self.tx.send(task);
    }
}
