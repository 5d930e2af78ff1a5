//! Restartable delay timer for input handlers.

use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;

/// Runs the last scheduled callback once the inputs go quiet
///
/// Scheduling again before the delay elapses cancels the pending call.
#[derive(Clone, Default)]
pub struct Debouncer {
    pending: Rc<RefCell<Option<Timeout>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, delay_ms: u32, callback: impl FnOnce() + 'static) {
        let timeout = Timeout::new(delay_ms, callback);
        // dropping a Timeout cancels it
        self.pending.replace(Some(timeout));
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}
