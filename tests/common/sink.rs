//! Error sink that keeps every reported failure.

use slcmd::{DispatchError, ErrorSink, MessageEvent};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    errors: Arc<Mutex<Vec<(String, String)>>>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(error_code, display)` pairs in report order.
    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().expect("sink lock").clone()
    }

    pub fn codes(&self) -> Vec<String> {
        self.errors().into_iter().map(|(code, _)| code).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().expect("sink lock").is_empty()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, _event: &MessageEvent, error: &DispatchError) {
        self.errors
            .lock()
            .expect("sink lock")
            .push((error.error_code().to_string(), error.to_string()));
    }
}
