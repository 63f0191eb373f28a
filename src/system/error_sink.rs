// src/system/error_sink.rs

use std::cell::RefCell;
use std::fmt;

/// Receives the messages of recoverable, unit-of-work level failures.
///
/// The store reports through this trait before returning the error, so a runner can keep
/// a record of every aborted unit while it moves on to the next one.
pub trait ErrorSink {
    /// Records one error message.
    fn report(&self, message: &str);
}

/// Default sink: logs at error level and keeps the messages for later inspection.
#[derive(Default)]
pub struct LogSink {
    messages: RefCell<Vec<String>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl ErrorSink for LogSink {
    fn report(&self, message: &str) {
        log::error!("{}", message);
        self.messages.borrow_mut().push(message.to_string());
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("reported", &self.messages.borrow().len())
            .finish()
    }
}
