//! Logging trait for chat client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! every submission passing through the [`ChatClient`](crate::ChatClient).

use crate::RequestOutcome;

/// A trait for logging chat client operations.
///
/// Implement this trait to record what was sent, every chunk received and how
/// each submission ended.
///
/// # Example
///
/// ```rust,ignore
/// use promptstream::{ClientLogger, RequestOutcome};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, url: &str, prompt: &str) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "POST {url}: {prompt}").unwrap();
///     }
///
///     fn log_chunk(&self, index: usize, bytes: &[u8]) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "chunk {index}: {} bytes", bytes.len()).unwrap();
///     }
///
///     fn log_outcome(&self, outcome: &RequestOutcome) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "outcome: {}", serde_json::to_string(outcome).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request about to be sent.
    fn log_request(&self, url: &str, prompt: &str);

    /// Log one chunk of the response body, as received off the wire.
    ///
    /// `index` counts chunks from zero within one submission.
    fn log_chunk(&self, index: usize, bytes: &[u8]);

    /// Log the terminal outcome of a submission.
    ///
    /// Called exactly once per `submit`.
    fn log_outcome(&self, outcome: &RequestOutcome);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Collects log lines in memory.
    #[derive(Default)]
    pub struct MemoryLogger {
        pub lines: Mutex<Vec<String>>,
    }

    impl ClientLogger for MemoryLogger {
        fn log_request(&self, url: &str, prompt: &str) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("request {url} {prompt}"));
        }

        fn log_chunk(&self, index: usize, bytes: &[u8]) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("chunk {index} {}", bytes.len()));
        }

        fn log_outcome(&self, outcome: &RequestOutcome) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("outcome {}", outcome.is_success()));
        }
    }
}
