//! Mock call connection for testing
//!
//! Records every request it receives and can be scripted to fail on a given
//! call, the way a hung-up or broken call connection would.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::connection::{CallConnection, PlaySource, RecognizeRequest};
use crate::error::{CallError, Result};

/// A request received by the mock, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Play {
        source: PlaySource,
        operation_context: Option<String>,
    },
    Recognize(RecognizeRequest),
}

/// A mock connection for testing playback and hang-up handling
pub struct MockConnection {
    /// Zero-based index of the first call that fails (usize::MAX = never)
    fail_from: AtomicUsize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure
    fail_with: Mutex<Option<CallError>>,
    /// Every request received, including the failing ones
    calls: Mutex<Vec<RecordedCall>>,
    call_connection_id: String,
}

impl MockConnection {
    /// Create a connection that accepts every request
    pub fn always_succeeds() -> Self {
        Self {
            fail_from: AtomicUsize::new(usize::MAX),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            call_connection_id: "mock-call".to_string(),
        }
    }

    /// Create a connection that rejects every request with the given error
    pub fn always_fails(error: CallError) -> Self {
        Self::fails_from(0, error)
    }

    /// Create a connection that accepts `n` requests, then fails every following one
    pub fn fails_from(n: usize, error: CallError) -> Self {
        Self {
            fail_from: AtomicUsize::new(n),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
            calls: Mutex::new(Vec::new()),
            call_connection_id: "mock-call".to_string(),
        }
    }

    /// Get the number of requests received
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get a copy of every request received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Set a custom call connection id
    pub fn with_call_connection_id(mut self, id: &str) -> Self {
        self.call_connection_id = id.to_string();
        self
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);

        if call_num >= self.fail_from.load(Ordering::SeqCst) {
            let error = self.fail_with.lock().unwrap();
            if let Some(err) = error.as_ref() {
                return Err(clone_error(err));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CallConnection for MockConnection {
    async fn play_media(
        &self,
        source: PlaySource,
        operation_context: Option<&str>,
    ) -> Result<()> {
        self.record(RecordedCall::Play {
            source,
            operation_context: operation_context.map(str::to_string),
        })
    }

    async fn start_recognizing(&self, request: RecognizeRequest) -> Result<()> {
        self.record(RecordedCall::Recognize(request))
    }

    fn call_connection_id(&self) -> &str {
        &self.call_connection_id
    }
}

/// Clone a CallError so the scripted failure can be returned on every call
fn clone_error(err: &CallError) -> CallError {
    match err {
        CallError::NotFound(id) => CallError::NotFound(id.clone()),
        CallError::CallTerminated { message } => CallError::CallTerminated {
            message: message.clone(),
        },
        CallError::Http {
            status,
            code,
            message,
        } => CallError::Http {
            status: *status,
            code: code.clone(),
            message: message.clone(),
        },
        CallError::Request(s) => CallError::Request(s.clone()),
        CallError::MissingCredentials { endpoint, env_var } => CallError::MissingCredentials {
            endpoint: endpoint.clone(),
            env_var: env_var.clone(),
        },
        CallError::ConfigError(s) => CallError::ConfigError(s.clone()),
    }
}
