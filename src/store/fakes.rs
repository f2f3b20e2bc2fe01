//! In-process connectors for unit tests.

use super::transport::{Connector, Transport};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
struct Shared {
    sent: Mutex<Vec<(i64, String)>>,
    connects: AtomicUsize,
    fail_sends: AtomicBool,
}

/// Connector whose transport records every message.
#[derive(Clone, Default)]
pub(crate) struct RecordingConnector {
    shared: Arc<Shared>,
}

impl RecordingConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sent(&self) -> Vec<(i64, String)> {
        self.shared.sent.lock().clone()
    }

    pub(crate) fn connects(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_sends(&self, fail: bool) {
        self.shared.fail_sends.store(fail, Ordering::SeqCst);
    }
}

struct RecordingTransport {
    shared: Arc<Shared>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        if self.shared.fail_sends.load(Ordering::SeqCst) {
            return Err(StoreError::send("message", "CHAT_WRITE_FORBIDDEN"));
        }
        self.shared.sent.lock().push((chat_id, text.to_string()));
        Ok(())
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(RecordingTransport {
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Connector that always fails.
#[derive(Clone)]
pub(crate) struct FailingConnector {
    reason: &'static str,
    attempts: Arc<AtomicUsize>,
}

impl FailingConnector {
    pub(crate) fn new(reason: &'static str) -> Self {
        Self {
            reason,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::connect(self.reason))
    }
}
