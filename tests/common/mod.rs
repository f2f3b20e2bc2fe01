//! Shared fakes for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use linkshare::error::{Result, StoreError};
use linkshare::store::{Connector, LogRecord, Transport};
use std::sync::{Arc, Mutex};

/// Connector whose transport keeps every message posted to the channel.
#[derive(Clone, Default)]
pub struct MemoryChannel {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|text| LogRecord::from_message(text).expect("valid record"))
            .collect()
    }
}

struct MemoryChannelTransport {
    messages: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Transport for MemoryChannelTransport {
    async fn send_text(&self, _chat_id: i64, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[async_trait]
impl Connector for MemoryChannel {
    async fn connect(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(MemoryChannelTransport {
            messages: Arc::clone(&self.messages),
        }))
    }
}

/// Connector rejecting the bot token.
pub struct RejectingConnector;

#[async_trait]
impl Connector for RejectingConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>> {
        Err(StoreError::connect("Unauthorized: invalid token specified"))
    }
}
