use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use ladder::{AppError, Announcer, Board};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Announcer that keeps everything it was asked to send
#[derive(Default)]
pub struct RecordingAnnouncer {
    sent_messages: RwLock<HashMap<String, Vec<String>>>,
    published: RwLock<HashMap<Board, Vec<String>>>,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages_for(&self, caller_id: &str) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(caller_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn published_to(&self, board: Board) -> Vec<String> {
        self.published
            .read()
            .await
            .get(&board)
            .cloned()
            .unwrap_or_default()
    }

    /// Waits until `caller_id` has received `count` messages, then returns them
    pub async fn wait_for_messages(&self, caller_id: &str, count: usize) -> Vec<String> {
        for _ in 0..200 {
            let messages = self.messages_for(caller_id).await;
            if messages.len() >= count {
                return messages;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{caller_id} did not receive {count} messages in time");
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn send(&self, caller_id: &str, message: &str) -> Result<(), AppError> {
        self.sent_messages
            .write()
            .await
            .entry(caller_id.to_string())
            .or_default()
            .push(message.to_string());
        Ok(())
    }

    async fn publish(&self, board: Board, content: &str) -> Result<(), AppError> {
        self.published
            .write()
            .await
            .entry(board)
            .or_default()
            .push(content.to_string());
        Ok(())
    }
}
