//! Nullable push sender.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use idv_notify::{NotifyError, PushMessage, PushSender};
use serde_json::{json, Value};

/// Records pushes instead of delivering them. Can be told to fail.
pub struct NullPushSender {
    sent: Mutex<Vec<PushMessage>>,
    fail: AtomicBool,
}

impl NullPushSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for NullPushSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushSender for NullPushSender {
    async fn send(&self, message: &PushMessage) -> Result<Value, NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("null push sender set to fail".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(json!({ "success": message.tokens.len(), "failure": 0 }))
    }
}
