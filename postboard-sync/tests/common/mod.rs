//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use postboard_sync::{Backend, Result, SyncError};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;

enum Reply {
    Ready(Result<Value>),
    Gated(oneshot::Receiver<Result<Value>>),
}

/// In-memory backend answering each path from a queue of scripted replies
///
/// Gated replies stay pending until the test releases them, which lets a test
/// decide the order in which concurrent requests complete.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    posted: Mutex<Vec<Value>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate reply for `path`
    pub fn reply(&self, path: &str, result: Result<Value>) {
        self.replies
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(Reply::Ready(result));
    }

    /// Queue a reply for `path` that completes when the returned sender fires
    pub fn gate(&self, path: &str) -> oneshot::Sender<Result<Value>> {
        let (tx, rx) = oneshot::channel();
        self.replies
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(Reply::Gated(rx));
        tx
    }

    /// Every request so far, as `METHOD path`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    /// Bodies sent with POST requests
    pub fn posted(&self) -> Vec<Value> {
        self.posted.lock().clone()
    }

    async fn answer(&self, path: &str) -> Result<Value> {
        let reply = self
            .replies
            .lock()
            .get_mut(path)
            .and_then(|queue| queue.pop_front());

        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(SyncError::fetch(path, "gate dropped"))),
            None => Err(SyncError::fetch(path, "no reply scripted")),
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn get_json(&self, path: &str) -> Result<Value> {
        self.calls.lock().push(format!("GET {}", path));
        self.answer(path).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value> {
        self.calls.lock().push(format!("POST {}", path));
        self.posted.lock().push(body);
        self.answer(path).await
    }
}

pub fn users() -> Value {
    json!([
        {"id": 1, "name": "Alice"},
        {"id": 2, "name": "Bob"}
    ])
}

/// `count` posts for `author`, ids starting at `first_id`
pub fn posts(author: u64, first_id: u64, count: u64) -> Value {
    Value::Array(
        (first_id..first_id + count)
            .map(|id| {
                json!({
                    "userId": author,
                    "id": id,
                    "title": format!("post {}", id),
                    "body": format!("body of post {}", id),
                })
            })
            .collect(),
    )
}

pub fn comments(post_id: u64) -> Value {
    json!([
        {"postId": post_id, "id": 1, "name": "first", "body": "nice"},
        {"postId": post_id, "id": 2, "name": "second", "body": "agreed"}
    ])
}

/// Let spawned fetch tasks run to completion
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
