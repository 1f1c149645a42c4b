//! Scripted in-memory providers for integration tests

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use bookqa::agent::{Selection, ToolDescriptor, ToolSelector};
use bookqa::error::{Error, Result};
use bookqa::providers::{ChatProvider, EmbeddingProvider};

pub const DIMS: usize = 32;

/// Deterministic bag-of-words embedder; counts backend calls so tests can
/// assert that loading a persisted index skips re-embedding.
#[derive(Default)]
pub struct HashEmbedder {
    pub calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn bag(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMS];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            v[(hasher.finish() as usize) % DIMS] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::bag(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn name(&self) -> &str {
        "hash-embedder"
    }
}

/// Chat provider that echoes the user prompt back, so grounded answers
/// contain whatever context was retrieved.
pub struct EchoChat;

#[async_trait]
impl ChatProvider for EchoChat {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        Ok(user.to_string())
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo"
    }
}

/// Chat provider that replays a fixed list of replies in order.
pub struct ScriptedChat {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedChat {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .ok_or_else(|| Error::backend("scripted chat ran out of replies"))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Selector that always returns a fixed selection.
pub struct StaticSelector(pub Selection);

#[async_trait]
impl ToolSelector for StaticSelector {
    async fn select(&self, _question: &str, _catalog: &[ToolDescriptor]) -> Result<Selection> {
        Ok(self.0.clone())
    }
}
