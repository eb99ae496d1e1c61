// src/proxy/mod.rs

//! Chat-completion and search collaborators.
//!
//! The engine itself never talks to a language model or search back end;
//! individual programs do, through the traits here. Real network clients
//! are host concerns. [`offline`] provides deterministic, network-free
//! implementations used by the CLI demo and available to tests.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

pub mod offline;

/// Boxed future alias used by the object-safe collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Per-call completion settings.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub model: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tokens: 60,
            temperature: 0.0,
            model: None,
        }
    }
}

/// Chat-completion collaborator. Returns the completion text.
pub trait ChatProxy: Send + Sync {
    fn chat<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        config: ChatConfig,
    ) -> BoxFuture<'a, Result<String>>;
}

/// One page of a search request.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub top: usize,
    pub skip: usize,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// Total matches across all pages, for pagination.
    pub total_count: usize,
    pub results: Vec<SearchHit>,
}

/// Search collaborator.
pub trait SearchProxy: Send + Sync {
    fn search<'a>(&'a self, query: SearchQuery) -> BoxFuture<'a, Result<SearchResponse>>;
}
