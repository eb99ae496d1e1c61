//! Scripted chat/search collaborators for tests.
//!
//! These record every call so tests can assert on call counts and prompt
//! contents, and replay canned replies deterministically.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use flowdag::errors::Result;
use flowdag::proxy::{
    BoxFuture, ChatConfig, ChatMessage, ChatProxy, SearchHit, SearchProxy, SearchQuery,
    SearchResponse,
};

type CallHook = Arc<dyn Fn(usize) + Send + Sync>;

/// Chat fake: replays `replies` in order, then the fallback forever.
/// Records the message list of every call.
pub struct ScriptedChat {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    /// Invoked with the zero-based call index, before the reply is returned.
    /// Lets tests flip abort flags or mutate the store mid-run.
    on_call: Option<CallHook>,
}

impl ScriptedChat {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            calls: Mutex::new(Vec::new()),
            on_call: None,
        }
    }

    pub fn with_replies(fallback: impl Into<String>, replies: &[&str]) -> Self {
        let mut chat = Self::new(fallback);
        chat.replies = Mutex::new(replies.iter().map(|r| r.to_string()).collect());
        chat
    }

    pub fn on_call(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_call = Some(Arc::new(hook));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChatProxy for ScriptedChat {
    fn chat<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        _config: ChatConfig,
    ) -> BoxFuture<'a, Result<String>> {
        let reply = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages);
            let index = calls.len() - 1;
            if let Some(hook) = &self.on_call {
                hook(index);
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone())
        };
        Box::pin(async move { Ok(reply) })
    }
}

/// Search fake: serves one fixed hit list in `top`/`skip` windows,
/// regardless of the query text.
pub struct PagedSearch {
    hits: Vec<SearchHit>,
    calls: Mutex<usize>,
}

impl PagedSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            calls: Mutex::new(0),
        }
    }

    /// Empty corpus, for boards whose programs never search.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Corpus of `count` generated hits.
    pub fn with_numbered_hits(count: usize) -> Self {
        let hits = (1..=count)
            .map(|n| SearchHit {
                title: format!("Result {n}"),
                url: format!("https://example.test/{n}"),
                snippet: format!("Summary of result {n}"),
            })
            .collect();
        Self::new(hits)
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl SearchProxy for PagedSearch {
    fn search<'a>(&'a self, query: SearchQuery) -> BoxFuture<'a, Result<SearchResponse>> {
        *self.calls.lock().unwrap() += 1;
        let results: Vec<SearchHit> = self
            .hits
            .iter()
            .skip(query.skip)
            .take(query.top)
            .cloned()
            .collect();
        let response = SearchResponse {
            total_count: self.hits.len(),
            results,
        };
        Box::pin(async move { Ok(response) })
    }
}
