// src/proxy/offline.rs

//! Deterministic, network-free collaborator implementations.
//!
//! `KeywordChat` answers the prompt shapes the builtin programs produce
//! using plain word overlap, which makes `flowdag` runnable end-to-end
//! without any model access: useful for the CLI demo and for tests that
//! want plausible-but-deterministic completions.

use std::collections::BTreeSet;

use regex::Regex;

use crate::errors::Result;
use crate::proxy::{
    BoxFuture, ChatConfig, ChatMessage, ChatProxy, Role, SearchHit, SearchProxy, SearchQuery,
    SearchResponse,
};

fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    a.intersection(b).count()
}

/// Word-overlap completion heuristic.
///
/// Recognizes three prompt shapes:
/// - "pick one of [..]" classification: replies with the bracketed option
///   sharing the most words with the user text (first option on a tie);
/// - "matched indices" selection: replies with a JSON index array of the
///   numbered options sharing at least one word with the `Concept:` line;
/// - yes/no questions: replies "Yes" when question and text share a word.
#[derive(Debug, Default)]
pub struct KeywordChat;

impl KeywordChat {
    pub fn new() -> Self {
        Self
    }

    fn reply(&self, messages: &[ChatMessage]) -> String {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .unwrap_or("");
        let user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        if system.contains("matched indices") {
            return self.reply_indices(user);
        }

        if let Some(options) = bracketed_options(system) {
            return self.reply_category(&options, user);
        }

        if system.to_lowercase().contains("yes") {
            let question_words = words(system);
            let text_words = words(user);
            return if overlap(&question_words, &text_words) > 0 {
                "Yes".to_string()
            } else {
                "No".to_string()
            };
        }

        String::new()
    }

    fn reply_category(&self, options: &[String], user: &str) -> String {
        let text_words = words(user);
        options
            .iter()
            .max_by_key(|option| overlap(&words(option), &text_words))
            .cloned()
            .unwrap_or_default()
    }

    fn reply_indices(&self, user: &str) -> String {
        let concept = user
            .lines()
            .find(|line| line.starts_with("Concept:"))
            .unwrap_or("");
        let concept_words = words(concept.trim_start_matches("Concept:"));

        let mut matched = Vec::new();
        for line in user.lines() {
            let Some((num, text)) = line.split_once(". ") else {
                continue;
            };
            let Ok(index) = num.trim().parse::<usize>() else {
                continue;
            };
            if overlap(&concept_words, &words(text)) > 0 {
                matched.push(index.to_string());
            }
        }
        format!("[{}]", matched.join(","))
    }
}

/// Extract the option list from a "categories: [A, B, C]" style prompt.
fn bracketed_options(system: &str) -> Option<Vec<String>> {
    let re = Regex::new(r"\[([^\]]*)\]").unwrap();
    let caps = re.captures(system)?;
    let options: Vec<String> = caps[1]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if options.is_empty() { None } else { Some(options) }
}

impl ChatProxy for KeywordChat {
    fn chat<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        _config: ChatConfig,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { Ok(self.reply(&messages)) })
    }
}

/// Canned search corpus, paged the same way a remote back end would be.
#[derive(Debug, Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }
}

impl SearchProxy for StaticSearch {
    fn search<'a>(&'a self, query: SearchQuery) -> BoxFuture<'a, Result<SearchResponse>> {
        Box::pin(async move {
            let query_words = words(&query.query);
            let matched: Vec<SearchHit> = self
                .hits
                .iter()
                .filter(|hit| {
                    overlap(&query_words, &words(&format!("{} {}", hit.title, hit.snippet))) > 0
                })
                .cloned()
                .collect();

            let page = matched
                .iter()
                .skip(query.skip)
                .take(query.top)
                .cloned()
                .collect();

            Ok(SearchResponse {
                total_count: matched.len(),
                results: page,
            })
        })
    }
}
