// src/programs/join.rs

//! Join: for each item in the left source, find the right-source items for
//! which the configured relation holds, and emit key + matches into the
//! target container.
//!
//! The model is asked for a JSON array of matched option indices; the array
//! is extracted with a regex so surrounding prose does not break parsing.

use std::collections::BTreeMap;

use regex::Regex;

use crate::errors::Result;
use crate::programs::{
    self, Creation, CreationContext, Program, ProgramContext, create_or_use_sources,
    create_targets,
};
use crate::proxy::{BoxFuture, ChatConfig, ChatMessage};
use crate::store::{DocumentStore, Item, ProgramNode};

pub const RELATION_KEY: &str = "relation";
const DEFAULT_RELATION: &str = "can be solved by";

const INDEX_PROMPT: &str = "You help the user test if a given relation holds true from a concept \
to the provided options. Respond with a json array of matched indices. When there is no match, \
respond with []. For example

User:
Concept: Food
Relation: can be consumed by
Options:
1. Human
2. Car
3. Computer
4. Cat
5. Plants

You: [1,4]

User:
Concept: Pen
Relation: is bigger than
Options:
1. Paper
2. Tree
3. PC

You: []";

pub struct JoinProgram;

impl Program for JoinProgram {
    fn name(&self) -> &'static str {
        "join"
    }

    fn create(&self, ctx: &CreationContext) -> Result<Creation> {
        let mut config = BTreeMap::new();
        config.insert(RELATION_KEY.to_string(), DEFAULT_RELATION.to_string());
        let program_node = ctx.store.insert_program(self.name(), config);

        let source_ids = create_or_use_sources(ctx, &["Left", "Right"]);
        let target_ids = create_targets(ctx, &["Output"]);

        for source in &source_ids {
            ctx.store.connect(source, &program_node);
        }
        for target in &target_ids {
            ctx.store.connect(&program_node, target);
        }

        Ok(Creation { program_node, source_ids, target_ids })
    }

    fn describe(&self, node: &ProgramNode, _store: &dyn DocumentStore) -> String {
        format!("Joining \"{}\"...", node.field(RELATION_KEY))
    }

    fn run<'a>(
        &'a self,
        ctx: &'a ProgramContext<'a>,
        node: &'a ProgramNode,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if ctx.source_ids.len() != 2 {
                ctx.report("Join requires 2 input containers");
                return Ok(());
            }

            let relation = node.field(RELATION_KEY).to_string();
            let key_items = ctx.store.items(&ctx.source_ids[0]);
            let value_items = ctx.store.items(&ctx.source_ids[1]);
            let array_re = Regex::new(r"(\[.*?\])").expect("static regex");

            for key_item in key_items {
                let Some(target) = programs::live_targets(ctx.store, &node.id).into_iter().next()
                else {
                    return Ok(());
                };
                ctx.store
                    .append_item(&target.id, key_item.clone().with_meta("role", "key"));

                let options = value_items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("{}. {}", i + 1, combine_whitespace(&item.text)))
                    .collect::<Vec<_>>()
                    .join("\n");

                let messages = vec![
                    ChatMessage::system(INDEX_PROMPT),
                    ChatMessage::user(format!(
                        "Concept: {}\nRelation: {}\nOptions:\n{}",
                        combine_whitespace(&key_item.text),
                        relation,
                        options
                    )),
                ];

                ctx.report(format!(
                    "Evaluating \"{} {}?\"",
                    shorten_to_word_count(5, &key_item.text),
                    relation
                ));

                let response = ctx
                    .chat
                    .chat(
                        messages,
                        ChatConfig { max_tokens: 500, temperature: 0.25, ..ChatConfig::default() },
                    )
                    .await?;

                if ctx.is_aborted() || ctx.is_changed() {
                    return Ok(());
                }

                let raw_array = array_re
                    .captures(&response)
                    .map(|caps| caps[1].to_string())
                    .unwrap_or_else(|| "[]".to_string());

                let Some(positions) = parse_index_array(&raw_array) else {
                    ctx.report("Could not parse join result; adjust the relation and retry");
                    return Ok(());
                };

                let matches: Vec<&Item> = positions
                    .iter()
                    .filter_map(|pos| pos.checked_sub(1).and_then(|i| value_items.get(i)))
                    .collect();

                for value_item in matches {
                    let Some(target) =
                        programs::live_targets(ctx.store, &node.id).into_iter().next()
                    else {
                        return Ok(());
                    };
                    ctx.store
                        .append_item(&target.id, value_item.clone().with_meta("role", "match"));
                }
            }

            Ok(())
        })
    }
}

fn combine_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn shorten_to_word_count(count: usize, text: &str) -> String {
    text.split_whitespace().take(count).collect::<Vec<_>>().join(" ")
}

/// Parse `[1,4,5]` into indices; `None` on malformed content.
fn parse_index_array(raw: &str) -> Option<Vec<usize>> {
    let inner = raw.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|part| part.trim().parse::<usize>().ok())
        .collect()
}
