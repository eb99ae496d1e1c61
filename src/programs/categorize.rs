// src/programs/categorize.rs

//! Categorize: clone each source item into the best-matching target
//! container, with target names as the category labels. Existing items in
//! the targets act as few-shot training examples, so the operator gets more
//! accurate as the user curates its output.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::graph::query;
use crate::programs::{
    self, Creation, CreationContext, Program, ProgramContext, create_or_use_sources,
    create_targets,
};
use crate::proxy::{BoxFuture, ChatConfig, ChatMessage};
use crate::store::{DocumentStore, ProgramNode};

/// Training examples taken from each target, at most.
const SAMPLES_PER_CATEGORY: usize = 7;

pub struct CategorizeProgram;

impl Program for CategorizeProgram {
    fn name(&self) -> &'static str {
        "categorize"
    }

    fn create(&self, ctx: &CreationContext) -> Result<Creation> {
        let program_node = ctx.store.insert_program(self.name(), BTreeMap::new());

        let source_ids = create_or_use_sources(ctx, &["Uncategorized"]);
        let target_ids = create_targets(ctx, &["Category A", "Category B"]);

        for source in &source_ids {
            ctx.store.connect(source, &program_node);
        }
        for target in &target_ids {
            ctx.store.connect(&program_node, target);
        }

        Ok(Creation { program_node, source_ids, target_ids })
    }

    fn describe(&self, node: &ProgramNode, store: &dyn DocumentStore) -> String {
        let target_names: Vec<String> = query::downstream_containers(store, &node.id)
            .into_iter()
            .map(|c| c.name)
            .collect();
        format!("Categorize: {}", target_names.join(", "))
    }

    fn run<'a>(
        &'a self,
        ctx: &'a ProgramContext<'a>,
        node: &'a ProgramNode,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let input_items = ctx.source_items();

            for item in input_items {
                // Re-read targets each iteration: the user may rename or
                // rewire categories while the loop is in flight.
                let targets = programs::live_targets(ctx.store, &node.id);
                if targets.is_empty() {
                    return Ok(());
                }

                let category_names: Vec<&str> =
                    targets.iter().map(|t| t.name.as_str()).collect();

                let mut messages = vec![ChatMessage::system(format!(
                    "Classify the text into one of the categories: [{}]",
                    category_names.join(", ")
                ))];

                for target in &targets {
                    for sample in target.items.iter().take(SAMPLES_PER_CATEGORY) {
                        messages.push(ChatMessage::user(sample.text.clone()));
                        messages.push(ChatMessage::assistant(target.name.clone()));
                    }
                }

                let short_context = item
                    .metadata
                    .get("short_context")
                    .map(String::as_str)
                    .unwrap_or("");
                messages.push(ChatMessage::user(
                    format!("{} {}", item.text, short_context).trim().to_string(),
                ));

                let max_category_words = category_names
                    .iter()
                    .map(|n| n.split_whitespace().count())
                    .max()
                    .unwrap_or(1);
                let config = ChatConfig {
                    max_tokens: (4 * max_category_words as u32).max(5),
                    ..ChatConfig::default()
                };

                let choice = ctx.chat.chat(messages, config).await?.trim().to_string();

                if ctx.is_aborted() || ctx.is_changed() {
                    return Ok(());
                }

                // Re-read once more: the completion may have taken a while.
                let targets = programs::live_targets(ctx.store, &node.id);
                let choice_lower = choice.to_lowercase();
                let matched = targets.iter().find(|t| {
                    let name_lower = t.name.to_lowercase();
                    name_lower.contains(&choice_lower) || choice_lower.contains(&name_lower)
                });

                // No matched category ends the run; the model output is not
                // usable for the remaining items either.
                let Some(category) = matched else {
                    break;
                };

                ctx.store.append_item(&category.id, item.clone());
            }

            Ok(())
        })
    }
}
