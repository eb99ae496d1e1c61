// src/programs/filter.rs

//! Filter: gate each source item through a strict yes/no question and clone
//! the matches into the target container.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::programs::{
    self, Creation, CreationContext, Program, ProgramContext, create_or_use_sources,
    create_targets,
};
use crate::proxy::{BoxFuture, ChatConfig, ChatMessage};
use crate::store::{DocumentStore, ProgramNode};

pub const QUESTION_KEY: &str = "question";
const DEFAULT_QUESTION: &str = "Is this item about a user problem?";

pub struct FilterProgram;

impl Program for FilterProgram {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn create(&self, ctx: &CreationContext) -> Result<Creation> {
        let mut config = BTreeMap::new();
        config.insert(QUESTION_KEY.to_string(), DEFAULT_QUESTION.to_string());
        let program_node = ctx.store.insert_program(self.name(), config);

        let source_ids = create_or_use_sources(ctx, &["Input"]);
        let target_ids = create_targets(ctx, &["Kept"]);

        for source in &source_ids {
            ctx.store.connect(source, &program_node);
        }
        for target in &target_ids {
            ctx.store.connect(&program_node, target);
        }

        Ok(Creation { program_node, source_ids, target_ids })
    }

    fn describe(&self, node: &ProgramNode, _store: &dyn DocumentStore) -> String {
        format!("Filter: \"{}\"", node.field(QUESTION_KEY))
    }

    fn run<'a>(
        &'a self,
        ctx: &'a ProgramContext<'a>,
        node: &'a ProgramNode,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let question = node.field(QUESTION_KEY).to_string();

            for item in ctx.source_items() {
                let messages = vec![
                    ChatMessage::system(format!(
                        "Answer the question about the text strictly with Yes or No.\nQuestion: {question}"
                    )),
                    ChatMessage::user(item.text.clone()),
                ];

                let answer = ctx
                    .chat
                    .chat(messages, ChatConfig { max_tokens: 3, ..ChatConfig::default() })
                    .await?;

                if ctx.is_aborted() || ctx.is_changed() {
                    return Ok(());
                }

                if answer.trim().to_lowercase().starts_with("yes") {
                    let Some(target) = programs::live_targets(ctx.store, &node.id).into_iter().next()
                    else {
                        return Ok(());
                    };
                    ctx.store.append_item(&target.id, item.clone());
                }
            }

            Ok(())
        })
    }
}
