// src/programs/research.rs

//! Research lookup: page the search collaborator for a configured query and
//! emit hits into the target container as items carrying `url` and
//! `snippet` metadata.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::programs::{self, Creation, CreationContext, Program, ProgramContext, create_targets};
use crate::proxy::{BoxFuture, SearchQuery};
use crate::store::{DocumentStore, Item, ProgramNode};

pub const QUERY_KEY: &str = "query";
pub const LIMIT_KEY: &str = "limit";
const DEFAULT_LIMIT: usize = 10;
const PAGE_SIZE: usize = 5;

pub struct ResearchLookupProgram;

impl Program for ResearchLookupProgram {
    fn name(&self) -> &'static str {
        "research-lookup"
    }

    fn create(&self, ctx: &CreationContext) -> Result<Creation> {
        let mut config = BTreeMap::new();
        config.insert(QUERY_KEY.to_string(), String::new());
        config.insert(LIMIT_KEY.to_string(), DEFAULT_LIMIT.to_string());
        let program_node = ctx.store.insert_program(self.name(), config);

        // Pure producer: no sources.
        let target_ids = create_targets(ctx, &["Results"]);
        for target in &target_ids {
            ctx.store.connect(&program_node, target);
        }

        Ok(Creation { program_node, source_ids: Vec::new(), target_ids })
    }

    fn describe(&self, node: &ProgramNode, _store: &dyn DocumentStore) -> String {
        format!("Find research: \"{}\"", node.field(QUERY_KEY))
    }

    fn run<'a>(
        &'a self,
        ctx: &'a ProgramContext<'a>,
        node: &'a ProgramNode,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let Some(target) = programs::live_targets(ctx.store, &node.id).into_iter().next()
            else {
                return Ok(());
            };

            let query = node.field(QUERY_KEY).trim().to_string();
            if query.is_empty() {
                return Ok(());
            }
            let limit: usize = node.field(LIMIT_KEY).trim().parse().unwrap_or(DEFAULT_LIMIT);

            // A re-run means the query or limit changed; stale hits from the
            // previous query must not accumulate under the fresh ones.
            ctx.store.clear_items(&target.id);

            let mut skip = 0;
            let mut emitted = 0;
            let mut has_more = true;

            while has_more && emitted < limit {
                let page = ctx
                    .search
                    .search(SearchQuery { query: query.clone(), top: PAGE_SIZE, skip })
                    .await?;
                has_more = page.total_count > skip + PAGE_SIZE;

                if ctx.is_aborted() || ctx.is_changed() {
                    return Ok(());
                }

                for hit in page.results {
                    let item = Item::new(hit.title)
                        .with_meta("url", hit.url)
                        .with_meta("snippet", hit.snippet);
                    if !ctx.store.append_item(&target.id, item) {
                        // Target vanished mid-run; treat as drift, not error.
                        return Ok(());
                    }
                    emitted += 1;
                    if emitted >= limit {
                        return Ok(());
                    }
                }

                skip += PAGE_SIZE;
            }

            Ok(())
        })
    }
}
