//! Fluent board assembly for tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use flowdag::store::{DocumentStore, Item, MemoryStore, NodeId};

/// Builds a board directly in a [`MemoryStore`], bypassing the TOML loader.
pub struct BoardBuilder {
    store: Arc<MemoryStore>,
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Insert a container seeded with the given item texts.
    pub fn container(&self, name: &str, items: &[&str]) -> NodeId {
        let items: Vec<Item> = items.iter().map(|text| Item::new(*text)).collect();
        self.store.insert_container_with_items(name, items)
    }

    /// Insert a program node with the given config fields.
    pub fn program(&self, program_type: &str, config: &[(&str, &str)]) -> NodeId {
        let config: BTreeMap<String, String> = config
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        self.store.insert_program(program_type, config)
    }

    pub fn wire(&self, from: &str, to: &str) {
        self.store.connect(from, to);
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Handle typed as the trait object the engine wants.
    pub fn shared(&self) -> Arc<dyn DocumentStore> {
        self.store() as Arc<dyn DocumentStore>
    }
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::new()
    }
}
