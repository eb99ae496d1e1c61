// src/config/loader.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::model::{BoardFile, RawBoardFile};
use crate::errors::Result;
use crate::store::{DocumentStore, Item, MemoryStore, NodeId};

/// Load a board file from a path and return the raw `RawBoardFile`.
///
/// This only performs TOML deserialization; it does **not** perform
/// semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBoardFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let board: RawBoardFile = toml::from_str(&contents)?;

    Ok(board)
}

/// Load a board file and run semantic validation.
///
/// Checks that at least one program exists, every program type is
/// registered, and every source/target label resolves to a container.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BoardFile> {
    let raw = load_from_path(&path)?;
    let board = BoardFile::try_from(raw)?;
    Ok(board)
}

/// Materialize a validated board into a fresh [`MemoryStore`].
///
/// Returns the store and the label -> node id mapping for diagnostics.
pub fn build_store(board: &BoardFile) -> (MemoryStore, BTreeMap<String, NodeId>) {
    let store = MemoryStore::new();
    let mut ids: BTreeMap<String, NodeId> = BTreeMap::new();

    for (label, container) in board.container.iter() {
        let name = container.name.clone().unwrap_or_else(|| label.clone());
        let items = container.items.iter().map(|text| Item::new(text.as_str())).collect();
        let id = store.insert_container_with_items(&name, items);
        ids.insert(label.clone(), id);
    }

    for (label, program) in board.program.iter() {
        let id = store.insert_program(&program.program_type, program.config.clone());
        for source in &program.sources {
            // Validated: the label resolves.
            store.connect(&ids[source], &id);
        }
        for target in &program.targets {
            store.connect(&id, &ids[target]);
        }
        ids.insert(label.clone(), id);
    }

    (store, ids)
}
