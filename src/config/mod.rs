// src/config/mod.rs

//! Board-definition files.
//!
//! A board file is the TOML description of a canvas: containers with their
//! initial items, program nodes with their type and configuration, and the
//! edges between them. [`loader`] reads and validates a file, [`model`]
//! holds the raw and validated shapes, and `build_store` materializes a
//! validated board into a [`MemoryStore`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{build_store, load_and_validate, load_from_path};
pub use model::{BoardFile, ContainerConfig, ProgramConfig, RawBoardFile, SearchResultConfig};
