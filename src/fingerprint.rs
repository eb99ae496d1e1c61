// src/fingerprint.rs

//! Content fingerprinting.
//!
//! A program node's fingerprint covers its type tag, its configuration and
//! the full content of its source containers, in source edge order. Target
//! containers contribute only their *names*: several operators key their
//! prompts off target names (renaming a category must re-trigger), but
//! hashing target items would make a program re-trigger itself from its own
//! output.
//!
//! Two fingerprints are equal iff neither the configuration nor the
//! up-to-date source content changed since the fingerprint was persisted.
//! The engine compares fingerprints, never raw content.

use blake3::Hasher;

use crate::store::{ContainerNode, Item, ProgramNode};

/// Scratch key under which the engine persists a node's fingerprint.
pub const FINGERPRINT_KEY: &str = "fingerprint";

/// Digest of a single item: text plus metadata in map order.
pub fn item_digest(item: &Item) -> String {
    let mut hasher = Hasher::new();
    hasher.update(item.text.as_bytes());
    for (key, value) in &item.metadata {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b";");
    }
    hasher.finalize().to_hex().to_string()
}

/// Digest of a container: its name plus every item digest in item order.
pub fn container_digest(container: &ContainerNode) -> String {
    let mut hasher = Hasher::new();
    hasher.update(container.name.as_bytes());
    hasher.update(b"\n");
    for item in &container.items {
        hasher.update(item_digest(item).as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Fingerprint of a program node given its source and target containers.
///
/// Pure: same config and same source content (in source order) always yield
/// the same digest.
pub fn compute(node: &ProgramNode, sources: &[ContainerNode], targets: &[ContainerNode]) -> String {
    let mut hasher = Hasher::new();

    hasher.update(node.program_type.as_bytes());
    hasher.update(b"\n");

    // BTreeMap iteration keeps config hashing order-stable.
    for (key, value) in &node.config {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    }

    for source in sources {
        hasher.update(container_digest(source).as_bytes());
    }

    // Names only; see module docs.
    for target in targets {
        hasher.update(b"target:");
        hasher.update(target.name.as_bytes());
        hasher.update(b"\n");
    }

    hasher.finalize().to_hex().to_string()
}
