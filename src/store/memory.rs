// src/store/memory.rs

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{ContainerNode, DocumentStore, Item, Node, NodeId, ProgramNode};

#[derive(Debug, Default)]
struct StoreInner {
    /// Arena of nodes keyed by id, in insertion order.
    nodes: Vec<Node>,
    /// Directed edges in insertion order; this order is the "native edge
    /// order" observed by upstream/downstream queries.
    edges: Vec<(NodeId, NodeId)>,
    /// Per-node scratch fields: (node id, key) -> value.
    scratch: BTreeMap<(NodeId, String), String>,
    next_id: u64,
    generation: u64,
}

impl StoreInner {
    fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == id)
    }

    fn assign_id(&mut self) -> NodeId {
        self.next_id += 1;
        format!("n{}", self.next_id)
    }
}

/// In-memory document store: arena of nodes plus adjacency, guarded by a
/// single mutex. One-node-at-a-time engine semantics mean the lock is never
/// contended in practice; it only makes the handle shareable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for seeding: insert a container with initial items.
    pub fn insert_container_with_items(&self, name: &str, items: Vec<Item>) -> NodeId {
        let id = self.insert_container(name);
        let mut inner = self.inner.lock().unwrap();
        let idx = inner.index_of(&id).unwrap();
        if let Node::Container(c) = &mut inner.nodes[idx] {
            c.items = items;
        }
        id
    }
}

impl DocumentStore for MemoryStore {
    fn node(&self, id: &str) -> Option<Node> {
        let inner = self.inner.lock().unwrap();
        inner.index_of(id).map(|i| inner.nodes[i].clone())
    }

    fn node_ids(&self) -> Vec<NodeId> {
        let inner = self.inner.lock().unwrap();
        inner.nodes.iter().map(|n| n.id().to_string()).collect()
    }

    fn outgoing(&self, id: &str) -> Vec<NodeId> {
        let inner = self.inner.lock().unwrap();
        inner
            .edges
            .iter()
            .filter(|(from, _)| from == id)
            .map(|(_, to)| to.clone())
            .collect()
    }

    fn incoming(&self, id: &str) -> Vec<NodeId> {
        let inner = self.inner.lock().unwrap();
        inner
            .edges
            .iter()
            .filter(|(_, to)| to == id)
            .map(|(from, _)| from.clone())
            .collect()
    }

    fn insert_program(&self, program_type: &str, config: BTreeMap<String, String>) -> NodeId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.assign_id();
        inner.nodes.push(Node::Program(ProgramNode {
            id: id.clone(),
            program_type: program_type.to_string(),
            config,
        }));
        inner.generation += 1;
        id
    }

    fn insert_container(&self, name: &str) -> NodeId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.assign_id();
        inner.nodes.push(Node::Container(ContainerNode {
            id: id.clone(),
            name: name.to_string(),
            items: Vec::new(),
        }));
        inner.generation += 1;
        id
    }

    fn connect(&self, from: &str, to: &str) {
        let mut inner = self.inner.lock().unwrap();
        if inner.index_of(from).is_none() || inner.index_of(to).is_none() {
            return;
        }
        inner.edges.push((from.to_string(), to.to_string()));
        inner.generation += 1;
    }

    fn remove_node(&self, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        let Some(idx) = inner.index_of(id) else {
            return;
        };
        inner.nodes.remove(idx);
        inner.edges.retain(|(from, to)| from != id && to != id);
        inner.scratch.retain(|(node, _), _| node != id);
        inner.generation += 1;
    }

    fn items(&self, container: &str) -> Vec<Item> {
        let inner = self.inner.lock().unwrap();
        inner
            .index_of(container)
            .and_then(|i| inner.nodes[i].as_container().map(|c| c.items.clone()))
            .unwrap_or_default()
    }

    fn append_item(&self, container: &str, item: Item) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let Some(idx) = inner.index_of(container) else {
            return false;
        };
        match &mut inner.nodes[idx] {
            Node::Container(c) => {
                c.items.push(item);
                true
            }
            Node::Program(_) => false,
        }
    }

    fn clear_items(&self, container: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(idx) = inner.index_of(container) {
            if let Node::Container(c) = &mut inner.nodes[idx] {
                c.items.clear();
            }
        }
    }

    fn set_container_name(&self, container: &str, name: &str) {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        if let Some(idx) = inner.index_of(container) {
            if let Node::Container(c) = &mut inner.nodes[idx] {
                c.name = name.to_string();
                inner.generation += 1;
            }
        }
    }

    fn set_config(&self, id: &str, key: &str, value: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(idx) = inner.index_of(id) {
            if let Node::Program(p) = &mut inner.nodes[idx] {
                p.config.insert(key.to_string(), value.to_string());
            }
        }
    }

    fn scratch(&self, id: &str, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.scratch.get(&(id.to_string(), key.to_string())).cloned()
    }

    fn set_scratch(&self, id: &str, key: &str, value: &str) {
        let mut inner = self.inner.lock().unwrap();
        if inner.index_of(id).is_none() {
            return;
        }
        inner
            .scratch
            .insert((id.to_string(), key.to_string()), value.to_string());
    }

    fn clear_scratch_key(&self, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.scratch.retain(|(_, k), _| k != key);
    }

    fn generation(&self) -> u64 {
        self.inner.lock().unwrap().generation
    }
}
