// src/config/validate.rs

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use crate::config::model::{BoardFile, RawBoardFile};
use crate::errors::{FlowdagError, Result};
use crate::programs::ProgramRegistry;

impl TryFrom<RawBoardFile> for BoardFile {
    type Error = FlowdagError;

    fn try_from(raw: RawBoardFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_board(&raw)?;
        Ok(BoardFile::new_unchecked(
            raw.container,
            raw.program,
            raw.search_result,
        ))
    }
}

fn validate_raw_board(raw: &RawBoardFile) -> Result<()> {
    ensure_has_programs(raw)?;
    validate_program_types(raw)?;
    validate_references(raw)?;
    warn_on_cycles(raw);
    Ok(())
}

fn ensure_has_programs(raw: &RawBoardFile) -> Result<()> {
    if raw.program.is_empty() {
        return Err(FlowdagError::ConfigError(
            "board must contain at least one [program.<label>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_program_types(raw: &RawBoardFile) -> Result<()> {
    let registry = ProgramRegistry::builtin();
    for (label, program) in raw.program.iter() {
        if registry.find(&program.program_type).is_none() {
            return Err(FlowdagError::ConfigError(format!(
                "program '{}' has unknown type '{}' (known: {})",
                label,
                program.program_type,
                registry.names().join(", ")
            )));
        }
    }
    Ok(())
}

fn validate_references(raw: &RawBoardFile) -> Result<()> {
    for (label, program) in raw.program.iter() {
        for reference in program.sources.iter().chain(program.targets.iter()) {
            if !raw.container.contains_key(reference) {
                return Err(FlowdagError::ConfigError(format!(
                    "program '{}' references unknown container '{}'",
                    label, reference
                )));
            }
        }
        for source in program.sources.iter() {
            if program.targets.contains(source) {
                return Err(FlowdagError::ConfigError(format!(
                    "program '{}' uses container '{}' as both source and target",
                    label, source
                )));
            }
        }
    }
    Ok(())
}

/// Program-level cycles are legal (the planner breaks them
/// deterministically), but almost always a board-authoring mistake, so
/// they get a diagnostic.
fn warn_on_cycles(raw: &RawBoardFile) {
    // Derived program -> program edges: a's target container is b's source.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for label in raw.program.keys() {
        graph.add_node(label.as_str());
    }

    for (a, pa) in raw.program.iter() {
        for (b, pb) in raw.program.iter() {
            if a == b {
                continue;
            }
            if pa.targets.iter().any(|t| pb.sources.contains(t)) {
                graph.add_edge(a.as_str(), b.as_str(), ());
            }
        }
    }

    for component in tarjan_scc(&graph) {
        if component.len() > 1 {
            warn!(
                programs = ?component,
                "program cycle on board; execution order will break it deterministically"
            );
        }
    }
}
