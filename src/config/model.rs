// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level board file as read from TOML.
///
/// ```toml
/// [container.uncat]
/// name = "Uncategorized"
/// items = ["Mouse lag on wake", "Dark mode", "Crash on upload"]
///
/// [program.cat]
/// type = "categorize"
/// sources = ["uncat"]
/// targets = ["bugs", "ideas"]
///
/// [container.bugs]
/// name = "Bugs"
///
/// [container.ideas]
/// name = "Ideas"
/// ```
///
/// Container and program keys are file-local labels; `sources` and
/// `targets` reference those labels and become edges in listed order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBoardFile {
    /// All containers from `[container.<label>]`.
    #[serde(default)]
    pub container: BTreeMap<String, ContainerConfig>,

    /// All program nodes from `[program.<label>]`.
    #[serde(default)]
    pub program: BTreeMap<String, ProgramConfig>,

    /// Optional canned corpus for the offline search collaborator, from
    /// repeated `[[search_result]]` tables.
    #[serde(default)]
    pub search_result: Vec<SearchResultConfig>,
}

/// One `[[search_result]]` entry for the offline search corpus.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResultConfig {
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

/// `[container.<label>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContainerConfig {
    /// Display name; defaults to the label when omitted.
    #[serde(default)]
    pub name: Option<String>,

    /// Initial item texts.
    #[serde(default)]
    pub items: Vec<String>,
}

/// `[program.<label>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    /// Registry type tag (e.g. `"categorize"`).
    #[serde(rename = "type")]
    pub program_type: String,

    /// Labels of source containers, in edge order.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Labels of target containers, in edge order.
    #[serde(default)]
    pub targets: Vec<String>,

    /// Program-specific configuration fields.
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

/// A board file that passed semantic validation.
///
/// Constructed only via `TryFrom<RawBoardFile>` (see `validate`).
#[derive(Debug, Clone)]
pub struct BoardFile {
    pub container: BTreeMap<String, ContainerConfig>,
    pub program: BTreeMap<String, ProgramConfig>,
    pub search_result: Vec<SearchResultConfig>,
}

impl BoardFile {
    /// Internal constructor used after validation.
    pub(crate) fn new_unchecked(
        container: BTreeMap<String, ContainerConfig>,
        program: BTreeMap<String, ProgramConfig>,
        search_result: Vec<SearchResultConfig>,
    ) -> Self {
        Self {
            container,
            program,
            search_result,
        }
    }
}
