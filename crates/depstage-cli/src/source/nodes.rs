//! Normalized node-list input.
//!
//! Either a bare list or a wrapper object with an optional title:
//!
//! ```yaml
//! title: release pipeline
//! nodes:
//!   - name: build
//!   - name: test
//!     depends_on: [build]
//!     metadata: { owner: qa }
//! ```
//!
//! `dependsOn` is accepted as an alias of `depends_on`. Files ending in
//! `.json` are read with `serde_json`; anything else with `serde_yaml`.

use std::path::Path;

use anyhow::Result;
use depstage_core::NodeEntry;
use serde::Deserialize;

use super::ParsedInput;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeDocument {
    List(Vec<NodeEntry>),
    Wrapped {
        #[serde(default)]
        title: Option<String>,
        nodes: Vec<NodeEntry>,
    },
}

pub fn parse(path: &Path, content: &str) -> Result<ParsedInput> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let document: NodeDocument = if is_json {
        serde_json::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };

    Ok(match document {
        NodeDocument::List(entries) => ParsedInput {
            title: None,
            entries,
        },
        NodeDocument::Wrapped { title, nodes } => ParsedInput {
            title,
            entries: nodes,
        },
    })
}
