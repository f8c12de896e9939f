//! The cognition graph: which GMs feed which.
//!
//! GMs reference each other by **name only** and communicate exclusively
//! over the bus; the graph is pure data. Children that are not defined as
//! GMs are detectors — leaf sources that publish prediction errors but
//! never report rounds.

use crate::DefinitionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parent → children edges of the GM graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CognitionGraph {
    children: BTreeMap<String, Vec<String>>,
}

impl CognitionGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge from `parent` to `child`.
    pub fn add(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        self.children.entry(parent.into()).or_default().push(child.into());
    }

    /// Adds an edge (builder-style).
    #[must_use]
    pub fn with_edge(mut self, parent: impl Into<String>, child: impl Into<String>) -> Self {
        self.add(parent, child);
        self
    }

    /// The children of `gm` (sub-GMs and detectors).
    #[must_use]
    pub fn children_of(&self, gm: &str) -> &[String] {
        self.children.get(gm).map_or(&[], Vec::as_slice)
    }

    /// The parents of `gm`.
    #[must_use]
    pub fn parents_of(&self, gm: &str) -> Vec<String> {
        self.children
            .iter()
            .filter(|(_, children)| children.iter().any(|c| c == gm))
            .map(|(parent, _)| parent.clone())
            .collect()
    }

    /// All parent names in the graph.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Validates that the graph is acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::CyclicGraph`] naming a node on the
    /// cycle.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            graph: &CognitionGraph,
            node: &str,
            marks: &mut BTreeMap<String, Mark>,
        ) -> Result<(), DefinitionError> {
            match marks.get(node) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(DefinitionError::CyclicGraph { via: node.to_string() })
                }
                None => {}
            }
            marks.insert(node.to_string(), Mark::Visiting);
            for child in graph.children_of(node) {
                visit(graph, child, marks)?;
            }
            marks.insert(node.to_string(), Mark::Done);
            Ok(())
        }

        let mut marks = BTreeMap::new();
        for parent in self.children.keys() {
            visit(self, parent, &mut marks)?;
        }
        Ok(())
    }
}
