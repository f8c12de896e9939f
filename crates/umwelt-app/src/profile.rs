//! Agent profiles: definitions plus the cognition graph.

use crate::AppError;
use std::collections::BTreeSet;
use umwelt_model::{CognitionGraph, GmDefinition};

/// Everything needed to bring one agent up.
///
/// Graph children without a matching GM definition are detectors: leaf
/// sources that publish prediction errors directly and never report
/// rounds (their parents complete by timer instead).
#[derive(Debug)]
pub struct AgentProfile {
    /// The GM definitions, one per graph node that is a GM.
    pub gms: Vec<GmDefinition>,
    /// Parent → children edges; the root is the hyper-prior GM.
    pub graph: CognitionGraph,
}

impl AgentProfile {
    /// Creates a profile over the given graph.
    #[must_use]
    pub fn new(graph: CognitionGraph) -> Self {
        Self {
            gms: Vec::new(),
            graph,
        }
    }

    /// Adds a GM definition (builder-style).
    #[must_use]
    pub fn with_gm(mut self, def: GmDefinition) -> Self {
        self.gms.push(def);
        self
    }

    /// Returns `true` if `name` appears in the graph without a GM
    /// definition.
    #[must_use]
    pub fn is_detector(&self, name: &str) -> bool {
        !self.gms.iter().any(|gm| gm.name == name)
    }

    /// Validates the profile as a whole.
    ///
    /// # Errors
    ///
    /// Every GM definition must validate, the graph must be acyclic, GM
    /// names must be unique, and every graph parent must have a
    /// definition.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut names = BTreeSet::new();
        for gm in &self.gms {
            gm.validate()?;
            if !names.insert(gm.name.as_str()) {
                return Err(AppError::DuplicateGm { name: gm.name.clone() });
            }
        }

        self.graph.validate()?;
        for parent in self.graph.parents() {
            if !names.contains(parent) {
                return Err(AppError::UnknownParent {
                    name: parent.to_string(),
                });
            }
        }
        Ok(())
    }
}
