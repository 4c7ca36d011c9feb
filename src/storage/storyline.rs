//! Storyline file
//!
//! Nodes and edges are authored as YAML, or JSON when the file has a
//! `.json` extension. The document is validated into a [`Storyline`] when
//! read, so the resolver never sees duplicate or dangling IDs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::read_locked;
use crate::domain::{Edge, Node, NodeId, Storyline};

/// On-disk storyline layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorylineDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Reads the storyline
pub struct StorylineStore {
    path: PathBuf,
}

impl StorylineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the storyline file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the raw document without validation
    pub fn read_document(&self) -> Result<StorylineDocument> {
        let content = read_locked(&self.path)?;

        if self.path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse storyline: {}", self.path.display()))
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse storyline: {}", self.path.display()))
        }
    }

    /// Reads and validates the storyline
    pub fn read(&self, root: &str) -> Result<Storyline> {
        let document = self.read_document()?;
        let root: NodeId = root.parse().context("Invalid storyline root ID")?;

        Storyline::with_root(root, document.nodes, document.edges)
            .with_context(|| format!("Invalid storyline: {}", self.path.display()))
    }
}
