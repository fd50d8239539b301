// SPDX-License-Identifier: PMPL-1.0-or-later

//! Nested translation dictionaries and dotted-key resolution.
//!
//! A dictionary is a tree of branches keyed by segment, with string leaves.
//! `"hero.saveTheDate"` walks the `hero` branch and returns its
//! `saveTheDate` leaf. Misses never fail: they resolve through the
//! fallback chain (explicit fallback, last segment, full key).

use crate::i18n::I18nError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A translated string or a nested namespace of further nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DictionaryNode {
    Leaf(String),
    Branch(BTreeMap<String, DictionaryNode>),
}

/// All translated strings for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    root: BTreeMap<String, DictionaryNode>,
}

impl Dictionary {
    pub fn new(root: BTreeMap<String, DictionaryNode>) -> Self {
        Self { root }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub(crate) fn parse(language: &str, raw: &str) -> Result<Self, I18nError> {
        Self::from_json(raw).map_err(|source| I18nError::DictionaryParse {
            language: language.to_string(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of string leaves in the tree.
    pub fn len(&self) -> usize {
        fn count(node: &DictionaryNode) -> usize {
            match node {
                DictionaryNode::Leaf(_) => 1,
                DictionaryNode::Branch(children) => children.values().map(count).sum(),
            }
        }
        self.root.values().map(count).sum()
    }

    /// Walk `key` segment by segment. `None` when a segment is missing, a
    /// leaf is hit with segments remaining, or the walk ends on a branch.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut node = self.root.get(first)?;
        for segment in segments {
            node = match node {
                DictionaryNode::Branch(children) => children.get(segment)?,
                DictionaryNode::Leaf(_) => return None,
            };
        }
        match node {
            DictionaryNode::Leaf(value) => Some(value.as_str()),
            DictionaryNode::Branch(_) => None,
        }
    }

    /// Resolve `key`, falling back to `fallback`, then the last segment of
    /// the key, then the key itself.
    pub fn resolve(&self, key: &str, fallback: Option<&str>) -> String {
        match self.lookup(key) {
            Some(value) => value.to_string(),
            None => fallback_for(key, fallback),
        }
    }

    /// Every leaf path in dotted form, sorted.
    pub fn keys(&self) -> Vec<String> {
        fn collect(prefix: &str, node: &DictionaryNode, out: &mut Vec<String>) {
            match node {
                DictionaryNode::Leaf(_) => out.push(prefix.to_string()),
                DictionaryNode::Branch(children) => {
                    for (segment, child) in children {
                        collect(&format!("{prefix}.{segment}"), child, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        for (segment, node) in &self.root {
            collect(segment, node, &mut out);
        }
        out
    }
}

fn fallback_for(key: &str, fallback: Option<&str>) -> String {
    if let Some(explicit) = fallback.filter(|value| !value.is_empty()) {
        return explicit.to_string();
    }
    match key.rsplit('.').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => key.to_string(),
    }
}
