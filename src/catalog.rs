use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::models::{PathDefinition, StepDefinition, StepId};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

pub const DEFAULT_PATH_ID: &str = "beginner";

/// Ordered set of learning paths. Document order is kept because it is the
/// order paths are offered in.
#[derive(Debug, Clone, Default)]
pub struct PathCatalog {
    paths: Vec<(String, PathDefinition)>,
}

impl PathCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let Value::Object(map) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let paths = map
            .into_iter()
            .map(|(id, raw)| {
                let path = parse_path(&id, raw);
                (id, path)
            })
            .collect();

        Ok(Self::from_paths(paths))
    }

    pub fn from_paths(paths: Vec<(String, PathDefinition)>) -> Self {
        let mut catalog = Self { paths };
        catalog.resolve_prerequisites();
        catalog.check_unique_ids();
        catalog
    }

    // Prerequisites may name a step by title or by id; resolve them once here
    fn resolve_prerequisites(&mut self) {
        for (path_id, path) in &mut self.paths {
            let lookup: Vec<(StepId, String)> = path
                .steps
                .iter()
                .map(|s| (s.id.clone(), s.title.clone()))
                .collect();

            for step in &mut path.steps {
                step.prerequisite_ids = step
                    .prerequisites
                    .iter()
                    .filter_map(|reference| {
                        let found = lookup
                            .iter()
                            .find(|(id, title)| title == reference || id.matches_text(reference))
                            .map(|(id, _)| id.clone());
                        if found.is_none() {
                            warn!(
                                path = %path_id,
                                step = %step.id,
                                reference = %reference,
                                "unresolved prerequisite ignored"
                            );
                        }
                        found
                    })
                    .collect();
            }
        }
    }

    fn check_unique_ids(&self) {
        let mut seen = HashSet::new();
        for (path_id, path) in &self.paths {
            for step in &path.steps {
                if !seen.insert(step.id.clone()) {
                    warn!(path = %path_id, step = %step.id, "duplicate step id in catalog");
                }
            }
        }
    }

    pub fn get(&self, path_id: &str) -> Option<&PathDefinition> {
        self.paths
            .iter()
            .find(|(id, _)| id == path_id)
            .map(|(_, path)| path)
    }

    pub fn contains(&self, path_id: &str) -> bool {
        self.get(path_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathDefinition)> {
        self.paths.iter().map(|(id, path)| (id.as_str(), path))
    }

    pub fn path_ids(&self) -> Vec<&str> {
        self.paths.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// "beginner" when the catalog has it, otherwise the first path.
    pub fn default_path_id(&self) -> &str {
        if self.contains(DEFAULT_PATH_ID) {
            return DEFAULT_PATH_ID;
        }
        self.paths
            .first()
            .map(|(id, _)| id.as_str())
            .unwrap_or(DEFAULT_PATH_ID)
    }

    /// Finds a step anywhere in the catalog: (path id, index, step).
    pub fn find_step(&self, step_id: &StepId) -> Option<(&str, usize, &StepDefinition)> {
        self.paths.iter().find_map(|(path_id, path)| {
            path.steps
                .iter()
                .enumerate()
                .find(|(_, s)| &s.id == step_id)
                .map(|(i, s)| (path_id.as_str(), i, s))
        })
    }
}

fn parse_path(id: &str, raw: Value) -> PathDefinition {
    let fallback_name = raw
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(id)
        .to_string();

    let mut path = match serde_json::from_value::<PathDefinition>(raw) {
        Ok(path) => path,
        Err(e) => {
            warn!(path = %id, error = %e, "malformed path definition, rendering it empty");
            PathDefinition::default()
        }
    };

    if path.name.is_empty() {
        path.name = fallback_name;
    }
    debug!(path = %id, steps = path.steps.len(), "loaded path");
    path
}
