//! Dependency graph over entity labels.

use crate::snapshot::model::Entity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// `roots` are entities nothing else uses; `tree` maps each label with
/// dependencies to the labels it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub roots: Vec<String>,
    pub tree: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn from_entities(entities: &[Entity]) -> Self {
        let mut graph = DependencyGraph::default();
        for entity in entities {
            let label = entity.display_label().to_string();
            if entity.dependencies.used_by.is_empty() {
                graph.roots.push(label.clone());
            }
            if !entity.dependencies.depends_on.is_empty() {
                graph
                    .tree
                    .insert(label, entity.dependencies.depends_on.clone());
            }
        }
        graph
    }

    /// Labels `label` depends on directly.
    pub fn dependencies_of(&self, label: &str) -> &[String] {
        self.tree.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first walk from every root as `(depth, label)` pairs.
    ///
    /// Each label is visited once, so cycles terminate.
    pub fn walk(&self) -> Vec<(usize, &str)> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        for root in &self.roots {
            self.walk_from(root, 0, &mut visited, &mut out);
        }
        out
    }

    fn walk_from<'a>(
        &'a self,
        label: &'a str,
        depth: usize,
        visited: &mut HashSet<&'a str>,
        out: &mut Vec<(usize, &'a str)>,
    ) {
        if !visited.insert(label) {
            return;
        }
        out.push((depth, label));
        for child in self.dependencies_of(label) {
            self.walk_from(child, depth + 1, visited, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_tree() -> Vec<Entity> {
        vec![
            Entity::new("Sketch", "Sketch", "Sketcher::SketchObject")
                .with_dependencies(vec![], vec!["Pad".to_string()]),
            Entity::new("Pad", "Pad", "PartDesign::Pad")
                .with_dependencies(vec!["Sketch".to_string()], vec!["Body".to_string()]),
            Entity::new("Body", "Body", "PartDesign::Body")
                .with_dependencies(vec!["Pad".to_string()], vec![]),
        ]
    }

    #[test]
    fn test_roots_are_unused_entities() {
        let graph = DependencyGraph::from_entities(&feature_tree());
        assert_eq!(graph.roots, vec!["Body".to_string()]);
        assert_eq!(graph.dependencies_of("Pad"), ["Sketch".to_string()]);
        assert!(graph.dependencies_of("Missing").is_empty());
        assert!(!graph.tree.contains_key("Sketch"));
    }

    #[test]
    fn test_walk_is_depth_first() {
        let graph = DependencyGraph::from_entities(&feature_tree());
        assert_eq!(graph.walk(), vec![(0, "Body"), (1, "Pad"), (2, "Sketch")]);
    }

    #[test]
    fn test_walk_terminates_on_cycles() {
        let entities = vec![
            Entity::new("A", "A", "Part::Feature")
                .with_dependencies(vec!["B".to_string()], vec![]),
            Entity::new("B", "B", "Part::Feature")
                .with_dependencies(vec!["A".to_string()], vec!["A".to_string()]),
        ];
        let graph = DependencyGraph::from_entities(&entities);
        assert_eq!(graph.walk(), vec![(0, "A"), (1, "B")]);
    }
}
