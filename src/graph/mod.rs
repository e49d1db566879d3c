//! The project dependency graph.
//!
//! Nodes are registered projects; edges carry visibility and an optional
//! target filter. The graph is append-only during the configuration
//! phase and frozen before any closure or cycle computation runs.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::core::dependency::{DependencyDecl, Visibility};
use crate::core::registry::Registry;
use crate::core::target::{Target, TargetSpace};
use crate::errors::GenError;
use crate::util::diagnostic::Diagnostic;
use crate::util::InternedString;

#[derive(Debug, Clone, PartialEq, Eq)]
struct EdgeInfo {
    visibility: Visibility,
    filter: Option<TargetSpace>,
}

impl EdgeInfo {
    fn applies_to(&self, target: Target) -> bool {
        self.filter.as_ref().map_or(true, |f| f.contains(target))
    }
}

/// Directed dependency graph over project identities.
#[derive(Debug, Default)]
pub struct ProjectGraph {
    graph: DiGraph<InternedString, EdgeInfo>,
    nodes: HashMap<InternedString, NodeIndex>,
}

impl ProjectGraph {
    pub fn new() -> Self {
        ProjectGraph::default()
    }

    /// Build the graph from every registered declaration plus the edges
    /// hooks declared during configuration, in that order. Nodes exist
    /// for all registered projects even when isolated. Edge endpoints
    /// that name unregistered projects are reported and skipped.
    pub fn from_declarations(
        registry: &Registry,
        hook_edges: &[DependencyDecl],
    ) -> (Self, Vec<GenError>) {
        let mut graph = ProjectGraph::new();
        let mut errors = Vec::new();

        for project in registry.projects() {
            graph.ensure_node(project.name());
        }

        let declared = registry
            .projects()
            .iter()
            .flat_map(|p| p.dependencies().iter())
            .chain(registry.dependencies().iter())
            .chain(hook_edges.iter());

        for decl in declared {
            if !registry.contains_project(decl.from()) {
                errors.push(GenError::unknown_project("dependency declaration", &decl.from()));
                continue;
            }
            if !registry.contains_project(decl.to()) {
                errors.push(GenError::unknown_project(&decl.from(), &decl.to()));
                continue;
            }
            if let Err(e) = graph.add_dependency(decl) {
                errors.push(e);
            }
        }

        (graph, errors)
    }

    fn ensure_node(&mut self, name: InternedString) -> NodeIndex {
        match self.nodes.get(&name) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(name);
                self.nodes.insert(name, idx);
                idx
            }
        }
    }

    /// Add a dependency edge.
    ///
    /// Re-declaring an identical edge is a no-op; declaring the same
    /// (from, to, filter) with the other visibility is a conflict.
    pub fn add_dependency(&mut self, decl: &DependencyDecl) -> Result<(), GenError> {
        let from = self.ensure_node(decl.from());
        let to = self.ensure_node(decl.to());

        for edge in self.graph.edges_connecting(from, to) {
            let existing: &EdgeInfo = edge.weight();
            if existing.filter.as_ref() == decl.filter() {
                if existing.visibility == decl.visibility() {
                    return Ok(());
                }
                return Err(GenError::DuplicateDefinition {
                    name: decl.from(),
                    detail: format!(
                        "dependency on `{}` declared both {} and {}",
                        decl.to(),
                        existing.visibility,
                        decl.visibility()
                    ),
                });
            }
        }

        self.graph.add_edge(
            from,
            to,
            EdgeInfo {
                visibility: decl.visibility(),
                filter: decl.filter().cloned(),
            },
        );
        Ok(())
    }

    /// Out-edges of a node in declaration order.
    fn edges_from(&self, node: NodeIndex) -> Vec<(NodeIndex, &EdgeInfo)> {
        // petgraph iterates out-edges most-recent first; reverse to get
        // declaration order back.
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|e| (e.target(), e.weight()))
            .collect();
        edges.reverse();
        edges
    }

    /// Direct dependencies of a project under one target.
    pub fn direct_dependencies(
        &self,
        project: InternedString,
        target: Target,
    ) -> Vec<(InternedString, Visibility)> {
        let Some(&node) = self.nodes.get(&project) else {
            return Vec::new();
        };
        self.edges_from(node)
            .into_iter()
            .filter(|(_, info)| info.applies_to(target))
            .map(|(next, info)| (self.graph[next], info.visibility))
            .collect()
    }

    /// Visibility-respecting transitive closure from `root` under one
    /// target, `root` included, ordered by first visit, deduplicated by
    /// identity.
    ///
    /// Public edges are followed transitively. Private edges are
    /// followed one hop from the root only: a private dependency is not
    /// re-exported by its consumer, so intermediate nodes contribute
    /// nothing through theirs.
    pub fn transitive_closure(
        &self,
        root: InternedString,
        target: Target,
    ) -> Result<Vec<InternedString>, GenError> {
        let Some(&root_node) = self.nodes.get(&root) else {
            return Ok(Vec::new());
        };

        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        self.visit(root_node, target, true, &mut visited, &mut path, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        node: NodeIndex,
        target: Target,
        at_root: bool,
        visited: &mut HashSet<NodeIndex>,
        path: &mut Vec<NodeIndex>,
        order: &mut Vec<InternedString>,
    ) -> Result<(), GenError> {
        if visited.insert(node) {
            order.push(self.graph[node]);
        }
        path.push(node);

        for (next, info) in self.edges_from(node) {
            if !info.applies_to(target) {
                continue;
            }
            if !at_root && info.visibility == Visibility::Private {
                continue;
            }
            if let Some(pos) = path.iter().position(|&n| n == next) {
                let mut cycle: Vec<InternedString> =
                    path[pos..].iter().map(|&n| self.graph[n]).collect();
                cycle.push(self.graph[next]);
                return Err(GenError::CyclicDependency {
                    target,
                    path: cycle,
                });
            }
            if visited.contains(&next) {
                continue;
            }
            self.visit(next, target, false, visited, path, order)?;
        }

        path.pop();
        Ok(())
    }

    /// Find every cycle in the subgraph of edges applicable to `target`.
    ///
    /// Each returned path starts and ends at the same project. A cycle
    /// that exists only under filters excluding `target` is not reported
    /// for it.
    pub fn detect_cycles(&self, target: Target) -> Vec<Vec<InternedString>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Grey,
            Black,
        }

        let mut color = vec![Color::White; self.graph.node_count()];
        let mut stack = Vec::new();
        let mut cycles = Vec::new();

        // Recursive DFS over all nodes in insertion order keeps the
        // reported cycles deterministic.
        fn dfs(
            graph: &ProjectGraph,
            node: NodeIndex,
            target: Target,
            color: &mut Vec<Color>,
            stack: &mut Vec<NodeIndex>,
            cycles: &mut Vec<Vec<InternedString>>,
        ) {
            color[node.index()] = Color::Grey;
            stack.push(node);

            for (next, info) in graph.edges_from(node) {
                if !info.applies_to(target) {
                    continue;
                }
                match color[next.index()] {
                    Color::Grey => {
                        let pos = stack.iter().position(|&n| n == next).unwrap();
                        let mut cycle: Vec<InternedString> =
                            stack[pos..].iter().map(|&n| graph.graph[n]).collect();
                        cycle.push(graph.graph[next]);
                        cycles.push(cycle);
                    }
                    Color::White => dfs(graph, next, target, color, stack, cycles),
                    Color::Black => {}
                }
            }

            stack.pop();
            color[node.index()] = Color::Black;
        }

        for node in self.graph.node_indices() {
            if color[node.index()] == Color::White {
                dfs(self, node, target, &mut color, &mut stack, &mut cycles);
            }
        }
        cycles
    }

    /// Report edges whose target filter is not a subset of both
    /// endpoints' supported spaces: such a filter is dead for the
    /// targets that fall outside.
    pub fn validate_filters(&self, registry: &Registry) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for edge in self.graph.edge_indices() {
            let Some(filter) = self.graph[edge].filter.as_ref() else {
                continue;
            };
            let (from, to) = self.graph.edge_endpoints(edge).unwrap();
            let from_name = self.graph[from];
            let to_name = self.graph[to];

            let (Some(from_def), Some(to_def)) = (
                registry.project(from_name),
                registry.project(to_name),
            ) else {
                continue;
            };

            let dead: Vec<String> = filter
                .iter()
                .filter(|&t| !from_def.targets().contains(t) || !to_def.targets().contains(t))
                .map(|t| t.to_string())
                .collect();

            if !dead.is_empty() {
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "dead target filter on dependency `{}` -> `{}`",
                        from_name, to_name
                    ))
                    .with_context(format!(
                        "filter lists {}, unsupported by one of the endpoints",
                        dead.join(", ")
                    ))
                    .with_suggestion("Drop the dead targets from the filter"),
                );
            }
        }
        diagnostics
    }

    /// Registered project identities, in insertion order.
    pub fn node_names(&self) -> impl Iterator<Item = InternedString> + '_ {
        self.graph.node_indices().map(|i| self.graph[i])
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimension::{Optimization, Platform, Toolchain};
    use crate::core::target::TargetDecl;

    fn target() -> Target {
        Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Debug)
    }

    fn name(s: &str) -> InternedString {
        InternedString::new(s)
    }

    fn names(list: &[InternedString]) -> Vec<&'static str> {
        list.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn test_identical_edge_added_twice_is_idempotent() {
        let mut graph = ProjectGraph::new();
        graph
            .add_dependency(&DependencyDecl::public("game", "graphics"))
            .unwrap();
        graph
            .add_dependency(&DependencyDecl::public("game", "graphics"))
            .unwrap();

        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_conflicting_visibility_is_duplicate_definition() {
        let mut graph = ProjectGraph::new();
        graph
            .add_dependency(&DependencyDecl::public("game", "graphics"))
            .unwrap();

        let err = graph
            .add_dependency(&DependencyDecl::private("game", "graphics"))
            .unwrap_err();
        assert!(matches!(err, GenError::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_diamond_closure_contains_shared_node_once() {
        let mut graph = ProjectGraph::new();
        graph
            .add_dependency(&DependencyDecl::public("a", "b"))
            .unwrap();
        graph
            .add_dependency(&DependencyDecl::public("a", "c"))
            .unwrap();
        graph
            .add_dependency(&DependencyDecl::public("b", "d"))
            .unwrap();
        graph
            .add_dependency(&DependencyDecl::public("c", "d"))
            .unwrap();

        let closure = graph.transitive_closure(name("a"), target()).unwrap();
        assert_eq!(names(&closure), vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_private_edges_are_not_reexported() {
        let mut graph = ProjectGraph::new();
        // root's own private dep is visible one hop...
        graph
            .add_dependency(&DependencyDecl::private("app", "impl-detail"))
            .unwrap();
        graph
            .add_dependency(&DependencyDecl::public("app", "lib"))
            .unwrap();
        // ...but lib's private dep is not part of app's closure.
        graph
            .add_dependency(&DependencyDecl::private("lib", "lib-internal"))
            .unwrap();
        graph
            .add_dependency(&DependencyDecl::public("lib", "lib-api"))
            .unwrap();

        let closure = graph.transitive_closure(name("app"), target()).unwrap();
        assert_eq!(names(&closure), vec!["app", "impl-detail", "lib", "lib-api"]);
    }

    #[test]
    fn test_filtered_edge_excluded_from_other_targets() {
        let win_only = TargetSpace::from_decl(
            &TargetDecl::new()
                .platform(Platform::Win64)
                .toolchain(Toolchain::Msvc2019)
                .optimization(Optimization::Debug),
        );
        let mut graph = ProjectGraph::new();
        graph
            .add_dependency(&DependencyDecl::public("game", "dx-backend").with_filter(win_only))
            .unwrap();

        let linux = Target::new(Platform::Linux64, Toolchain::Gcc, Optimization::Debug);
        let closure = graph.transitive_closure(name("game"), linux).unwrap();
        assert_eq!(names(&closure), vec!["game"]);

        let closure = graph.transitive_closure(name("game"), target()).unwrap();
        assert_eq!(names(&closure), vec!["game", "dx-backend"]);
    }

    #[test]
    fn test_cycle_reported_with_full_path() {
        let mut graph = ProjectGraph::new();
        graph
            .add_dependency(&DependencyDecl::public("a", "b"))
            .unwrap();
        graph
            .add_dependency(&DependencyDecl::public("b", "a"))
            .unwrap();

        let cycles = graph.detect_cycles(target());
        assert_eq!(cycles.len(), 1);
        assert_eq!(names(&cycles[0]), vec!["a", "b", "a"]);

        let err = graph.transitive_closure(name("a"), target()).unwrap_err();
        match err {
            GenError::CyclicDependency { path, .. } => {
                assert_eq!(names(&path), vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_under_excluded_filter_not_reported() {
        let win_only = TargetSpace::from_decl(
            &TargetDecl::new()
                .platform(Platform::Win64)
                .toolchain(Toolchain::Msvc2019)
                .optimization(Optimization::Debug),
        );
        let mut graph = ProjectGraph::new();
        graph
            .add_dependency(&DependencyDecl::public("a", "b"))
            .unwrap();
        graph
            .add_dependency(&DependencyDecl::public("b", "a").with_filter(win_only))
            .unwrap();

        let linux = Target::new(Platform::Linux64, Toolchain::Gcc, Optimization::Debug);
        assert!(graph.detect_cycles(linux).is_empty());
        assert_eq!(graph.detect_cycles(target()).len(), 1);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut graph = ProjectGraph::new();
        graph
            .add_dependency(&DependencyDecl::public("a", "a"))
            .unwrap();

        let cycles = graph.detect_cycles(target());
        assert_eq!(cycles.len(), 1);
        assert_eq!(names(&cycles[0]), vec!["a", "a"]);
    }
}
