//! The definition catalogue.
//!
//! A `Registry` is populated by direct registration calls during a
//! startup phase and read-only for the rest of the run: the generation
//! entry point borrows it immutably. It is an explicitly constructed,
//! explicitly scoped value, so independent runs (and tests) never share
//! state.

use std::collections::HashMap;

use crate::core::dependency::DependencyDecl;
use crate::core::project::{BaseDef, ProjectDef};
use crate::core::solution::SolutionDef;
use crate::errors::GenError;
use crate::util::InternedString;

/// The write-once catalogue of projects, solutions, base definitions,
/// and registration-time dependency declarations.
#[derive(Debug, Default)]
pub struct Registry {
    bases: Vec<BaseDef>,
    base_index: HashMap<InternedString, usize>,

    projects: Vec<ProjectDef>,
    project_index: HashMap<InternedString, usize>,

    solutions: Vec<SolutionDef>,
    solution_index: HashMap<InternedString, usize>,

    dependencies: Vec<DependencyDecl>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a base definition.
    pub fn add_base(&mut self, base: BaseDef) -> Result<(), GenError> {
        let name = base.name();
        if self.base_index.contains_key(&name) {
            return Err(GenError::DuplicateDefinition {
                name,
                detail: "a base definition with this name is already registered".to_string(),
            });
        }
        self.base_index.insert(name, self.bases.len());
        self.bases.push(base);
        Ok(())
    }

    /// Register a project definition.
    pub fn add_project(&mut self, project: ProjectDef) -> Result<(), GenError> {
        let name = project.name();
        if self.project_index.contains_key(&name) {
            return Err(GenError::DuplicateDefinition {
                name,
                detail: "a project with this name is already registered".to_string(),
            });
        }
        self.project_index.insert(name, self.projects.len());
        self.projects.push(project);
        Ok(())
    }

    /// Register a solution definition.
    pub fn add_solution(&mut self, solution: SolutionDef) -> Result<(), GenError> {
        let name = solution.name();
        if self.solution_index.contains_key(&name) {
            return Err(GenError::DuplicateDefinition {
                name,
                detail: "a solution with this name is already registered".to_string(),
            });
        }
        self.solution_index.insert(name, self.solutions.len());
        self.solutions.push(solution);
        Ok(())
    }

    /// Record a standalone dependency declaration (outside any project
    /// definition). Edge-level dedup happens in the graph.
    pub fn add_dependency(&mut self, decl: DependencyDecl) {
        self.dependencies.push(decl);
    }

    pub fn base(&self, name: InternedString) -> Option<&BaseDef> {
        self.base_index.get(&name).map(|&i| &self.bases[i])
    }

    pub fn project(&self, name: InternedString) -> Option<&ProjectDef> {
        self.project_index.get(&name).map(|&i| &self.projects[i])
    }

    pub fn solution(&self, name: InternedString) -> Option<&SolutionDef> {
        self.solution_index.get(&name).map(|&i| &self.solutions[i])
    }

    /// Projects in registration order.
    pub fn projects(&self) -> &[ProjectDef] {
        &self.projects
    }

    /// Solutions in registration order.
    pub fn solutions(&self) -> &[SolutionDef] {
        &self.solutions
    }

    /// Standalone dependency declarations in registration order.
    pub fn dependencies(&self) -> &[DependencyDecl] {
        &self.dependencies
    }

    pub fn contains_project(&self, name: InternedString) -> bool {
        self.project_index.contains_key(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_project_rejected() {
        let mut registry = Registry::new();
        registry.add_project(ProjectDef::new("game")).unwrap();

        let err = registry.add_project(ProjectDef::new("game")).unwrap_err();
        assert!(matches!(err, GenError::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = Registry::new();
        registry.add_project(ProjectDef::new("scheduler")).unwrap();
        registry.add_project(ProjectDef::new("graphics")).unwrap();
        registry.add_project(ProjectDef::new("game")).unwrap();

        let names: Vec<_> = registry.projects().iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![
                InternedString::new("scheduler"),
                InternedString::new("graphics"),
                InternedString::new("game"),
            ]
        );
    }

    #[test]
    fn test_lookup_by_name() {
        let mut registry = Registry::new();
        registry.add_solution(SolutionDef::new("putka")).unwrap();

        assert!(registry.solution(InternedString::new("putka")).is_some());
        assert!(registry.solution(InternedString::new("missing")).is_none());
    }
}
