//! Solution declarations.
//!
//! A solution names the projects it bundles directly; everything else in
//! its closure is pulled in by the assembler through the project graph.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::target::{Target, TargetDecl, TargetSpace};
use crate::util::InternedString;

/// A direct solution membership.
#[derive(Debug, Clone)]
pub struct SolutionMember {
    project: InternedString,
    filter: Option<TargetSpace>,
}

impl SolutionMember {
    pub fn new(project: impl Into<InternedString>) -> Self {
        SolutionMember {
            project: project.into(),
            filter: None,
        }
    }

    /// Restrict the membership to a subset of the solution's targets.
    pub fn with_filter(mut self, filter: TargetSpace) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn project(&self) -> InternedString {
        self.project
    }

    pub fn filter(&self) -> Option<&TargetSpace> {
        self.filter.as_ref()
    }

    pub fn applies_to(&self, target: Target) -> bool {
        self.filter.as_ref().map_or(true, |f| f.contains(target))
    }
}

/// A registered solution definition.
#[derive(Debug, Clone)]
pub struct SolutionDef {
    name: InternedString,
    location: PathBuf,
    targets: TargetSpace,
    members: Vec<SolutionMember>,
    solution_path: Option<String>,
}

impl SolutionDef {
    pub fn new(name: impl Into<InternedString>) -> Self {
        SolutionDef {
            name: name.into(),
            location: PathBuf::new(),
            targets: TargetSpace::empty(),
            members: Vec::new(),
            solution_path: None,
        }
    }

    /// Set the declaration directory used to resolve `[solution.dir]`.
    pub fn at_location(mut self, dir: impl Into<PathBuf>) -> Self {
        self.location = dir.into();
        self
    }

    /// Expand a target declaration into the solution's space.
    pub fn with_targets(mut self, decl: &TargetDecl) -> Self {
        self.targets.add_decl(decl);
        self
    }

    /// Add a direct project membership, in declaration order.
    pub fn with_member(mut self, member: SolutionMember) -> Self {
        self.members.push(member);
        self
    }

    /// Shorthand for an unfiltered membership.
    pub fn with_project(self, project: impl Into<InternedString>) -> Self {
        self.with_member(SolutionMember::new(project))
    }

    /// Set the output path template for the solution file itself. May
    /// contain the `[solution.dir]` token.
    pub fn with_solution_path(mut self, path: impl Into<String>) -> Self {
        self.solution_path = Some(path.into());
        self
    }

    pub fn name(&self) -> InternedString {
        self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn targets(&self) -> &TargetSpace {
        &self.targets
    }

    pub fn members(&self) -> &[SolutionMember] {
        &self.members
    }

    pub fn solution_path(&self) -> Option<&str> {
        self.solution_path.as_deref()
    }
}

impl fmt::Display for SolutionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} member(s), {} target(s))",
            self.name,
            self.members.len(),
            self.targets.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimension::{Optimization, Platform, Toolchain};

    #[test]
    fn test_membership_filter() {
        let debug_only = TargetSpace::from_decl(
            &TargetDecl::new()
                .platform(Platform::Win64)
                .toolchain(Toolchain::Msvc2019)
                .optimization(Optimization::Debug),
        );
        let member = SolutionMember::new("test-tech").with_filter(debug_only);

        let debug = Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Debug);
        let retail = Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Retail);
        assert!(member.applies_to(debug));
        assert!(!member.applies_to(retail));
    }

    #[test]
    fn test_members_keep_declaration_order() {
        let solution = SolutionDef::new("putka")
            .with_project("game")
            .with_project("test-tech")
            .with_project("test-scheduler");

        let names: Vec<_> = solution.members().iter().map(|m| m.project()).collect();
        assert_eq!(
            names,
            vec![
                InternedString::new("game"),
                InternedString::new("test-tech"),
                InternedString::new("test-scheduler"),
            ]
        );
    }
}
