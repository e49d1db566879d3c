//! Solution assembly.
//!
//! For one (solution, target) pair the assembler closes over the project
//! graph from every direct member, unions the closures, and bundles the
//! memoized configuration of each member. It never configures anything
//! itself; by the time assembly runs, the pipeline has already settled
//! every pair and the graph is frozen.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::registry::Registry;
use crate::core::solution::SolutionDef;
use crate::core::target::Target;
use crate::errors::GenError;
use crate::graph::ProjectGraph;
use crate::pipeline::record::{substitute, SOLUTION_DIR_TOKEN};
use crate::pipeline::{ConfigurationPipeline, ConfigurationResult};
use crate::util::diagnostic::Diagnostic;
use crate::util::InternedString;

/// The assembled configuration of one (solution, target) pair.
#[derive(Debug, Clone)]
pub struct SolutionConfiguration {
    pub solution: InternedString,
    pub target: Target,
    /// Solution output path with `[solution.dir]` resolved.
    pub solution_path: Option<String>,
    /// Closure members in first-visit order: each direct member in
    /// declaration order, followed by what it pulls in.
    pub ordered_members: Vec<InternedString>,
    pub results: HashMap<InternedString, Arc<ConfigurationResult>>,
}

/// What assembling one (solution, target) produced.
pub struct AssembleOutcome {
    /// Present only when assembly was complete and error-free.
    pub configuration: Option<SolutionConfiguration>,
    pub errors: Vec<GenError>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Bundles closure computation with memoized configuration lookup.
pub struct SolutionAssembler<'a> {
    registry: &'a Registry,
    graph: &'a ProjectGraph,
    pipeline: &'a ConfigurationPipeline<'a>,
}

impl<'a> SolutionAssembler<'a> {
    pub fn new(
        registry: &'a Registry,
        graph: &'a ProjectGraph,
        pipeline: &'a ConfigurationPipeline<'a>,
    ) -> Self {
        SolutionAssembler {
            registry,
            graph,
            pipeline,
        }
    }

    /// Assemble one (solution, target) pair.
    pub fn assemble(&self, solution: &SolutionDef, target: Target) -> AssembleOutcome {
        let mut errors = Vec::new();
        let mut diagnostics = Vec::new();
        let mut ordered_members = Vec::new();
        let mut seen: HashSet<InternedString> = HashSet::new();
        let mut complete = true;

        for member in solution.members() {
            if !member.applies_to(target) {
                continue;
            }
            let member_name = member.project();

            let Some(member_def) = self.registry.project(member_name) else {
                errors.push(GenError::unknown_project(&solution.name(), &member_name));
                continue;
            };

            // A direct member that cannot build for this target is a hard
            // error; transitive closure members merely get dropped below.
            if !member_def.targets().contains(target) {
                errors.push(GenError::UnresolvedDependency {
                    solution: solution.name(),
                    project: member_name,
                    target,
                });
                continue;
            }

            let closure = match self.graph.transitive_closure(member_name, target) {
                Ok(closure) => closure,
                Err(e) => {
                    // A cycle blocks this solution for this target.
                    errors.push(e);
                    complete = false;
                    continue;
                }
            };

            for node in closure {
                if !seen.insert(node) {
                    continue;
                }
                let def = self
                    .registry
                    .project(node)
                    .expect("graph nodes come from the registry");
                if !def.targets().contains(target) {
                    diagnostics.push(
                        Diagnostic::warning(format!(
                            "dropped `{}` from solution `{}` for target `{}`",
                            node,
                            solution.name(),
                            target
                        ))
                        .with_context(format!(
                            "pulled in via `{}` but not in its own declared target space",
                            member_name
                        )),
                    );
                    continue;
                }
                ordered_members.push(node);
            }
        }

        let mut results = HashMap::new();
        for &member in &ordered_members {
            match self.pipeline.result(member, target) {
                Some(result) => {
                    results.insert(member, result);
                }
                None => {
                    // The pair failed configuration; its error is already
                    // on record and blocks emission.
                    complete = false;
                }
            }
        }

        let configuration = if complete && errors.is_empty() {
            Some(SolutionConfiguration {
                solution: solution.name(),
                target,
                solution_path: solution
                    .solution_path()
                    .map(|p| substitute(p, SOLUTION_DIR_TOKEN, solution.location())),
                ordered_members,
                results,
            })
        } else {
            None
        };

        AssembleOutcome {
            configuration,
            errors,
            diagnostics,
        }
    }
}
