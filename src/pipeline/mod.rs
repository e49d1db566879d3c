//! The ordered, memoized configuration pipeline.
//!
//! For every (project, target) pair the pipeline resolves the hook chain
//! (base-definition hooks root-to-leaf, then the project's own), runs it
//! sequentially over a working record, and freezes the record into a
//! `ConfigurationResult`. Pairs are configured at most once per pass no
//! matter how many solutions reference them.
//!
//! Distinct pairs are independent, so the fan-out runs on rayon; hooks
//! within one pair stay strictly sequential (scalar last-write-wins
//! depends on it). Dependency edges declared by hooks are collected per
//! pair and handed back to the caller, which applies them to the project
//! graph serially after the fan-out — closures must observe a fully
//! populated graph.

pub mod record;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::core::dependency::DependencyDecl;
use crate::core::project::{OutputKind, ProjectDef};
use crate::core::registry::Registry;
use crate::core::target::{Target, TargetSpace};
use crate::errors::GenError;
use crate::util::InternedString;

pub use record::{ConfigRecord, ConfigurationResult, DepRef};

/// A unit of configuration logic for one (project, target) pair.
pub type ConfigureHook = Arc<dyn Fn(&mut ConfigScope<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Wrap a closure into a hook handle.
pub fn hook<F>(f: F) -> ConfigureHook
where
    F: Fn(&mut ConfigScope<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The view a hook gets of the pair being configured.
///
/// Scalar setters overwrite, additive methods accumulate, and dependency
/// declarations are routed to the project graph rather than the local
/// record.
pub struct ConfigScope<'a> {
    project: &'a ProjectDef,
    target: Target,
    record: &'a mut ConfigRecord,
    pending: &'a mut Vec<DependencyDecl>,
}

impl<'a> ConfigScope<'a> {
    pub fn project(&self) -> &ProjectDef {
        self.project
    }

    pub fn project_name(&self) -> InternedString {
        self.project.name()
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn set_output(&mut self, kind: OutputKind) {
        self.record.set_output(kind);
    }

    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.record.set_output_name(name);
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.record.set_output_path(path);
    }

    pub fn set_working_dir(&mut self, dir: impl Into<String>) {
        self.record.set_working_dir(dir);
    }

    pub fn set_solution_folder(&mut self, folder: impl Into<String>) {
        self.record.set_solution_folder(folder);
    }

    pub fn define(&mut self, define: impl Into<String>) {
        self.record.add_define(define);
    }

    pub fn add_include_path(&mut self, path: impl Into<String>) {
        self.record.add_include_path(path);
    }

    pub fn add_lib_path(&mut self, path: impl Into<String>) {
        self.record.add_lib_path(path);
    }

    /// Declare a public dependency on another project. The edge becomes
    /// visible to every closure computed later in the same pass.
    pub fn add_public_dependency(&mut self, to: impl Into<InternedString>) {
        self.push_dependency(DependencyDecl::public(self.project.name(), to.into()));
    }

    /// Declare a private dependency (not re-exported to consumers).
    pub fn add_private_dependency(&mut self, to: impl Into<InternedString>) {
        self.push_dependency(DependencyDecl::private(self.project.name(), to.into()));
    }

    /// Declare a dependency restricted to a subset of targets.
    pub fn add_dependency_filtered(
        &mut self,
        to: impl Into<InternedString>,
        visibility: crate::core::dependency::Visibility,
        filter: TargetSpace,
    ) {
        let decl = match visibility {
            crate::core::dependency::Visibility::Public => {
                DependencyDecl::public(self.project.name(), to.into())
            }
            crate::core::dependency::Visibility::Private => {
                DependencyDecl::private(self.project.name(), to.into())
            }
        };
        self.push_dependency(decl.with_filter(filter));
    }

    fn push_dependency(&mut self, decl: DependencyDecl) {
        if decl.applies_to(self.target) {
            self.record.add_dependency(decl.to(), decl.visibility());
        }
        self.pending.push(decl);
    }
}

type PairKey = (InternedString, Target);

struct PairOutcome {
    key: PairKey,
    outcome: Result<ConfigurationResult, GenError>,
    pending: Vec<DependencyDecl>,
}

/// Memoized per-(project, target) configuration runner.
pub struct ConfigurationPipeline<'r> {
    registry: &'r Registry,
    results: HashMap<PairKey, Arc<ConfigurationResult>>,
    errors: Vec<GenError>,
}

impl<'r> ConfigurationPipeline<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        ConfigurationPipeline {
            registry,
            results: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Configure every listed pair that has not been configured yet.
    ///
    /// Returns the dependency declarations made by hooks, in a
    /// deterministic order (pair order, then declaration order within
    /// the pair); the caller owns applying them to the graph.
    pub fn configure_all(
        &mut self,
        pairs: &[PairKey],
        progress: Option<&ProgressBar>,
    ) -> Vec<DependencyDecl> {
        // Memoization guard: a pair already configured this pass never
        // reruns its hooks.
        let mut seen: HashSet<PairKey> = self.results.keys().copied().collect();
        let mut work: Vec<PairKey> = Vec::new();
        for &pair in pairs {
            if seen.insert(pair) {
                work.push(pair);
            }
        }

        // Resolve hook chains once per project, serially; a broken chain
        // is reported once, not once per target.
        let mut chains: HashMap<InternedString, Vec<ConfigureHook>> = HashMap::new();
        let mut dead_projects: HashSet<InternedString> = HashSet::new();
        for &(project, _) in &work {
            if chains.contains_key(&project) || dead_projects.contains(&project) {
                continue;
            }
            match self.registry.project(project) {
                Some(def) => match self.hook_chain(def) {
                    Ok(chain) => {
                        chains.insert(project, chain);
                    }
                    Err(e) => {
                        self.errors.push(e);
                        dead_projects.insert(project);
                    }
                },
                None => {
                    self.errors
                        .push(GenError::unknown_project("generation pass", &project));
                    dead_projects.insert(project);
                }
            }
        }
        work.retain(|(project, _)| !dead_projects.contains(project));

        tracing::debug!("configuring {} pair(s)", work.len());

        let outcomes: Vec<PairOutcome> = work
            .par_iter()
            .map(|&(project, target)| {
                // Both lookups succeeded above; the registry is read-only
                // during the fan-out.
                let def = self
                    .registry
                    .project(project)
                    .expect("project validated before fan-out");
                let chain = &chains[&project];
                let outcome = configure_pair(def, target, chain);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                outcome
            })
            .collect();

        let mut declared = Vec::new();
        for PairOutcome {
            key,
            outcome,
            pending,
        } in outcomes
        {
            declared.extend(pending);
            match outcome {
                Ok(result) => {
                    self.results.insert(key, Arc::new(result));
                }
                Err(e) => self.errors.push(e),
            }
        }
        declared
    }

    /// Look up the memoized result for a pair.
    pub fn result(&self, project: InternedString, target: Target) -> Option<Arc<ConfigurationResult>> {
        self.results.get(&(project, target)).cloned()
    }

    /// Number of pairs configured so far.
    pub fn configured_count(&self) -> usize {
        self.results.len()
    }

    pub fn errors(&self) -> &[GenError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<GenError> {
        std::mem::take(&mut self.errors)
    }

    /// Concatenate the base-definition chain's hooks root-to-leaf,
    /// followed by the project's own hooks in declaration order.
    fn hook_chain(&self, project: &ProjectDef) -> Result<Vec<ConfigureHook>, GenError> {
        let mut lineage: Vec<InternedString> = Vec::new();
        let mut cursor = project.base();
        while let Some(name) = cursor {
            if lineage.contains(&name) {
                return Err(GenError::Configuration {
                    message: format!(
                        "base definition chain of `{}` loops through `{}`",
                        project.name(),
                        name
                    ),
                });
            }
            let base = self.registry.base(name).ok_or_else(|| GenError::Configuration {
                message: format!(
                    "`{}` inherits unknown base definition `{}`",
                    project.name(),
                    name
                ),
            })?;
            lineage.push(name);
            cursor = base.base();
        }

        let mut chain = Vec::new();
        for name in lineage.iter().rev() {
            let base = self.registry.base(*name).expect("walked above");
            chain.extend(base.hooks().iter().cloned());
        }
        chain.extend(project.hooks().iter().cloned());
        Ok(chain)
    }
}

/// Run one pair's hook chain over a fresh record and freeze it.
fn configure_pair(project: &ProjectDef, target: Target, chain: &[ConfigureHook]) -> PairOutcome {
    let mut record = ConfigRecord::new();
    let mut pending = Vec::new();

    // Registration-time dependency declarations seed the record's
    // resolved-dependency set; their edges are registered separately by
    // the driver.
    for decl in project.dependencies() {
        if decl.applies_to(target) {
            record.add_dependency(decl.to(), decl.visibility());
        }
    }

    for (index, hook) in chain.iter().enumerate() {
        let mut scope = ConfigScope {
            project,
            target,
            record: &mut record,
            pending: &mut pending,
        };
        if let Err(cause) = hook(&mut scope) {
            // Later hooks for this pair are skipped; other pairs keep
            // configuring.
            return PairOutcome {
                key: (project.name(), target),
                outcome: Err(GenError::Callback {
                    project: project.name(),
                    target,
                    callback_index: index,
                    cause,
                }),
                pending,
            };
        }
    }

    PairOutcome {
        key: (project.name(), target),
        outcome: Ok(record.freeze(project, target)),
        pending,
    }
}
