//! The generation driver.
//!
//! One synchronous pass: expand target spaces, configure every
//! (project, target) pair, freeze the project graph, check it for
//! per-target cycles, assemble every requested solution, and hand the
//! complete result set to the emitter. Independent failures accumulate;
//! a non-empty error list at the end of the pass means nothing is
//! emitted at all.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use crate::assemble::{SolutionAssembler, SolutionConfiguration};
use crate::core::registry::Registry;
use crate::core::target::{Target, TargetDecl};
use crate::emit::Emitter;
use crate::errors::{GenError, GenerationFailure};
use crate::graph::ProjectGraph;
use crate::pipeline::{ConfigurationPipeline, ConfigurationResult};
use crate::util::diagnostic::Diagnostic;
use crate::util::InternedString;

/// What to generate: a solution (with its closure) or a bare project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSpec {
    Solution(InternedString),
    Project(InternedString),
}

/// Options for one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Restrict generation to targets matching this dimension filter.
    /// Empty dimension lists act as wildcards.
    pub target_filter: Option<TargetDecl>,

    /// Worker count for the configuration fan-out.
    pub jobs: Option<usize>,

    /// Show a progress bar over the configuration fan-out.
    pub progress: bool,
}

impl GenerateOptions {
    fn admits(&self, target: Target) -> bool {
        self.target_filter.as_ref().map_or(true, |f| f.matches(target))
    }
}

/// The complete, error-free result set of a pass.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub solutions: Vec<SolutionConfiguration>,
    pub standalone: Vec<Arc<ConfigurationResult>>,
}

/// Summary returned after successful emission.
#[derive(Debug)]
pub struct GenerationReport {
    pub solutions: usize,
    pub standalone: usize,
    pub pairs_configured: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run one full generation pass and hand the results to `emitter`.
///
/// Either the whole pass succeeds and the emitter receives the complete
/// result set, or the aggregated error list comes back and the emitter
/// is never invoked.
pub fn generate(
    registry: &Registry,
    roots: &[RootSpec],
    options: &GenerateOptions,
    emitter: &mut dyn Emitter,
) -> Result<GenerationReport, GenerationFailure> {
    let start = Instant::now();
    let mut errors: Vec<GenError> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    if let Some(jobs) = options.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok(); // Ignore if already set
    }

    // Validate roots up front so typos surface even when the rest of the
    // catalogue is healthy.
    let mut solution_roots = Vec::new();
    let mut project_roots = Vec::new();
    for root in roots {
        match *root {
            RootSpec::Solution(name) => match registry.solution(name) {
                Some(def) => solution_roots.push(def),
                None => errors.push(GenError::Configuration {
                    message: format!("unknown solution `{}` requested for generation", name),
                }),
            },
            RootSpec::Project(name) => {
                if registry.contains_project(name) {
                    project_roots.push(name);
                } else {
                    errors.push(GenError::Configuration {
                        message: format!("unknown project `{}` requested for generation", name),
                    });
                }
            }
        }
    }

    // Every registered project is configured eagerly for each of its
    // supported targets; solutions later only look results up.
    let pairs: Vec<(InternedString, Target)> = registry
        .projects()
        .iter()
        .flat_map(|p| {
            p.targets()
                .iter()
                .filter(|&t| options.admits(t))
                .map(move |t| (p.name(), t))
        })
        .collect();

    tracing::info!("configuring {} (project, target) pair(s)", pairs.len());

    let bar = if options.progress && pairs.len() > 1 {
        let bar = ProgressBar::new(pairs.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut pipeline = ConfigurationPipeline::new(registry);
    let hook_edges = pipeline.configure_all(&pairs, bar.as_ref());

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    // Barrier: every configuration-time dependency addition is in before
    // the graph is built, validated, and traversed.
    let (graph, graph_errors) = ProjectGraph::from_declarations(registry, &hook_edges);
    errors.extend(graph_errors);
    diagnostics.extend(graph.validate_filters(registry));

    // Cycle check per target across the whole graph, ahead of any
    // closure computation.
    let mut checked_targets: HashSet<Target> = HashSet::new();
    let mut reported_cycles: HashSet<(Target, Vec<InternedString>)> = HashSet::new();
    for project in registry.projects() {
        for target in project.targets().iter().filter(|&t| options.admits(t)) {
            if !checked_targets.insert(target) {
                continue;
            }
            for path in graph.detect_cycles(target) {
                reported_cycles.insert((target, path.clone()));
                errors.push(GenError::CyclicDependency { target, path });
            }
        }
    }

    errors.extend(pipeline.take_errors());

    // Assemble each requested solution across its own target space.
    let mut output = GenerationOutput::default();
    let assembler = SolutionAssembler::new(registry, &graph, &pipeline);
    for solution in solution_roots {
        for target in solution.targets().iter().filter(|&t| options.admits(t)) {
            let outcome = assembler.assemble(solution, target);
            for error in outcome.errors {
                // Closure re-hits cycles the pre-check already reported;
                // keep each distinct cycle once.
                if let GenError::CyclicDependency { target, ref path } = error {
                    if !reported_cycles.insert((target, path.clone())) {
                        continue;
                    }
                }
                errors.push(error);
            }
            diagnostics.extend(outcome.diagnostics);
            if let Some(configuration) = outcome.configuration {
                output.solutions.push(configuration);
            }
        }
    }

    // Bare-project roots emit their configurations directly.
    for name in project_roots {
        let project = registry.project(name).expect("validated above");
        for target in project.targets().iter().filter(|&t| options.admits(t)) {
            if let Some(result) = pipeline.result(name, target) {
                output.standalone.push(result);
            }
            // A missing result means the pair failed configuration and
            // the callback error is already on record.
        }
    }

    if !errors.is_empty() {
        tracing::warn!("generation failed with {} error(s)", errors.len());
        return Err(GenerationFailure {
            errors,
            diagnostics,
        });
    }

    emitter.emit(&output).map_err(|cause| GenerationFailure {
        errors: vec![GenError::Emit { cause }],
        diagnostics: diagnostics.clone(),
    })?;

    tracing::info!(
        "generated {} solution configuration(s) in {:.2}s",
        output.solutions.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(GenerationReport {
        solutions: output.solutions.len(),
        standalone: output.standalone.len(),
        pairs_configured: pipeline.configured_count(),
        diagnostics,
    })
}
