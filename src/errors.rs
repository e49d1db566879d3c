//! Generation error types and diagnostics.
//!
//! Independent failures accumulate over a whole generation pass rather than
//! short-circuiting it, so a single run surfaces as many of these as
//! possible. Emission is all-or-nothing: any accumulated error means no
//! artifacts reach the emitter.

use thiserror::Error;

use crate::core::target::Target;
use crate::util::diagnostic::Diagnostic;
use crate::util::InternedString;

/// Error produced during a generation pass.
#[derive(Debug, Error)]
pub enum GenError {
    /// Invalid declaration input: an unknown target dimension value, an
    /// unknown base definition, or a reference to an unregistered project.
    #[error("{message}")]
    Configuration { message: String },

    /// The dependency graph, restricted to one target, contains a cycle.
    /// `path` starts and ends at the same project.
    #[error("cyclic dependency under target `{target}`: {}", format_path(.path))]
    CyclicDependency {
        target: Target,
        path: Vec<InternedString>,
    },

    /// Two conflicting definitions share a name, or the same dependency
    /// edge was declared twice with conflicting visibility.
    #[error("duplicate definition of `{name}`: {detail}")]
    DuplicateDefinition {
        name: InternedString,
        detail: String,
    },

    /// A direct solution member does not support a target the solution
    /// generates for.
    #[error(
        "solution `{solution}` lists `{project}` directly, but `{project}` does not support target `{target}`"
    )]
    UnresolvedDependency {
        solution: InternedString,
        project: InternedString,
        target: Target,
    },

    /// A configuration callback failed. Later callbacks for the same
    /// (project, target) pair are skipped; other pairs keep going.
    #[error("configuration callback #{callback_index} failed for `{project}` on target `{target}`")]
    Callback {
        project: InternedString,
        target: Target,
        callback_index: usize,
        #[source]
        cause: anyhow::Error,
    },

    /// The external emitter failed to write artifacts.
    #[error("emission failed")]
    Emit {
        #[source]
        cause: anyhow::Error,
    },
}

fn format_path(path: &[InternedString]) -> String {
    path.iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl GenError {
    /// Invalid dimension value, naming the offending value.
    pub fn unknown_dimension(dimension: &str, value: &str) -> Self {
        GenError::Configuration {
            message: format!("unknown {} value `{}`", dimension, value),
        }
    }

    /// Reference to a project that was never registered.
    pub fn unknown_project(referrer: &str, project: &str) -> Self {
        GenError::Configuration {
            message: format!("`{}` references unknown project `{}`", referrer, project),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenError::Configuration { message } => Diagnostic::error(message.clone())
                .with_suggestion("Check the declaration against the registered catalogue"),

            GenError::CyclicDependency { target, path } => {
                Diagnostic::error(format!("cyclic dependency: {}", format_path(path)))
                    .with_context(format!("under target `{}`", target))
                    .with_suggestion("Break the cycle by removing one of its edges")
                    .with_suggestion(
                        "Restrict an edge with a target filter if the cycle is target-specific",
                    )
            }

            GenError::DuplicateDefinition { name, detail } => {
                Diagnostic::error(format!("duplicate definition of `{}`", name))
                    .with_context(detail.clone())
                    .with_suggestion("Remove or rename one of the conflicting declarations")
            }

            GenError::UnresolvedDependency {
                solution,
                project,
                target,
            } => Diagnostic::error(format!(
                "`{}` does not support target `{}`",
                project, target
            ))
            .with_context(format!(
                "`{}` is a direct member of solution `{}` for that target",
                project, solution
            ))
            .with_suggestion(format!(
                "Extend `{}`'s declared target space to include `{}`",
                project, target
            ))
            .with_suggestion("Or add a target filter to the solution membership"),

            GenError::Callback {
                project,
                target,
                callback_index,
                cause,
            } => Diagnostic::error(format!(
                "configuration callback #{} failed for `{}`",
                callback_index, project
            ))
            .with_context(format!("target `{}`", target))
            .with_context(format!("cause: {:#}", cause)),

            GenError::Emit { cause } => {
                Diagnostic::error(format!("emission failed: {:#}", cause))
                    .with_suggestion("Check that the output root is writable")
            }
        }
    }
}

/// Aggregated outcome of a failed generation pass.
///
/// Carries every error found during the pass plus any non-fatal
/// diagnostics recorded along the way.
#[derive(Debug)]
pub struct GenerationFailure {
    pub errors: Vec<GenError>,
    pub diagnostics: Vec<Diagnostic>,
}

impl std::fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "generation failed with {} error(s)", self.errors.len())
    }
}

impl std::error::Error for GenerationFailure {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimension::{Optimization, Platform, Toolchain};

    fn target() -> Target {
        Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Debug)
    }

    #[test]
    fn test_cycle_error_lists_full_path() {
        let err = GenError::CyclicDependency {
            target: target(),
            path: vec![
                InternedString::new("game"),
                InternedString::new("graphics"),
                InternedString::new("game"),
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("game -> graphics -> game"));
        assert!(msg.contains("win64-msvc2019-debug"));
    }

    #[test]
    fn test_callback_error_identifies_pair_and_index() {
        let err = GenError::Callback {
            project: InternedString::new("tech"),
            target: target(),
            callback_index: 2,
            cause: anyhow::anyhow!("output path not writable"),
        };

        let diag = err.to_diagnostic();
        let output = diag.format(false);
        assert!(output.contains("callback #2"));
        assert!(output.contains("tech"));
        assert!(output.contains("output path not writable"));
    }

    #[test]
    fn test_unknown_dimension_names_value() {
        let err = GenError::unknown_dimension("platform", "win128");
        assert!(err.to_string().contains("win128"));
    }
}
