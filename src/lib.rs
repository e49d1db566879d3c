//! Slipway - a declarative multi-target build-project generator
//!
//! Clients register projects and solutions (name, source roots,
//! dependency declarations, per-target configuration hooks); Slipway
//! expands the target matrix, resolves the dependency graph, runs each
//! (project, target) configuration exactly once, and hands the finished
//! descriptors to an emitter that writes concrete build/IDE files.

pub mod assemble;
pub mod core;
pub mod emit;
pub mod errors;
pub mod graph;
pub mod ops;
pub mod pipeline;
pub mod util;

pub use self::core::{
    dependency::DependencyDecl, dependency::Visibility, dimension::Optimization,
    dimension::Platform, dimension::Toolchain, manifest::load_catalogue, project::BaseDef,
    project::OutputKind, project::ProjectDef, registry::Registry, solution::SolutionDef,
    solution::SolutionMember, target::Target, target::TargetDecl, target::TargetSpace,
};

pub use assemble::SolutionConfiguration;
pub use emit::{Emitter, JsonEmitter};
pub use errors::{GenError, GenerationFailure};
pub use graph::ProjectGraph;
pub use ops::generate::{generate, GenerateOptions, GenerationOutput, GenerationReport, RootSpec};
pub use pipeline::{hook, ConfigScope, ConfigurationPipeline, ConfigurationResult, ConfigureHook};
