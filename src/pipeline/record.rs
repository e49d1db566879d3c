//! Working configuration records and their frozen results.
//!
//! Hooks mutate a `ConfigRecord`; once every hook for a (project, target)
//! pair has run, the record is frozen into an immutable
//! `ConfigurationResult`. Scalar fields are last-write-wins; additive
//! fields accumulate and deduplicate by value. Path tokens are replaced
//! once at freeze time, never while hooks are still running.

use std::path::Path;

use serde::Serialize;

use crate::core::dependency::Visibility;
use crate::core::project::{OutputKind, ProjectDef};
use crate::core::target::Target;
use crate::util::InternedString;

/// Token replaced with the project's declaration directory.
pub const PROJECT_DIR_TOKEN: &str = "[project.dir]";

/// Token replaced with the enclosing solution's declaration directory.
pub const SOLUTION_DIR_TOKEN: &str = "[solution.dir]";

/// Literal, single-pass replacement of one token with a resolved path.
pub fn substitute(value: &str, token: &str, dir: &Path) -> String {
    value.replace(token, &dir.to_string_lossy())
}

/// A dependency reference accumulated into a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepRef {
    pub project: InternedString,
    pub visibility: Visibility,
}

/// The mutable working record a hook chain writes into.
#[derive(Debug, Clone, Default)]
pub struct ConfigRecord {
    output: Option<OutputKind>,
    output_name: Option<String>,
    output_path: Option<String>,
    working_dir: Option<String>,
    solution_folder: Option<String>,
    defines: Vec<String>,
    include_paths: Vec<String>,
    lib_paths: Vec<String>,
    dependencies: Vec<DepRef>,
}

impl ConfigRecord {
    pub fn new() -> Self {
        ConfigRecord::default()
    }

    // Scalars: later writes overwrite earlier ones.

    pub fn set_output(&mut self, kind: OutputKind) {
        self.output = Some(kind);
    }

    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.output_name = Some(name.into());
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.output_path = Some(path.into());
    }

    pub fn set_working_dir(&mut self, dir: impl Into<String>) {
        self.working_dir = Some(dir.into());
    }

    pub fn set_solution_folder(&mut self, folder: impl Into<String>) {
        self.solution_folder = Some(folder.into());
    }

    // Additive sets: values accumulate, duplicates dropped by value.

    pub fn add_define(&mut self, define: impl Into<String>) {
        let define = define.into();
        if !self.defines.contains(&define) {
            self.defines.push(define);
        }
    }

    pub fn add_include_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.include_paths.contains(&path) {
            self.include_paths.push(path);
        }
    }

    pub fn add_lib_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.lib_paths.contains(&path) {
            self.lib_paths.push(path);
        }
    }

    pub fn add_dependency(&mut self, project: InternedString, visibility: Visibility) {
        let dep = DepRef {
            project,
            visibility,
        };
        if !self.dependencies.contains(&dep) {
            self.dependencies.push(dep);
        }
    }

    pub fn output_name(&self) -> Option<&str> {
        self.output_name.as_deref()
    }

    /// Freeze the record into an immutable result.
    ///
    /// Scalar defaults are filled here (output name defaults to the
    /// project name, kind to an executable), and `[project.dir]` tokens
    /// in path-valued fields are substituted in a single pass.
    pub fn freeze(self, project: &ProjectDef, target: Target) -> ConfigurationResult {
        let dir = project.location();
        let sub = |v: Option<String>| v.map(|s| substitute(&s, PROJECT_DIR_TOKEN, dir));

        ConfigurationResult {
            project: project.name(),
            target,
            source_root: project
                .source_root()
                .map(|s| substitute(s, PROJECT_DIR_TOKEN, dir)),
            output: self.output.unwrap_or_default(),
            output_name: self
                .output_name
                .unwrap_or_else(|| project.name().to_string()),
            output_path: sub(self.output_path),
            working_dir: sub(self.working_dir),
            solution_folder: self.solution_folder,
            defines: self.defines,
            include_paths: self
                .include_paths
                .into_iter()
                .map(|p| substitute(&p, PROJECT_DIR_TOKEN, dir))
                .collect(),
            lib_paths: self
                .lib_paths
                .into_iter()
                .map(|p| substitute(&p, PROJECT_DIR_TOKEN, dir))
                .collect(),
            dependencies: self.dependencies,
        }
    }
}

/// The immutable configuration of one (project, target) pair.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationResult {
    pub project: InternedString,
    pub target: Target,
    pub source_root: Option<String>,
    pub output: OutputKind,
    pub output_name: String,
    pub output_path: Option<String>,
    pub working_dir: Option<String>,
    pub solution_folder: Option<String>,
    pub defines: Vec<String>,
    pub include_paths: Vec<String>,
    pub lib_paths: Vec<String>,
    pub dependencies: Vec<DepRef>,
}

impl ConfigurationResult {
    /// Conventional output filename for the configured kind and the
    /// target's platform.
    pub fn output_filename(&self) -> String {
        self.output
            .output_filename(&self.output_name, self.target.platform().os())
    }
}
