//! The declarative catalogue manifest.
//!
//! `Slipway.toml` is the file-based registration front-end: base
//! definitions, projects with their target declarations and settings,
//! dependency declarations, and solutions. Each settings table lowers
//! into one configuration hook, so declarative catalogues flow through
//! the exact same pipeline as programmatic registrations.

use std::path::Path;

use serde::Deserialize;

use crate::core::dependency::{DependencyDecl, Visibility};
use crate::core::dimension::Optimization;
use crate::core::project::{BaseDef, OutputKind, ProjectDef};
use crate::core::registry::Registry;
use crate::core::solution::{SolutionDef, SolutionMember};
use crate::core::target::{TargetDecl, TargetSpace};
use crate::errors::GenError;
use crate::pipeline::{hook, ConfigScope, ConfigureHook};

/// Default catalogue filename.
pub const CATALOGUE_NAME: &str = "Slipway.toml";

/// A table of configuration settings as written in the catalogue.
///
/// Scalars overwrite whatever earlier hooks wrote; list fields append.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SettingsTable {
    #[serde(default)]
    pub output: Option<OutputKind>,

    #[serde(default)]
    pub output_name: Option<String>,

    #[serde(default)]
    pub output_path: Option<String>,

    #[serde(default)]
    pub working_dir: Option<String>,

    #[serde(default)]
    pub solution_folder: Option<String>,

    #[serde(default)]
    pub defines: Vec<String>,

    #[serde(default)]
    pub include_paths: Vec<String>,

    #[serde(default)]
    pub lib_paths: Vec<String>,
}

impl SettingsTable {
    fn apply(&self, scope: &mut ConfigScope<'_>) {
        if let Some(kind) = self.output {
            scope.set_output(kind);
        }
        if let Some(ref name) = self.output_name {
            scope.set_output_name(name.clone());
        }
        if let Some(ref path) = self.output_path {
            scope.set_output_path(path.clone());
        }
        if let Some(ref dir) = self.working_dir {
            scope.set_working_dir(dir.clone());
        }
        if let Some(ref folder) = self.solution_folder {
            scope.set_solution_folder(folder.clone());
        }
        for define in &self.defines {
            scope.define(define.clone());
        }
        for path in &self.include_paths {
            scope.add_include_path(path.clone());
        }
        for path in &self.lib_paths {
            scope.add_lib_path(path.clone());
        }
    }

    /// Lower the table into an unconditional hook.
    fn into_hook(self) -> ConfigureHook {
        hook(move |scope| {
            self.apply(scope);
            Ok(())
        })
    }

    /// Lower the table into a hook gated on one optimization profile.
    fn into_profile_hook(self, profile: Optimization) -> ConfigureHook {
        hook(move |scope| {
            if scope.target().optimization() == profile {
                self.apply(scope);
            }
            Ok(())
        })
    }
}

/// A base definition entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct BaseManifest {
    name: String,

    #[serde(default)]
    inherits: Option<String>,

    #[serde(flatten)]
    settings: SettingsTable,
}

/// A per-optimization settings override.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ProfileManifest {
    optimization: Optimization,

    #[serde(flatten)]
    settings: SettingsTable,
}

/// A dependency declaration inside a project entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DependencyManifest {
    project: String,

    #[serde(default)]
    visibility: Visibility,

    /// Optional target filter, declared like any target table.
    #[serde(default)]
    targets: Option<TargetDecl>,
}

/// A project entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ProjectManifest {
    name: String,

    #[serde(default)]
    base: Option<String>,

    #[serde(default)]
    source_root: Option<String>,

    targets: TargetDecl,

    #[serde(flatten)]
    settings: SettingsTable,

    #[serde(default)]
    profile: Vec<ProfileManifest>,

    #[serde(default)]
    dependency: Vec<DependencyManifest>,
}

/// A solution membership: a bare project name or a detailed table with
/// its own target filter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MemberSpec {
    /// `projects = ["game"]`
    Simple(String),

    /// `projects = [{ project = "test-tech", targets = { ... } }]`
    Detailed {
        project: String,
        #[serde(default)]
        targets: Option<TargetDecl>,
    },
}

/// A solution entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SolutionManifest {
    name: String,

    targets: TargetDecl,

    #[serde(default)]
    solution_path: Option<String>,

    #[serde(default)]
    projects: Vec<MemberSpec>,
}

/// The whole catalogue file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CatalogueManifest {
    #[serde(default)]
    base: Vec<BaseManifest>,

    #[serde(default)]
    project: Vec<ProjectManifest>,

    #[serde(default)]
    solution: Vec<SolutionManifest>,
}

/// Load a catalogue file and lower it into a populated registry.
///
/// The manifest's parent directory becomes the declaration directory of
/// every entity in it, resolving `[project.dir]` and `[solution.dir]`.
pub fn load_catalogue(path: &Path) -> Result<Registry, GenError> {
    let text = std::fs::read_to_string(path).map_err(|e| GenError::Configuration {
        message: format!("cannot read catalogue {}: {}", path.display(), e),
    })?;

    let manifest: CatalogueManifest =
        toml::from_str(&text).map_err(|e| GenError::Configuration {
            message: format!("invalid catalogue {}: {}", path.display(), e.message()),
        })?;

    let location = path.parent().unwrap_or_else(|| Path::new("."));
    lower(manifest, location)
}

fn lower(manifest: CatalogueManifest, location: &Path) -> Result<Registry, GenError> {
    let mut registry = Registry::new();

    for base in manifest.base {
        let mut def = BaseDef::new(base.name);
        if let Some(parent) = base.inherits {
            def = def.inherits(parent);
        }
        registry.add_base(def.with_hook(base.settings.into_hook()))?;
    }

    for project in manifest.project {
        let mut def = ProjectDef::new(project.name.clone())
            .at_location(location)
            .with_targets(&project.targets)
            .with_hook(project.settings.into_hook());

        if let Some(root) = project.source_root {
            def = def.with_source_root(root);
        }
        if let Some(base) = project.base {
            def = def.inherits(base);
        }
        for profile in project.profile {
            def = def.with_hook(profile.settings.into_profile_hook(profile.optimization));
        }
        for dep in project.dependency {
            let mut decl = match dep.visibility {
                Visibility::Public => DependencyDecl::public(&project.name, dep.project),
                Visibility::Private => DependencyDecl::private(&project.name, dep.project),
            };
            if let Some(ref filter) = dep.targets {
                decl = decl.with_filter(TargetSpace::from_decl(filter));
            }
            def = def.with_dependency(decl);
        }

        registry.add_project(def)?;
    }

    for solution in manifest.solution {
        let mut def = SolutionDef::new(solution.name)
            .at_location(location)
            .with_targets(&solution.targets);

        if let Some(path) = solution.solution_path {
            def = def.with_solution_path(path);
        }
        for member in solution.projects {
            let member = match member {
                MemberSpec::Simple(project) => SolutionMember::new(project),
                MemberSpec::Detailed { project, targets } => {
                    let mut m = SolutionMember::new(project);
                    if let Some(ref filter) = targets {
                        m = m.with_filter(TargetSpace::from_decl(filter));
                    }
                    m
                }
            };
            def = def.with_member(member);
        }

        registry.add_solution(def)?;
    }

    Ok(registry)
}
