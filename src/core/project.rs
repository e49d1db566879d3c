//! Project and base-definition declarations.
//!
//! A project owns its supported target space, an ordered list of
//! configuration hooks, and its declared dependencies. Base definitions
//! exist purely to sequence hooks: the pipeline concatenates each chain
//! root-to-leaf, so inheritance is data, not dispatch.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::dependency::DependencyDecl;
use crate::core::target::{TargetDecl, TargetSpace};
use crate::pipeline::ConfigureHook;
use crate::util::InternedString;

/// The kind of artifact a project produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Executable binary
    #[serde(alias = "bin")]
    Exe,

    /// Static library (.a / .lib)
    #[serde(alias = "lib", alias = "static")]
    StaticLib,

    /// Shared/dynamic library (.so / .dylib / .dll)
    #[serde(alias = "dylib", alias = "dynamic")]
    SharedLib,

    /// Header-only library (nothing to build)
    #[serde(alias = "header-only", alias = "interface")]
    HeaderOnly,
}

impl Default for OutputKind {
    fn default() -> Self {
        OutputKind::Exe
    }
}

impl OutputKind {
    /// Typical file extension on the given OS.
    pub fn extension(&self, os: &str) -> &'static str {
        match self {
            OutputKind::Exe => {
                if os == "windows" {
                    "exe"
                } else {
                    ""
                }
            }
            OutputKind::StaticLib => {
                if os == "windows" {
                    "lib"
                } else {
                    "a"
                }
            }
            OutputKind::SharedLib => match os {
                "windows" => "dll",
                "macos" => "dylib",
                _ => "so",
            },
            OutputKind::HeaderOnly => "",
        }
    }

    /// Typical file prefix on the given OS.
    pub fn prefix(&self, os: &str) -> &'static str {
        match self {
            OutputKind::Exe | OutputKind::HeaderOnly => "",
            OutputKind::StaticLib | OutputKind::SharedLib => {
                if os == "windows" {
                    ""
                } else {
                    "lib"
                }
            }
        }
    }

    /// Conventional output filename for this kind.
    pub fn output_filename(&self, name: &str, os: &str) -> String {
        let prefix = self.prefix(os);
        let ext = self.extension(os);
        if ext.is_empty() {
            format!("{}{}", prefix, name)
        } else {
            format!("{}{}.{}", prefix, name, ext)
        }
    }
}

/// A registered project definition.
///
/// Read-only once registration ends; configuration output lives in
/// `pipeline::ConfigurationResult`, never here.
#[derive(Clone)]
pub struct ProjectDef {
    name: InternedString,
    source_root: Option<String>,
    location: PathBuf,
    targets: TargetSpace,
    base: Option<InternedString>,
    hooks: Vec<ConfigureHook>,
    dependencies: Vec<DependencyDecl>,
}

impl ProjectDef {
    /// Create a project definition with an empty target space.
    pub fn new(name: impl Into<InternedString>) -> Self {
        ProjectDef {
            name: name.into(),
            source_root: None,
            location: PathBuf::new(),
            targets: TargetSpace::empty(),
            base: None,
            hooks: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Set the source-root path template. May contain the
    /// `[project.dir]` token.
    pub fn with_source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    /// Set the declaration directory used to resolve `[project.dir]`.
    pub fn at_location(mut self, dir: impl Into<PathBuf>) -> Self {
        self.location = dir.into();
        self
    }

    /// Expand a target declaration into the supported space. Repeated
    /// calls accumulate, like repeated `add_targets` declarations.
    pub fn with_targets(mut self, decl: &TargetDecl) -> Self {
        self.targets.add_decl(decl);
        self
    }

    /// Inherit configuration hooks from a base definition chain.
    pub fn inherits(mut self, base: impl Into<InternedString>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Append a configuration hook. Hooks run in declaration order,
    /// after every base-definition hook.
    pub fn with_hook(mut self, hook: ConfigureHook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Declare a dependency at registration time.
    pub fn with_dependency(mut self, decl: DependencyDecl) -> Self {
        self.dependencies.push(decl);
        self
    }

    pub fn name(&self) -> InternedString {
        self.name
    }

    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn targets(&self) -> &TargetSpace {
        &self.targets
    }

    pub fn base(&self) -> Option<InternedString> {
        self.base
    }

    pub fn hooks(&self) -> &[ConfigureHook] {
        &self.hooks
    }

    pub fn dependencies(&self) -> &[DependencyDecl] {
        &self.dependencies
    }
}

impl fmt::Debug for ProjectDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectDef")
            .field("name", &self.name)
            .field("source_root", &self.source_root)
            .field("location", &self.location)
            .field("targets", &self.targets.len())
            .field("base", &self.base)
            .field("hooks", &self.hooks.len())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// A reusable bundle of configuration hooks.
///
/// Bases form chains; the pipeline walks a chain from its root and runs
/// each definition's hooks in declaration order before the next
/// definition's.
#[derive(Clone)]
pub struct BaseDef {
    name: InternedString,
    base: Option<InternedString>,
    hooks: Vec<ConfigureHook>,
}

impl BaseDef {
    pub fn new(name: impl Into<InternedString>) -> Self {
        BaseDef {
            name: name.into(),
            base: None,
            hooks: Vec::new(),
        }
    }

    /// Chain onto an earlier base definition.
    pub fn inherits(mut self, base: impl Into<InternedString>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_hook(mut self, hook: ConfigureHook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn name(&self) -> InternedString {
        self.name
    }

    pub fn base(&self) -> Option<InternedString> {
        self.base
    }

    pub fn hooks(&self) -> &[ConfigureHook] {
        &self.hooks
    }
}

impl fmt::Debug for BaseDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseDef")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimension::{Optimization, Platform, Toolchain};

    #[test]
    fn test_output_filenames_per_platform() {
        assert_eq!(
            OutputKind::Exe.output_filename("game", "windows"),
            "game.exe"
        );
        assert_eq!(OutputKind::Exe.output_filename("game", "linux"), "game");
        assert_eq!(
            OutputKind::StaticLib.output_filename("tech", "linux"),
            "libtech.a"
        );
        assert_eq!(
            OutputKind::SharedLib.output_filename("tech", "macos"),
            "libtech.dylib"
        );
    }

    #[test]
    fn test_repeated_target_decls_accumulate() {
        let msvc = TargetDecl::new()
            .platform(Platform::Win64)
            .toolchain(Toolchain::Msvc2019)
            .optimization(Optimization::Debug);
        let gcc = TargetDecl::new()
            .platform(Platform::Linux64)
            .toolchain(Toolchain::Gcc)
            .optimization(Optimization::Debug);

        let project = ProjectDef::new("game").with_targets(&msvc).with_targets(&gcc);
        assert_eq!(project.targets().len(), 2);
    }
}
