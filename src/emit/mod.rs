//! The emitter seam.
//!
//! The core hands a finished, error-free result set to an `Emitter` and
//! knows nothing about concrete build-file formats. The bundled
//! `JsonEmitter` writes one JSON descriptor per configuration; IDE- or
//! toolchain-specific writers implement the same trait out of tree.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use crate::ops::generate::GenerationOutput;

/// Consumes the finished result set and produces on-disk artifacts.
pub trait Emitter {
    fn emit(&mut self, output: &GenerationOutput) -> Result<()>;
}

/// Writes one pretty-printed JSON descriptor per solution configuration
/// and per standalone project configuration.
pub struct JsonEmitter {
    root: PathBuf,
}

impl JsonEmitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonEmitter { root: root.into() }
    }
}

impl Emitter for JsonEmitter {
    fn emit(&mut self, output: &GenerationOutput) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create output root {}", self.root.display()))?;

        for conf in &output.solutions {
            let projects = conf
                .ordered_members
                .iter()
                .map(|m| serde_json::to_value(&*conf.results[m]))
                .collect::<Result<Vec<_>, _>>()?;

            let doc = json!({
                "solution": conf.solution,
                "target": conf.target,
                "solution_path": conf.solution_path,
                "projects": projects,
            });

            let path = self
                .root
                .join(format!("{}.{}.json", conf.solution, conf.target));
            fs::write(&path, serde_json::to_string_pretty(&doc)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!("wrote {}", path.display());
        }

        for result in &output.standalone {
            let path = self
                .root
                .join(format!("{}.{}.json", result.project, result.target));
            fs::write(&path, serde_json::to_string_pretty(result.as_ref())?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!("wrote {}", path.display());
        }

        Ok(())
    }
}
