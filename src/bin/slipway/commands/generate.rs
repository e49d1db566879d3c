//! `slipway generate` command

use anyhow::Result;

use slipway::util::diagnostic;
use slipway::{
    generate, load_catalogue, GenerateOptions, JsonEmitter, RootSpec, TargetDecl,
};

use crate::cli::GenerateArgs;

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    let registry = load_catalogue(&args.manifest).map_err(|e| {
        diagnostic::emit(&e.to_diagnostic(), color);
        anyhow::anyhow!("failed to load catalogue {}", args.manifest.display())
    })?;

    // Default to generating every registered solution.
    let mut roots: Vec<RootSpec> = Vec::new();
    if args.solution.is_empty() && args.project.is_empty() {
        for solution in registry.solutions() {
            roots.push(RootSpec::Solution(solution.name()));
        }
    } else {
        for name in &args.solution {
            roots.push(RootSpec::Solution(name.into()));
        }
        for name in &args.project {
            roots.push(RootSpec::Project(name.into()));
        }
    }

    if roots.is_empty() {
        anyhow::bail!(
            "catalogue {} declares no solutions\n\
             help: add a [[solution]] entry or pass --project",
            args.manifest.display()
        );
    }

    let filter = TargetDecl {
        platforms: args.platform,
        toolchains: args.toolchain,
        optimizations: args.optimization,
    };
    let options = GenerateOptions {
        target_filter: if filter.is_empty() { None } else { Some(filter) },
        jobs: args.jobs,
        progress: true,
    };

    let mut emitter = JsonEmitter::new(&args.out);
    match generate(&registry, &roots, &options, &mut emitter) {
        Ok(report) => {
            for warning in &report.diagnostics {
                diagnostic::emit(warning, color);
            }
            eprintln!(
                "   Generated {} solution configuration(s), {} standalone project(s) \
                 ({} pair(s) configured) in {}",
                report.solutions,
                report.standalone,
                report.pairs_configured,
                args.out.display()
            );
            Ok(())
        }
        Err(failure) => {
            for warning in &failure.diagnostics {
                diagnostic::emit(warning, color);
            }
            for error in &failure.errors {
                diagnostic::emit(&error.to_diagnostic(), color);
            }
            anyhow::bail!("generation failed with {} error(s)", failure.errors.len())
        }
    }
}
