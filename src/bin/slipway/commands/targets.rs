//! `slipway targets` command

use anyhow::Result;

use slipway::load_catalogue;

use crate::cli::TargetsArgs;

pub fn execute(args: TargetsArgs) -> Result<()> {
    let registry = load_catalogue(&args.manifest)?;

    if let Some(ref name) = args.solution {
        let solution = registry
            .solution(name.into())
            .ok_or_else(|| anyhow::anyhow!("unknown solution `{}`", name))?;
        println!("solution {} ({} target(s))", solution.name(), solution.targets().len());
        for target in solution.targets().iter() {
            println!("  {}", target);
        }
        return Ok(());
    }

    for solution in registry.solutions() {
        println!("solution {} ({} target(s))", solution.name(), solution.targets().len());
        for target in solution.targets().iter() {
            println!("  {}", target);
        }
    }

    for project in registry.projects() {
        println!("project {} ({} target(s))", project.name(), project.targets().len());
        for target in project.targets().iter() {
            println!("  {}", target);
        }
    }

    Ok(())
}
