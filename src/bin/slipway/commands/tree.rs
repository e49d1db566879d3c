//! `slipway tree` command

use std::collections::HashSet;

use anyhow::Result;

use slipway::util::InternedString;
use slipway::{load_catalogue, ConfigurationPipeline, ProjectGraph, Target};

use crate::cli::TreeArgs;

pub fn execute(args: TreeArgs) -> Result<()> {
    let registry = load_catalogue(&args.manifest)?;

    // Run the pipeline first so hook-declared dependencies show up in
    // the tree, not just registration-time ones.
    let pairs: Vec<(InternedString, Target)> = registry
        .projects()
        .iter()
        .flat_map(|p| p.targets().iter().map(move |t| (p.name(), t)))
        .collect();
    let mut pipeline = ConfigurationPipeline::new(&registry);
    let hook_edges = pipeline.configure_all(&pairs, None);
    let (graph, _) = ProjectGraph::from_declarations(&registry, &hook_edges);

    let roots: Vec<InternedString> = match args.project {
        Some(ref name) => {
            let name: InternedString = name.into();
            if !registry.contains_project(name) {
                anyhow::bail!("unknown project `{}`", name);
            }
            vec![name]
        }
        None => registry.projects().iter().map(|p| p.name()).collect(),
    };

    for root in roots {
        let project = registry.project(root).expect("validated above");
        let target = match args.target {
            Some(t) => t,
            None => match project.targets().iter().next() {
                Some(t) => t,
                None => {
                    println!("{} (no targets declared)", root);
                    continue;
                }
            },
        };

        println!("{} [{}]", root, target);
        let mut seen = HashSet::new();
        seen.insert(root);
        print_children(
            &graph,
            root,
            target,
            1,
            args.depth.unwrap_or(usize::MAX),
            &mut seen,
        );
    }

    Ok(())
}

fn print_children(
    graph: &ProjectGraph,
    node: InternedString,
    target: Target,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<InternedString>,
) {
    if depth > max_depth {
        return;
    }

    for (child, visibility) in graph.direct_dependencies(node, target) {
        let prefix = format!("{}├── ", "│   ".repeat(depth - 1));
        let dup_marker = if seen.contains(&child) { " (*)" } else { "" };
        println!("{}{} ({}){}", prefix, child, visibility, dup_marker);

        if seen.insert(child) {
            print_children(graph, child, target, depth + 1, max_depth, seen);
        }
    }
}
