//! End-to-end generation tests against the library API.
//!
//! These drive the whole pass: catalogue loading or programmatic
//! registration, configuration, graph resolution, assembly, and JSON
//! emission.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use slipway::util::InternedString;
use slipway::{
    generate, hook, load_catalogue, DependencyDecl, Emitter, GenerateOptions, GenerationOutput,
    JsonEmitter, Optimization, Platform, ProjectDef, Registry, RootSpec, SolutionDef, TargetDecl,
    Toolchain,
};

fn win_debug() -> TargetDecl {
    TargetDecl::new()
        .platform(Platform::Win64)
        .toolchain(Toolchain::Msvc2019)
        .optimization(Optimization::Debug)
}

fn sol(name: &str) -> RootSpec {
    RootSpec::Solution(InternedString::new(name))
}

/// Captures emitted output without touching the filesystem.
#[derive(Default)]
struct CaptureEmitter {
    outputs: Vec<GenerationOutput>,
}

impl Emitter for CaptureEmitter {
    fn emit(&mut self, output: &GenerationOutput) -> anyhow::Result<()> {
        self.outputs.push(output.clone());
        Ok(())
    }
}

#[test]
fn test_catalogue_to_json_descriptors() {
    let tmp = TempDir::new().unwrap();
    let manifest = tmp.path().join("Slipway.toml");
    fs::write(
        &manifest,
        r#"
        [[project]]
        name = "game"
        source-root = "[project.dir]/src/game"
        output = "exe"

        [project.targets]
        platforms = ["win64"]
        toolchains = ["msvc2019"]
        optimizations = ["debug", "release", "retail"]

        [[project.dependency]]
        project = "tech"

        [[project]]
        name = "tech"
        output = "static"

        [project.targets]
        platforms = ["win64"]
        toolchains = ["msvc2019"]
        optimizations = ["debug", "release", "retail"]

        [[solution]]
        name = "putka"
        projects = ["game"]

        [solution.targets]
        platforms = ["win64"]
        toolchains = ["msvc2019"]
        optimizations = ["debug", "release", "retail"]
    "#,
    )
    .unwrap();

    let registry = load_catalogue(&manifest).unwrap();
    let out = tmp.path().join("generated");
    let mut emitter = JsonEmitter::new(&out);

    let report = generate(
        &registry,
        &[sol("putka")],
        &GenerateOptions::default(),
        &mut emitter,
    )
    .unwrap();

    // 3 optimization profiles -> 3 solution configurations.
    assert_eq!(report.solutions, 3);
    // 2 projects x 3 targets.
    assert_eq!(report.pairs_configured, 6);

    for profile in ["debug", "release", "retail"] {
        let path = out.join(format!("putka.win64-msvc2019-{}.json", profile));
        let text = fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        let projects = doc["projects"].as_array().unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0]["project"], "game");
        assert_eq!(projects[1]["project"], "tech");
    }

    // Source-root token resolved against the manifest directory.
    let text =
        fs::read_to_string(out.join("putka.win64-msvc2019-debug.json")).unwrap();
    assert!(text.contains(&format!("{}/src/game", tmp.path().display())));
}

#[test]
fn test_project_shared_by_two_solutions_configures_once() {
    static RUNS: AtomicUsize = AtomicUsize::new(0);

    let mut registry = Registry::new();
    registry
        .add_project(
            ProjectDef::new("tech")
                .with_targets(&win_debug())
                .with_hook(hook(|_| {
                    RUNS.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })),
        )
        .unwrap();
    registry
        .add_project(
            ProjectDef::new("game")
                .with_targets(&win_debug())
                .with_dependency(DependencyDecl::public("game", "tech")),
        )
        .unwrap();
    registry
        .add_solution(
            SolutionDef::new("editor")
                .with_targets(&win_debug())
                .with_project("game")
                .with_project("tech"),
        )
        .unwrap();
    registry
        .add_solution(
            SolutionDef::new("shipping")
                .with_targets(&win_debug())
                .with_project("game"),
        )
        .unwrap();

    let mut emitter = CaptureEmitter::default();
    generate(
        &registry,
        &[sol("editor"), sol("shipping")],
        &GenerateOptions::default(),
        &mut emitter,
    )
    .unwrap();

    // tech is referenced by both solutions (directly and transitively)
    // on one target: its hook ran exactly once.
    assert_eq!(RUNS.load(Ordering::SeqCst), 1);

    let output = &emitter.outputs[0];
    assert_eq!(output.solutions.len(), 2);
    let tech = InternedString::new("tech");
    let a = Arc::as_ptr(&output.solutions[0].results[&tech]);
    let b = Arc::as_ptr(&output.solutions[1].results[&tech]);
    // Both solutions see the same memoized record.
    assert_eq!(a, b);
}

#[test]
fn test_diamond_dependency_appears_once() {
    let mut registry = Registry::new();
    for (name, deps) in [
        ("a", vec!["b", "c"]),
        ("b", vec!["d"]),
        ("c", vec!["d"]),
        ("d", vec![]),
    ] {
        let mut def = ProjectDef::new(name).with_targets(&win_debug());
        for dep in deps {
            def = def.with_dependency(DependencyDecl::public(name, dep));
        }
        registry.add_project(def).unwrap();
    }
    registry
        .add_solution(
            SolutionDef::new("diamond")
                .with_targets(&win_debug())
                .with_project("a"),
        )
        .unwrap();

    let mut emitter = CaptureEmitter::default();
    generate(
        &registry,
        &[sol("diamond")],
        &GenerateOptions::default(),
        &mut emitter,
    )
    .unwrap();

    let members: Vec<&str> = emitter.outputs[0].solutions[0]
        .ordered_members
        .iter()
        .map(|m| m.as_str())
        .collect();
    assert_eq!(members, vec!["a", "b", "d", "c"]);
}

#[test]
fn test_failed_callback_leaves_no_artifacts_on_disk() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("generated");

    let mut registry = Registry::new();
    registry
        .add_project(
            ProjectDef::new("fine")
                .with_targets(&win_debug())
                .with_hook(hook(|scope| {
                    scope.set_output_name("fine");
                    Ok(())
                })),
        )
        .unwrap();
    registry
        .add_project(
            ProjectDef::new("broken")
                .with_targets(&win_debug())
                .with_hook(hook(|_| anyhow::bail!("missing toolchain setting"))),
        )
        .unwrap();
    registry
        .add_solution(
            SolutionDef::new("all")
                .with_targets(&win_debug())
                .with_project("fine")
                .with_project("broken"),
        )
        .unwrap();

    let mut emitter = JsonEmitter::new(&out);
    let failure = generate(
        &registry,
        &[sol("all")],
        &GenerateOptions::default(),
        &mut emitter,
    )
    .unwrap_err();

    assert_eq!(failure.errors.len(), 1);
    assert!(!out.exists());
}

#[test]
fn test_independent_runs_do_not_interfere() {
    // Two registries with a same-named project but different settings:
    // explicit scoping means neither run can see the other's state.
    let build = |define: &'static str| {
        let mut registry = Registry::new();
        registry
            .add_project(
                ProjectDef::new("game")
                    .with_targets(&win_debug())
                    .with_hook(hook(move |scope| {
                        scope.define(define);
                        Ok(())
                    })),
            )
            .unwrap();
        registry
            .add_solution(
                SolutionDef::new("main")
                    .with_targets(&win_debug())
                    .with_project("game"),
            )
            .unwrap();
        registry
    };

    let first = build("FIRST");
    let second = build("SECOND");

    let mut emitter = CaptureEmitter::default();
    generate(&first, &[sol("main")], &GenerateOptions::default(), &mut emitter).unwrap();
    generate(&second, &[sol("main")], &GenerateOptions::default(), &mut emitter).unwrap();

    let game = InternedString::new("game");
    let defines = |output: &GenerationOutput| {
        output.solutions[0].results[&game].defines.clone()
    };
    assert_eq!(defines(&emitter.outputs[0]), vec!["FIRST"]);
    assert_eq!(defines(&emitter.outputs[1]), vec!["SECOND"]);
}
