use std::path::Path;

use sf_flow::{FlowError, Node, Signal, scalars};
use sf_project::{ProjectError, build_system, load, parse_yaml};

fn demos() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/systems")
}

#[test]
fn demos_load_and_build() {
    for name in ["01_feedback.yaml", "02_lowpass.yaml", "03_nested.yaml"] {
        let def = load(&demos().join(name)).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        build_system(&def).unwrap_or_else(|e| panic!("Failed to build {}: {}", name, e));
    }
}

#[test]
fn feedback_demo_runs() {
    let def = load(&demos().join("01_feedback.yaml")).unwrap();
    let mut built = build_system(&def).unwrap();
    let sum = built.block_id("sum").unwrap();
    assert_eq!(
        built.system.block(sum).and_then(|b| b.label()),
        Some("error")
    );

    let first = built.system.run(&scalars(&[2.0])).unwrap();
    let second = built.system.run(&scalars(&[2.0])).unwrap();
    assert_eq!(first, Some(scalars(&[2.0])));
    assert_eq!(second, Some(scalars(&[0.0])));
}

#[test]
fn nested_demo_runs() {
    let def = load(&demos().join("03_nested.yaml")).unwrap();
    let mut built = build_system(&def).unwrap();
    let out = built.system.run(&scalars(&[1.0, 3.0])).unwrap().unwrap();
    assert_eq!(out, vec![Signal::scalar(8.0)]);
}

#[test]
fn lowpass_demo_settles() {
    let def = load(&demos().join("02_lowpass.yaml")).unwrap();
    let mut built = build_system(&def).unwrap();
    assert!(built.system.options().tick_budget.is_some());
    let mut last = Vec::new();
    for _ in 0..1024 {
        last = built.system.run(&scalars(&[1.0])).unwrap().unwrap();
    }
    for signal in last {
        assert!((signal.as_scalar().unwrap() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn port_errors_surface_at_build() {
    let yaml = r#"
version: 1
name: Bad port
inputs: 1
outputs: 1
blocks:
  - id: a
    kind: { type: Identity }
edges:
  - { from: input, to: a, to_port: 3 }
"#;
    let def = parse_yaml(yaml).unwrap();
    assert!(matches!(
        build_system(&def),
        Err(ProjectError::Flow(FlowError::PortOutOfRange { .. }))
    ));
}

#[test]
fn unstable_filter_surfaces_at_build() {
    let yaml = r#"
version: 1
name: Unstable
inputs: 1
outputs: 1
blocks:
  - id: f
    kind: { type: Filter, num: [1.0], den: [1.0, -2.0], sample_rate_hz: 10.0 }
edges:
  - { from: input, to: f }
  - { from: f, to: output }
"#;
    let def = parse_yaml(yaml).unwrap();
    assert!(matches!(
        build_system(&def),
        Err(ProjectError::Flow(FlowError::InvalidTransferFunction(_)))
    ));
}

#[test]
fn boundary_nodes_resolve() {
    let yaml = r#"
version: 1
name: Pass
inputs: 1
outputs: 1
blocks:
  - id: a
    kind: { type: Identity }
edges:
  - { from: input, to: a }
  - { from: a, to: output }
"#;
    let built = build_system(&parse_yaml(yaml).unwrap()).unwrap();
    let a = built.block_id("a").unwrap();
    assert_eq!(
        built.system.driver_of(Node::Output, 0).map(|e| e.from),
        Some(Node::Block(a))
    );
}

#[test]
fn oversized_tick_budget_is_an_error() {
    let yaml = r#"
version: 1
name: Slow
inputs: 1
outputs: 1
options:
  tick_budget_s: 1.0e30
blocks:
  - id: a
    kind: { type: Identity }
edges:
  - { from: input, to: a }
  - { from: a, to: output }
"#;
    assert!(matches!(parse_yaml(yaml), Err(ProjectError::Validation(_))));

    // Definitions built in code skip the loader's validation.
    let mut def = load(&demos().join("01_feedback.yaml")).unwrap();
    def.options.tick_budget_s = Some(1.0e30);
    assert!(matches!(build_system(&def), Err(ProjectError::Validation(_))));

    def.options.tick_budget_s = Some(0.5);
    let built = build_system(&def).unwrap();
    assert_eq!(
        built.system.options().tick_budget,
        Some(std::time::Duration::from_millis(500))
    );
}
