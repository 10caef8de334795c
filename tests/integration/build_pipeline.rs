use dynamic_dora_builder::core::BuildError;
use std::path::{Path, PathBuf};

use crate::common::{TestEnvironment, deployment, explicit_node, node_ids, parse_yaml};

#[test]
fn test_explicit_node_and_bare_operator() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write("op2.py", "").unwrap();
    env.write(
        "deploy.yml",
        r#"nodes:
  - id: a
    operator:
      entry_point: op.py
      inputs: {}
      outputs: ["out"]
  - operator:
      entry_point: op2.py
      inputs:
        out: a/out
      outputs: []
"#,
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();

    assert_eq!(dataflow.ids().collect::<Vec<_>>(), vec!["a", "op2"]);
    assert_eq!(dataflow.nodes[0].operator.entry_point, PathBuf::from("op.py"));
    assert_eq!(dataflow.nodes[0].operator.outputs, vec!["out".to_string()]);
    assert_eq!(dataflow.nodes[1].operator.entry_point, PathBuf::from("op2.py"));
    assert_eq!(dataflow.nodes[1].operator.inputs.get("out").and_then(serde_yaml::Value::as_str), Some("a/out"));
    assert_eq!(dataflow.nodes[1].path, PathBuf::from("."));
}

#[test]
fn test_plain_deployment_is_copied_in_order() {
    let env = TestEnvironment::new().unwrap();
    for name in ["c", "a", "b"] {
        env.write(format!("nodes/{name}.py"), "").unwrap();
    }
    env.write(
        "deploy.yml",
        &deployment(&[
            explicit_node("c", "nodes/c.py"),
            explicit_node("a", "nodes/./a.py"),
            explicit_node("b", "nodes/../nodes/b.py"),
        ]),
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    let yaml = parse_yaml(&dataflow.to_yaml().unwrap());

    assert_eq!(node_ids(&yaml), vec!["c", "a", "b"]);
    let entry_points: Vec<_> = yaml["nodes"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|node| node["operator"]["entry_point"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(entry_points, vec!["nodes/c.py", "nodes/a.py", "nodes/b.py"]);
}

#[test]
fn test_optional_fields_round_trip() {
    let env = TestEnvironment::new().unwrap();
    env.write("nodes/cam.py", "").unwrap();
    env.write(
        "deploy.yml",
        r#"nodes:
  - id: camera
    name: Front camera
    path: nodes
    build: pip install -r requirements.txt
    env:
      DEVICE: /dev/video0
      FPS: 30
    operator:
      id: grabber
      description: Grabs frames
      python: nodes/cam.py
      outputs: [image]
"#,
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    let yaml = parse_yaml(&dataflow.to_yaml().unwrap());
    let node = &yaml["nodes"][0];

    assert_eq!(node["name"].as_str(), Some("Front camera"));
    assert_eq!(node["path"].as_str(), Some("nodes"));
    assert_eq!(node["build"].as_str(), Some("pip install -r requirements.txt"));
    assert_eq!(node["env"]["FPS"].as_u64(), Some(30));
    assert_eq!(node["operator"]["id"].as_str(), Some("grabber"));
    assert_eq!(node["operator"]["description"].as_str(), Some("Grabs frames"));
    assert_eq!(node["operator"]["entry_point"].as_str(), Some("nodes/cam.py"));
    assert!(node["operator"].get("python").is_none());
}

#[test]
fn test_build_is_deterministic() {
    let env = TestEnvironment::new().unwrap().with_var("FPS", "30");
    env.write("op.py", "").unwrap();
    env.write(
        "deploy.yml",
        "nodes:\n  - id: a\n    env:\n      FPS: {{ env.FPS }}\n    operator:\n      python: op.py\n  - operator:\n      python: op.py\n      id: b\n",
    )
    .unwrap();

    let builder = env.builder();
    let first = builder.build(&env.path("deploy.yml")).unwrap();
    let second = builder.build(&env.path("deploy.yml")).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_yaml().unwrap(), second.to_yaml().unwrap());
}

#[test]
fn test_duplicate_id_between_declared_and_component_nodes() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write("dup.yml.j2", &deployment(&[explicit_node("a", "op.py")])).unwrap();
    env.write(
        "deploy.yml",
        &format!(
            "{}components:\n  - id: dup\n    path: dup.yml.j2\n",
            deployment(&[explicit_node("a", "op.py")])
        ),
    )
    .unwrap();

    match env.builder().build(&env.path("deploy.yml")).unwrap_err() {
        BuildError::DuplicateNodeId {
            id,
            first,
            second,
        } => {
            assert_eq!(id, "a");
            assert_eq!(first, "nodes[0] (a)");
            assert_eq!(second, "component 'dup' nodes[0] (a)");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_entries_are_rejected() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();

    for (entry, expected) in [
        ("  - id: a\n    kind: static\n    path: x.yml\n", "static"),
        ("  - id: a\n    path: nodes\n", "operator"),
        ("  - 42\n", "number 42"),
    ] {
        env.write("deploy.yml", &format!("nodes:\n{entry}")).unwrap();

        let error = env.builder().build(&env.path("deploy.yml")).unwrap_err();
        match error.root_cause() {
            BuildError::InvalidNodeDeclaration {
                node,
                reason,
            } => {
                assert!(node.starts_with("nodes[0]"), "{node}");
                assert!(reason.contains(expected), "{reason}");
            }
            other => panic!("unexpected error for {entry:?}: {other:?}"),
        }
    }
}

#[test]
fn test_empty_and_null_deployments() {
    let env = TestEnvironment::new().unwrap();

    for content in ["", "nodes:\ncomponents:\n", "{}\n", "# nothing here\n"] {
        env.write("deploy.yml", content).unwrap();
        let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
        assert!(dataflow.is_empty(), "{content:?}");
        assert_eq!(dataflow.to_yaml().unwrap().trim(), "nodes: []");
    }
}

#[test]
fn test_missing_deployment() {
    let env = TestEnvironment::new().unwrap();
    let error = env.builder().build(Path::new("missing.yml")).unwrap_err();
    assert!(matches!(error, BuildError::DocumentLoad { .. }));
    assert!(matches!(error.root_cause(), BuildError::PathNotFound { .. }));
}

#[test]
fn test_failed_build_writes_no_export() {
    let env = TestEnvironment::new().unwrap();
    env.write("deploy.yml", &deployment(&[explicit_node("a", "missing.py")])).unwrap();

    let result = env.builder().build_and_export(&env.path("deploy.yml"), Some(Path::new("out.yml")));
    assert!(result.is_err());
    assert!(!env.file_exists("out.yml"));
    assert!(!env.file_exists("dataflow.yml"));
}

#[test]
fn test_build_and_export_default_target() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write("deploy.yml", &deployment(&[explicit_node("a", "op.py")])).unwrap();

    let dataflow = env.builder().build_and_export(&env.path("deploy.yml"), None).unwrap();

    let written = std::fs::read_to_string(env.path("dataflow.yml")).unwrap();
    assert_eq!(written, dataflow.to_yaml().unwrap());
    assert_eq!(node_ids(&parse_yaml(&written)), vec!["a"]);
}

#[test]
fn test_input_order_and_node_level_wiring_survive() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write(
        "deploy.yml",
        r#"nodes:
  - id: a
    inputs:
      tick: dora/timer/millis/10
    outputs: [o]
    operator:
      python: op.py
      inputs:
        zeta: x/z
        alpha: x/a
"#,
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    let yaml = parse_yaml(&dataflow.to_yaml().unwrap());
    let node = &yaml["nodes"][0];

    let inputs: Vec<_> = node["operator"]["inputs"]
        .as_mapping()
        .map(|inputs| inputs.keys().filter_map(serde_yaml::Value::as_str).collect())
        .unwrap_or_default();
    assert_eq!(inputs, vec!["zeta", "alpha"]);
    assert_eq!(node["inputs"]["tick"].as_str(), Some("dora/timer/millis/10"));
    assert_eq!(node["outputs"][0].as_str(), Some("o"));
}
