use dynamic_dora_builder::core::BuildError;
use std::path::PathBuf;

use crate::common::{TestEnvironment, deployment, explicit_node, parse_yaml};

#[test]
fn test_dynamic_node_imports_full_definition() {
    let env = TestEnvironment::new().unwrap();
    env.write("plot.py", "").unwrap();
    env.write(
        "other.yml",
        r#"nodes:
  - id: camera
    operator:
      python: plot.py
  - id: plot
    name: Plotter
    env:
      BACKEND: rerun
    operator:
      python: plot.py
      inputs:
        image: camera/image
      outputs: [frame]
"#,
    )
    .unwrap();
    env.write("deploy.yml", "nodes:\n  - id: plot\n    path: other.yml\n    kind: dynamic\n").unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();

    assert_eq!(dataflow.ids().collect::<Vec<_>>(), vec!["plot"]);
    let plot = &dataflow.nodes[0];
    assert_eq!(plot.name.as_deref(), Some("Plotter"));
    assert_eq!(plot.path, PathBuf::from("."));
    assert_eq!(plot.operator.entry_point, PathBuf::from("plot.py"));
    assert_eq!(plot.operator.inputs.get("image").and_then(serde_yaml::Value::as_str), Some("camera/image"));
    assert_eq!(plot.operator.outputs, vec!["frame".to_string()]);
    assert!(plot.env.is_some());
}

#[test]
fn test_imported_paths_are_relative_to_referenced_document() {
    let env = TestEnvironment::new().unwrap();
    env.write_outside("vision/detector.py", "").unwrap();
    env.write_outside(
        "vision/dataflow.yml",
        "nodes:\n  - id: detector\n    operator:\n      python: detector.py\n      outputs: [boxes]\n",
    )
    .unwrap();
    env.write("deploy.yml", "nodes:\n  - id: detector\n    kind: dynamic\n    path: ../vision/dataflow.yml\n")
        .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    let yaml = parse_yaml(&dataflow.to_yaml().unwrap());

    assert_eq!(yaml["nodes"][0]["path"].as_str(), Some("../vision"));
    assert_eq!(yaml["nodes"][0]["operator"]["entry_point"].as_str(), Some("../vision/detector.py"));
}

#[test]
fn test_referenced_document_is_rendered_with_process_context() {
    let env = TestEnvironment::new().unwrap().with_var("PLOT_SCRIPT", "plot.py");
    env.write("plot.py", "").unwrap();
    env.write("graphs/other.yml", "nodes:\n  - id: plot\n    operator:\n      python: {{ cwd }}/{{ env.PLOT_SCRIPT }}\n")
        .unwrap();
    env.write(
        "deploy.yml",
        "nodes:\n  - id: plot\n    kind: dynamic\n    path: graphs/other.yml\n",
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    assert_eq!(dataflow.nodes[0].operator.entry_point, PathBuf::from("plot.py"));
}

#[test]
fn test_component_can_declare_dynamic_node() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write("library.yml", &deployment(&[explicit_node("shared", "op.py")])).unwrap();
    env.write("t.yml.j2", "nodes:\n  - id: {{ node }}\n    kind: dynamic\n    path: library.yml\n").unwrap();
    env.write(
        "deploy.yml",
        "components:\n  - id: importer\n    path: t.yml.j2\n    env:\n      node: shared\n",
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    assert_eq!(dataflow.ids().collect::<Vec<_>>(), vec!["shared"]);
}

#[test]
fn test_bare_operator_matched_by_derived_id() {
    let env = TestEnvironment::new().unwrap();
    env.write("lib/sink.py", "").unwrap();
    env.write("lib/graph.yml", "nodes:\n  - operator:\n      python: sink.py\n      inputs: {data: source/data}\n")
        .unwrap();
    env.write("deploy.yml", "nodes:\n  - id: sink\n    kind: dynamic\n    path: lib/graph.yml\n").unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    assert_eq!(dataflow.ids().collect::<Vec<_>>(), vec!["sink"]);
    assert_eq!(dataflow.nodes[0].path, PathBuf::from("lib"));
    assert_eq!(dataflow.nodes[0].operator.entry_point, PathBuf::from("lib/sink.py"));
}

#[test]
fn test_missing_node_names_id_and_source() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write("other.yml", &deployment(&[explicit_node("camera", "op.py")])).unwrap();
    env.write("deploy.yml", "nodes:\n  - id: plot\n    kind: dynamic\n    path: other.yml\n").unwrap();

    let error = env.builder().build(&env.path("deploy.yml")).unwrap_err();
    match error.root_cause() {
        BuildError::DynamicNodeNotFound {
            id,
            source_path,
        } => {
            assert_eq!(id, "plot");
            assert_eq!(source_path, &PathBuf::from("other.yml"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let message = error.root_cause().to_string();
    assert!(message.contains("plot") && message.contains("other.yml"), "{message}");
}

#[test]
fn test_missing_referenced_document() {
    let env = TestEnvironment::new().unwrap();
    env.write("deploy.yml", "nodes:\n  - id: plot\n    kind: dynamic\n    path: nowhere.yml\n").unwrap();

    let error = env.builder().build(&env.path("deploy.yml")).unwrap_err();
    assert!(matches!(error.root_cause(), BuildError::PathNotFound { reference, .. } if reference == "nowhere.yml"));
}

#[test]
fn test_cyclic_references_fail() {
    let env = TestEnvironment::new().unwrap();
    env.write("a.yml", "nodes:\n  - id: x\n    kind: dynamic\n    path: b.yml\n").unwrap();
    env.write("b.yml", "nodes:\n  - id: x\n    kind: dynamic\n    path: a.yml\n").unwrap();

    let error = env.builder().build(&env.path("a.yml")).unwrap_err();
    match error.root_cause() {
        BuildError::CyclicReference {
            chain,
        } => {
            assert_eq!(chain.first().map(String::as_str), Some("b.yml#x"));
            assert!(chain.iter().any(|link| link == "a.yml#x"));
            assert_eq!(chain.first(), chain.last());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_self_reference_fails() {
    let env = TestEnvironment::new().unwrap();
    env.write("loop.yml", "nodes:\n  - id: x\n    kind: dynamic\n    path: loop.yml\n").unwrap();

    let error = env.builder().build(&env.path("loop.yml")).unwrap_err();
    assert!(matches!(error.root_cause(), BuildError::CyclicReference { .. }));
}
