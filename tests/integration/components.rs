use dynamic_dora_builder::core::BuildError;
use std::path::PathBuf;

use crate::common::{TestEnvironment, deployment, explicit_node, node_ids, parse_yaml};

#[test]
fn test_component_nodes_follow_declared_nodes() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write("g.py", "").unwrap();
    env.write(
        "t.yml.j2",
        "nodes:\n  - id: gen\n    env:\n      X: {{ x }}\n    operator:\n      entry_point: g.py\n      inputs: {}\n      outputs: []\n",
    )
    .unwrap();
    env.write(
        "deploy.yml",
        &format!(
            "components:\n  - id: c\n    path: t.yml.j2\n    env: {{x: 5}}\n{}",
            deployment(&[explicit_node("first", "op.py")])
        ),
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();

    assert_eq!(dataflow.ids().collect::<Vec<_>>(), vec!["first", "gen"]);
    let gen_node = dataflow.node("gen").unwrap();
    assert_eq!(gen_node.operator.entry_point, PathBuf::from("g.py"));
    let x = gen_node.env.as_ref().and_then(|env| env.get("X")).and_then(serde_yaml::Value::as_u64);
    assert_eq!(x, Some(5));
}

#[test]
fn test_components_expand_in_declaration_order() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write(
        "templates/worker.yml.j2",
        r#"nodes:
{% for i in range(end=count) %}
  - id: {{ prefix }}-{{ i }}
    operator:
      python: op.py
      inputs:
        tick: dora/timer/millis/{{ env.period }}
{% endfor %}
"#,
    )
    .unwrap();
    env.write(
        "deploy.yml",
        r#"components:
  - id: fast
    path: templates/worker.yml.j2
    env:
      prefix: fast
      count: 2
      period: 10
  - id: slow
    path: templates/worker.yml.j2
    env:
      prefix: slow
      count: 1
      period: 1000
"#,
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    let yaml = parse_yaml(&dataflow.to_yaml().unwrap());

    assert_eq!(node_ids(&yaml), vec!["fast-0", "fast-1", "slow-0"]);
    assert_eq!(yaml["nodes"][2]["operator"]["inputs"]["tick"].as_str(), Some("dora/timer/millis/1000"));
}

#[test]
fn test_component_nested_variables() {
    let env = TestEnvironment::new().unwrap();
    env.write("cam.py", "").unwrap();
    env.write(
        "camera.yml.j2",
        "nodes:\n  - id: cam\n    env:\n      WIDTH: {{ resolution.width }}\n      HEIGHT: {{ env.resolution.height }}\n    operator:\n      python: cam.py\n",
    )
    .unwrap();
    env.write(
        "deploy.yml",
        "components:\n  - id: camera\n    path: camera.yml.j2\n    env:\n      resolution:\n        width: 640\n        height: 480\n",
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    let node_env = dataflow.node("cam").and_then(|node| node.env.clone()).unwrap();
    assert_eq!(node_env.get("WIDTH").and_then(serde_yaml::Value::as_u64), Some(640));
    assert_eq!(node_env.get("HEIGHT").and_then(serde_yaml::Value::as_u64), Some(480));
}

#[test]
fn test_component_does_not_see_process_environment() {
    let env = TestEnvironment::new().unwrap().with_var("HOME", "/root");
    env.write("t.yml.j2", "nodes: []\n# {{ env.HOME }}\n").unwrap();
    env.write("deploy.yml", "components:\n  - id: c\n    path: t.yml.j2\n").unwrap();

    let error = env.builder().build(&env.path("deploy.yml")).unwrap_err();
    assert!(matches!(error, BuildError::ComponentExpansion { ref id, .. } if id == "c"));
    assert!(matches!(
        error.root_cause(),
        BuildError::UndefinedVariable { variable, .. } if variable == "env.HOME"
    ));
}

#[test]
fn test_component_template_path_falls_back_to_cwd() {
    let env = TestEnvironment::new().unwrap();
    env.write("op.py", "").unwrap();
    env.write("shared/t.yml.j2", &deployment(&[explicit_node("shared-node", "op.py")])).unwrap();
    env.write("deployments/robot.yml", "components:\n  - id: c\n    path: shared/t.yml.j2\n").unwrap();

    let dataflow = env.builder().build(&env.path("deployments/robot.yml")).unwrap();
    assert_eq!(dataflow.ids().collect::<Vec<_>>(), vec!["shared-node"]);
    assert_eq!(dataflow.nodes[0].operator.entry_point, PathBuf::from("op.py"));
}

#[test]
fn test_component_producing_invalid_yaml() {
    let env = TestEnvironment::new().unwrap();
    env.write("t.yml.j2", "nodes: [{{ x }}\n").unwrap();
    env.write("deploy.yml", "components:\n  - id: broken\n    path: t.yml.j2\n    env: {x: 1}\n").unwrap();

    let error = env.builder().build(&env.path("deploy.yml")).unwrap_err();
    assert!(matches!(error, BuildError::ComponentExpansion { ref id, .. } if id == "broken"));
    assert!(matches!(error.root_cause(), BuildError::Parse { .. }));
}
