use dynamic_dora_builder::core::BuildError;
use std::fs;
use std::path::PathBuf;

use crate::common::{TestEnvironment, deployment, explicit_node, parse_yaml};

#[test]
fn test_deployment_directory_wins_then_cwd_fallback() {
    let env = TestEnvironment::new().unwrap();
    env.write("robot/op.py", "").unwrap();
    env.write("op.py", "").unwrap();
    env.write("robot/deploy.yml", &deployment(&[explicit_node("a", "op.py")])).unwrap();

    let builder = env.builder();
    let dataflow = builder.build(&env.path("robot/deploy.yml")).unwrap();
    assert_eq!(dataflow.nodes[0].operator.entry_point, PathBuf::from("robot/op.py"));

    fs::remove_file(env.path("robot/op.py")).unwrap();
    let dataflow = builder.build(&env.path("robot/deploy.yml")).unwrap();
    assert_eq!(dataflow.nodes[0].operator.entry_point, PathBuf::from("op.py"));
}

#[test]
fn test_unresolvable_path_lists_candidates() {
    let env = TestEnvironment::new().unwrap();
    env.write("robot/deploy.yml", &deployment(&[explicit_node("a", "op.py")])).unwrap();

    let error = env.builder().build(&env.path("robot/deploy.yml")).unwrap_err();
    match error.root_cause() {
        BuildError::PathNotFound {
            reference,
            searched,
        } => {
            assert_eq!(reference, "op.py");
            assert_eq!(searched, &vec![env.path("robot/op.py"), env.path("op.py")]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_paths_outside_output_root_use_parent_segments() {
    let env = TestEnvironment::new().unwrap();
    env.write_outside("shared/nodes/op.py", "").unwrap();
    env.write(
        "deploy.yml",
        "nodes:\n  - id: a\n    path: ../shared/nodes\n    operator:\n      python: ../shared/nodes/op.py\n",
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    let yaml = parse_yaml(&dataflow.to_yaml().unwrap());

    assert_eq!(yaml["nodes"][0]["path"].as_str(), Some("../shared/nodes"));
    assert_eq!(yaml["nodes"][0]["operator"]["entry_point"].as_str(), Some("../shared/nodes/op.py"));
}

#[test]
fn test_absolute_paths_are_made_relative() {
    let env = TestEnvironment::new().unwrap();
    let script = env.write("nodes/op.py", "").unwrap();
    env.write(
        "deploy.yml",
        &format!("nodes:\n  - id: a\n    operator:\n      python: \"{}\"\n", script.display()),
    )
    .unwrap();

    let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
    assert_eq!(dataflow.nodes[0].operator.entry_point, PathBuf::from("nodes/op.py"));
}

#[test]
fn test_node_path_defaults_to_declaring_document() {
    let env = TestEnvironment::new().unwrap();
    env.write("deployments/robot/op.py", "").unwrap();
    env.write("deployments/robot/deploy.yml", &deployment(&[explicit_node("a", "op.py")])).unwrap();

    let dataflow = env.builder().build(&env.path("deployments/robot/deploy.yml")).unwrap();
    let yaml = parse_yaml(&dataflow.to_yaml().unwrap());
    assert_eq!(yaml["nodes"][0]["path"].as_str(), Some("deployments/robot"));
    assert_eq!(yaml["nodes"][0]["operator"]["entry_point"].as_str(), Some("deployments/robot/op.py"));
}
