//! Integration tests for manifest parsing and manifest-driven runs

mod common;

use common::create_test_manifest;
use std::fs;
use taskrig::config::{manifest_options, parse_manifest, parse_manifest_file, validate_manifest};
use taskrig::error::{DiscoveryError, ExecutionError, TaskrigError};
use taskrig::runner::{
    define_manifest_pipelines, define_standard_pipelines, discover_yaml, Context, DisabledTasks,
    Flags, TaskRegistry,
};

const PACKAGE_MANIFEST: &str = r#"
name: button
disabledTasks:
  - lint:strict
interpreter: [sh, -c]
options:
  docs:
    usage: Also build the documentation
    alias: [d, with-docs]
tasks:
  clean: echo clean >> out.log
  copy:
    - echo copy-a >> out.log
    - echo copy-b >> out.log
  lint:
    fast: echo lint-fast >> out.log
    strict: echo lint-strict >> out.log
  docs: echo docs >> out.log
pipelines:
  ship:
    series:
      - clean
      - parallel: [copy, "lint:fast", "lint:strict"]
      - condition:
          task: docs
          when:
            - flag-set: docs
"#;

fn registry_for(yaml: &str) -> (TaskRegistry, taskrig::config::Manifest) {
    let manifest = parse_manifest(yaml).unwrap();
    validate_manifest(&manifest).unwrap();

    let disabled = DisabledTasks::new(manifest.disabled_tasks.clone(), "taskrig.yml");
    let mut registry = TaskRegistry::new(disabled);
    discover_yaml(&manifest.tasks, &mut registry).unwrap();
    define_standard_pipelines(&mut registry);
    define_manifest_pipelines(&manifest.pipelines, &mut registry);
    (registry, manifest)
}

fn output_lines(dir: &std::path::Path) -> Vec<String> {
    fs::read_to_string(dir.join("out.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_parse_package_manifest() {
    let (temp_dir, manifest_path) = create_test_manifest(PACKAGE_MANIFEST);
    let manifest = parse_manifest_file(&manifest_path).unwrap();

    assert_eq!(manifest.name.as_deref(), Some("button"));
    assert_eq!(manifest.disabled_tasks, vec!["lint:strict"]);
    assert_eq!(manifest.tasks.len(), 4);
    assert!(manifest.pipelines.contains_key("ship"));
    drop(temp_dir);
}

#[test]
fn test_discovery_names() {
    let manifest = parse_manifest(PACKAGE_MANIFEST).unwrap();
    let mut registry = TaskRegistry::default();
    let names = discover_yaml(&manifest.tasks, &mut registry).unwrap();

    assert_eq!(names, vec!["clean", "copy", "lint:fast", "lint:strict", "docs"]);
}

#[test]
fn test_manifest_options_extend_standard() {
    let manifest = parse_manifest(PACKAGE_MANIFEST).unwrap();
    let options = manifest_options(&manifest).unwrap();

    assert_eq!(options.resolve("with-docs"), Some("docs"));
    assert_eq!(options.resolve("npm-install-mode"), Some("min"));
}

#[test]
fn test_nested_group_is_rejected() {
    let manifest = parse_manifest(
        r#"
tasks:
  lint:
    strict:
      deep: echo too deep
"#,
    )
    .unwrap();

    let mut registry = TaskRegistry::default();
    let err = discover_yaml(&manifest.tasks, &mut registry).unwrap_err();
    assert!(matches!(
        err,
        DiscoveryError::InvalidGroupMember { ref group, ref member, .. }
            if group == "lint" && member == "strict"
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_non_executable_task_is_rejected() {
    let manifest = parse_manifest("tasks:\n  retries: 3\n").unwrap();
    let mut registry = TaskRegistry::default();
    let err = discover_yaml(&manifest.tasks, &mut registry).unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidTask { ref name, .. } if name == "retries"));
}

#[test]
fn test_malformed_manifest() {
    let (_temp_dir, manifest_path) = create_test_manifest("tasks: [unclosed\n");
    assert!(matches!(
        parse_manifest_file(&manifest_path),
        Err(TaskrigError::Yaml(_))
    ));
}

#[tokio::test]
async fn test_manifest_pipeline_runs_commands() {
    let (temp_dir, _) = create_test_manifest(PACKAGE_MANIFEST);
    let (registry, manifest) = registry_for(PACKAGE_MANIFEST);
    let options = manifest_options(&manifest).unwrap();

    let ctx = Context::new(registry, Flags::new(options))
        .with_working_dir(temp_dir.path().to_path_buf());
    ctx.run_task("ship").await.unwrap();

    let lines = output_lines(temp_dir.path());
    assert_eq!(lines.first().map(String::as_str), Some("clean"));
    assert!(lines.contains(&"copy-a".to_string()));
    assert!(lines.contains(&"lint-fast".to_string()));
    assert!(!lines.contains(&"lint-strict".to_string()));
    assert!(!lines.contains(&"docs".to_string()));

    let copy_a = lines.iter().position(|l| l == "copy-a").unwrap();
    let copy_b = lines.iter().position(|l| l == "copy-b").unwrap();
    assert!(copy_a < copy_b);
}

#[tokio::test]
async fn test_manifest_condition_reads_alias() {
    let (temp_dir, _) = create_test_manifest(PACKAGE_MANIFEST);
    let (registry, manifest) = registry_for(PACKAGE_MANIFEST);
    let options = manifest_options(&manifest).unwrap();

    let ctx = Context::new(registry, Flags::new(options).with("d", true))
        .with_working_dir(temp_dir.path().to_path_buf());
    ctx.run_task("ship").await.unwrap();

    assert_eq!(
        output_lines(temp_dir.path()).last().map(String::as_str),
        Some("docs")
    );
}

#[tokio::test]
async fn test_failing_command_names_task() {
    let yaml = r#"
tasks:
  clean: exit 3
  copy: echo copy >> out.log
pipelines:
  ship:
    series: [clean, copy]
"#;
    let (temp_dir, _) = create_test_manifest(yaml);
    let (registry, _) = registry_for(yaml);

    let ctx = Context::new(registry, Flags::default())
        .with_working_dir(temp_dir.path().to_path_buf());
    let err = ctx.run_task("ship").await.unwrap_err();

    assert!(matches!(err, ExecutionError::TaskFailed { ref task, .. } if task == "clean"));
    assert!(output_lines(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_manifest_pipeline_replaces_standard() {
    let yaml = r#"
tasks:
  clean: echo custom-build >> out.log
pipelines:
  build: clean
"#;
    let (temp_dir, _) = create_test_manifest(yaml);
    let (registry, _) = registry_for(yaml);

    let ctx = Context::new(registry, Flags::default())
        .with_working_dir(temp_dir.path().to_path_buf());
    ctx.run_task("build").await.unwrap();

    assert_eq!(output_lines(temp_dir.path()), vec!["custom-build"]);
}
