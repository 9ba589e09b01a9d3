//! Manifest validation
//!
//! This module provides validation logic for manifests, run before any task
//! is registered.

use crate::config::types::{Manifest, Step};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::{is_canonical, normalize, OptionDecl, OptionRegistry};
use std::collections::HashSet;

/// Long flags and short flags taken by the command line itself
pub const RESERVED_FLAGS: &[&str] = &[
    "task",
    "file",
    "quiet",
    "silent",
    "verbose",
    "list",
    "completions",
    "help",
    "version",
    "f",
    "q",
    "s",
    "v",
    "l",
    "h",
    "V",
];

/// Validate a complete manifest
pub fn validate_manifest(manifest: &Manifest) -> ConfigResult<()> {
    let options = manifest_options(manifest)?;

    if let Some(interpreter) = &manifest.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name at least a program".to_string(),
            ));
        }
    }

    for (name, step) in &manifest.pipelines {
        // Pipelines are invoked by canonical name, like discovered tasks
        if !is_canonical(name) {
            return Err(ConfigError::Invalid(format!(
                "Pipeline '{}' must be named in kebab-case, as '{}'",
                name,
                normalize(name)
            )));
        }
        validate_step(name, step, &options)?;
    }

    detect_circular_pipelines(manifest)?;

    Ok(())
}

/// The standard options extended with the manifest's own declarations
pub fn manifest_options(manifest: &Manifest) -> ConfigResult<OptionRegistry> {
    let mut options = OptionRegistry::standard();

    for (name, spec) in &manifest.options {
        if let Some(reserved) = std::iter::once(name)
            .chain(spec.alias.iter())
            .find(|n| RESERVED_FLAGS.contains(&n.as_str()))
        {
            return Err(ConfigError::ReservedOption(reserved.clone()));
        }

        let mut decl = if spec.value {
            OptionDecl::value(name.clone())
        } else {
            OptionDecl::flag(name.clone())
        };
        for alias in &spec.alias {
            decl = decl.alias(alias.clone());
        }
        if let Some(usage) = &spec.usage {
            decl = decl.usage(usage.clone());
        }
        options.declare(decl)?;
    }

    Ok(options)
}

/// Validate a single pipeline step tree
fn validate_step(pipeline: &str, step: &Step, options: &OptionRegistry) -> ConfigResult<()> {
    match step {
        Step::Task(name) => {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Pipeline '{}' references an empty task name",
                    pipeline
                )));
            }
        }
        Step::Series(s) => validate_steps(pipeline, "series", &s.series, options)?,
        Step::Parallel(p) => validate_steps(pipeline, "parallel", &p.parallel, options)?,
        Step::Condition(c) => {
            for when in &c.condition.when {
                let flags = when.flags();
                if flags.len() != 1 {
                    return Err(ConfigError::Invalid(format!(
                        "Each condition in pipeline '{}' must check exactly one flag",
                        pipeline
                    )));
                }
                for flag in flags {
                    if options.resolve(flag).is_none() {
                        return Err(ConfigError::UnknownFlag {
                            pipeline: pipeline.to_string(),
                            flag: flag.to_string(),
                        });
                    }
                }
            }
            validate_step(pipeline, &c.condition.task, options)?;
        }
    }
    Ok(())
}

fn validate_steps(
    pipeline: &str,
    kind: &str,
    steps: &[Step],
    options: &OptionRegistry,
) -> ConfigResult<()> {
    if steps.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "Pipeline '{}' contains an empty {}",
            pipeline, kind
        )));
    }
    for step in steps {
        validate_step(pipeline, step, options)?;
    }
    Ok(())
}

/// Names referenced anywhere in a step tree
fn step_references<'a>(step: &'a Step, out: &mut Vec<&'a str>) {
    match step {
        Step::Task(name) => out.push(name),
        Step::Series(s) => s.series.iter().for_each(|s| step_references(s, out)),
        Step::Parallel(p) => p.parallel.iter().for_each(|s| step_references(s, out)),
        Step::Condition(c) => step_references(&c.condition.task, out),
    }
}

/// Detect circular references between manifest pipelines
fn detect_circular_pipelines(manifest: &Manifest) -> ConfigResult<()> {
    let mut done = HashSet::new();
    for name in manifest.pipelines.keys() {
        let mut stack = Vec::new();
        check_pipeline_cycle(manifest, name, &mut done, &mut stack)?;
    }
    Ok(())
}

/// Recursively check for cycles in pipeline references
fn check_pipeline_cycle<'a>(
    manifest: &'a Manifest,
    name: &'a str,
    done: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
) -> ConfigResult<()> {
    if stack.contains(&name) {
        stack.push(name);
        return Err(ConfigError::CircularDependency(stack.join(" -> ")));
    }

    if done.contains(name) {
        return Ok(());
    }

    // Only manifest pipelines can close a cycle; everything else is a leaf here
    let Some(step) = manifest.pipelines.get(name) else {
        return Ok(());
    };

    stack.push(name);
    let mut refs = Vec::new();
    step_references(step, &mut refs);
    for reference in refs {
        check_pipeline_cycle(manifest, reference, done, stack)?;
    }
    stack.pop();

    done.insert(name);
    Ok(())
}
