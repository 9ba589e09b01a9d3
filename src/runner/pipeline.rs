//! Pipeline definitions
//!
//! Pipelines are compositions registered under a name, exactly like leaf
//! tasks. The standard set covers the usual package build; manifests can
//! add or replace pipelines with their own step trees.

use crate::config::Step;
use crate::runner::{
    condition, evaluate_when_list, parallel, series, FlagCondition, Flags, Reference,
    TaskRegistry, MIN, PRDEPLOY, PRODUCTION,
};
use std::collections::BTreeMap;

/// Names of the pipelines registered by [`define_standard_pipelines`]
pub const STANDARD_PIPELINES: &[&str] = &[
    "ts",
    "build",
    "build-jest-serializer-merge-styles",
    "build-commonjs-only",
    "code-style",
    "update-api",
    "dev",
];

/// Checks that only run in a full (not minimal, not pre-deploy) build
fn full_build(flags: &Flags) -> bool {
    !flags.is_set(MIN) && !flags.is_set(PRDEPLOY)
}

fn not_minimal(flags: &Flags) -> bool {
    !flags.is_set(MIN)
}

fn production_only(flags: &Flags) -> bool {
    flags.is_set(PRODUCTION) && full_build(flags)
}

/// Register the standard build pipelines
pub fn define_standard_pipelines(registry: &mut TaskRegistry) {
    registry.register(
        "ts",
        parallel(vec![
            Reference::from("ts:commonjs"),
            "ts:esm".into(),
            condition("ts:amd", production_only).into(),
        ]),
    );

    registry.register(
        "build",
        series(vec![
            Reference::from("clean"),
            "copy".into(),
            "sass".into(),
            parallel(vec![
                condition("tslint", full_build),
                condition("jest", full_build),
                series(vec![
                    Reference::from("ts"),
                    "build-codepen-examples".into(),
                    condition("lint-imports", full_build).into(),
                    parallel(vec![
                        condition("webpack", not_minimal),
                        condition("verify-api-extractor", full_build),
                    ])
                    .into(),
                ]),
            ])
            .into(),
        ]),
    );

    // The merge-styles serializer needs typescript and jest to run one after the other.
    registry.register("build-jest-serializer-merge-styles", series(["ts", "jest"]));

    registry.register("build-commonjs-only", series(["clean", "ts:commonjs-only"]));
    registry.register("code-style", series(["prettier", "tslint"]));
    registry.register(
        "update-api",
        series(["clean", "copy", "sass", "ts", "update-api-extractor"]),
    );
    registry.register(
        "dev",
        series(["clean", "copy", "sass", "build-codepen-examples", "webpack-dev-server"]),
    );
}

/// Build the reference for a manifest step
pub fn build_step(step: &Step) -> Reference {
    match step {
        Step::Task(name) => Reference::Task(name.clone()),
        Step::Series(s) => series(s.series.iter().map(build_step)).into(),
        Step::Parallel(p) => parallel(p.parallel.iter().map(build_step)).into(),
        Step::Condition(c) => {
            let conditions: Vec<FlagCondition> = c
                .condition
                .when
                .iter()
                .cloned()
                .map(FlagCondition::from_config)
                .collect();
            let target = build_step(&c.condition.task);
            condition(target, move |flags: &Flags| evaluate_when_list(&conditions, flags)).into()
        }
    }
}

/// Register the pipelines declared in a manifest
///
/// Manifest pipelines are registered after the standard set and replace
/// any pipeline or task of the same name.
pub fn define_manifest_pipelines(pipelines: &BTreeMap<String, Step>, registry: &mut TaskRegistry) {
    for (name, step) in pipelines {
        let executable = match build_step(step) {
            Reference::Node(node) => node,
            // A pipeline that is just another name behaves as an alias
            alias @ Reference::Task(_) => series([alias]),
        };
        registry.register(name.clone(), executable);
    }
}
