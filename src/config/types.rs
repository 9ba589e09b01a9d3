//! Core manifest types
//!
//! This module defines the data structures that represent a taskrig.yml manifest.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Top-level manifest structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Package name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tasks replaced by a no-op, matched exactly against canonical names
    #[serde(
        rename = "disabledTasks",
        alias = "disabled-tasks",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub disabled_tasks: Vec<String>,

    /// Interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Extra runtime options, on top of the standard ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionSpec>,

    /// Task provider: names mapped to commands or to groups of commands
    #[serde(default, skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub tasks: serde_yaml::Mapping,

    /// Extra pipelines composed over task names
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pipelines: BTreeMap<String, Step>,
}

/// A runtime option declared in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OptionSpec {
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Alternative names (one name or a list)
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_one_or_many"
    )]
    pub alias: Vec<String>,

    /// Whether the option carries a value instead of being a switch
    #[serde(default)]
    pub value: bool,
}

/// A pipeline step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Step {
    /// A task or pipeline name
    Task(String),

    /// Steps run one after another
    Series(SeriesStep),

    /// Steps run concurrently
    Parallel(ParallelStep),

    /// A step gated by flag conditions
    Condition(ConditionStep),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesStep {
    pub series: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParallelStep {
    pub parallel: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionStep {
    pub condition: GuardedStep,
}

/// The body of a condition step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuardedStep {
    /// The step to run when every condition holds
    pub task: Box<Step>,

    /// Conditions (AND logic); an empty list always holds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub when: Vec<When>,
}

/// A flag condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct When {
    /// Flag must be set
    #[serde(rename = "flag-set", default, skip_serializing_if = "Option::is_none")]
    pub flag_set: Option<String>,

    /// Flag must not be set
    #[serde(rename = "flag-not-set", default, skip_serializing_if = "Option::is_none")]
    pub flag_not_set: Option<String>,

    /// Flag must have this value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<FlagComparison>,

    /// Flag must not have this value
    #[serde(rename = "not-equal", default, skip_serializing_if = "Option::is_none")]
    pub not_equal: Option<FlagComparison>,
}

impl When {
    /// Flags this condition reads
    pub fn flags(&self) -> Vec<&str> {
        let mut flags = Vec::new();
        flags.extend(self.flag_set.as_deref());
        flags.extend(self.flag_not_set.as_deref());
        flags.extend(self.equal.as_ref().map(|c| c.flag.as_str()));
        flags.extend(self.not_equal.as_ref().map(|c| c.flag.as_str()));
        flags
    }
}

/// Flag/value pair used by equal and not-equal conditions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FlagComparison {
    pub flag: String,
    pub value: String,
}

/// Custom deserializer for a single string or a list of strings
fn deserialize_one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => Ok(vec![s]),
        OneOrMany::Many(v) => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_alias_forms() {
        let one: OptionSpec = serde_yaml::from_str("alias: s").unwrap();
        assert_eq!(one.alias, vec!["s"]);

        let many: OptionSpec = serde_yaml::from_str("alias: [s, skip]\nvalue: true").unwrap();
        assert_eq!(many.alias, vec!["s", "skip"]);
        assert!(many.value);
    }

    #[test]
    fn test_step_shapes() {
        let step: Step = serde_yaml::from_str(
            r#"
series:
  - clean
  - parallel: [copy, sass]
  - condition:
      task: webpack
      when:
        - flag-not-set: min
"#,
        )
        .unwrap();

        let Step::Series(series) = step else {
            panic!("expected a series step");
        };
        assert_eq!(series.series.len(), 3);
        assert_eq!(series.series[0], Step::Task("clean".to_string()));
        assert!(matches!(series.series[1], Step::Parallel(_)));
        assert!(matches!(series.series[2], Step::Condition(_)));
    }

    #[test]
    fn test_unknown_step_shape_is_rejected() {
        let result: Result<Step, _> = serde_yaml::from_str("sequence: [a, b]");
        assert!(result.is_err());
    }

    #[test]
    fn test_when_flags() {
        let when: When = serde_yaml::from_str("equal: {flag: w, value: prod.js}").unwrap();
        assert_eq!(when.flags(), vec!["w"]);
    }
}
