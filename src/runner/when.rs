//! Flag conditions
//!
//! Manifest pipelines gate steps with declarative conditions over the
//! runtime flags. A list of conditions holds when every condition holds.

use crate::config;
use crate::runner::Flags;

/// Runtime representation of a when condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagCondition {
    Set(String),
    NotSet(String),
    Equal { flag: String, value: String },
    NotEqual { flag: String, value: String },
    Always,
}

impl FlagCondition {
    pub fn from_config(config: config::When) -> Self {
        if let Some(flag) = config.flag_set {
            FlagCondition::Set(flag)
        } else if let Some(flag) = config.flag_not_set {
            FlagCondition::NotSet(flag)
        } else if let Some(eq) = config.equal {
            FlagCondition::Equal {
                flag: eq.flag,
                value: eq.value,
            }
        } else if let Some(ne) = config.not_equal {
            FlagCondition::NotEqual {
                flag: ne.flag,
                value: ne.value,
            }
        } else {
            FlagCondition::Always
        }
    }
}

/// Evaluate a list of conditions (all must be true - AND logic)
pub fn evaluate_when_list(conditions: &[FlagCondition], flags: &Flags) -> bool {
    conditions.iter().all(|c| evaluate_when(c, flags))
}

/// Evaluate a single condition against the current flags
pub fn evaluate_when(condition: &FlagCondition, flags: &Flags) -> bool {
    match condition {
        FlagCondition::Always => true,
        FlagCondition::Set(flag) => flags.is_set(flag),
        FlagCondition::NotSet(flag) => !flags.is_set(flag),
        FlagCondition::Equal { flag, value } => {
            flags.get(flag).is_some_and(|v| v.to_string() == *value)
        }
        FlagCondition::NotEqual { flag, value } => {
            flags.get(flag).map_or(true, |v| v.to_string() != *value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{OptionRegistry, MIN, PRODUCTION};

    fn flags() -> Flags {
        Flags::new(OptionRegistry::standard())
            .with(PRODUCTION, true)
            .with("w", "webpack.prod.js")
    }

    #[test]
    fn test_set_and_not_set() {
        let flags = flags();
        assert!(evaluate_when(&FlagCondition::Set(PRODUCTION.to_string()), &flags));
        assert!(!evaluate_when(&FlagCondition::Set(MIN.to_string()), &flags));
        assert!(evaluate_when(&FlagCondition::NotSet("npm-install-mode".to_string()), &flags));
    }

    #[test]
    fn test_equal_uses_aliases() {
        let flags = flags();
        let eq = FlagCondition::Equal {
            flag: "webpackConfig".to_string(),
            value: "webpack.prod.js".to_string(),
        };
        assert!(evaluate_when(&eq, &flags));

        let ne = FlagCondition::NotEqual {
            flag: "webpack-config".to_string(),
            value: "webpack.prod.js".to_string(),
        };
        assert!(!evaluate_when(&ne, &flags));
    }

    #[test]
    fn test_not_equal_on_unset_flag() {
        let ne = FlagCondition::NotEqual {
            flag: "prdeploy".to_string(),
            value: "true".to_string(),
        };
        assert!(evaluate_when(&ne, &flags()));
    }

    #[test]
    fn test_list_is_conjunction() {
        let flags = flags();
        let list = vec![
            FlagCondition::Set(PRODUCTION.to_string()),
            FlagCondition::NotSet(MIN.to_string()),
        ];
        assert!(evaluate_when_list(&list, &flags));

        let list = vec![
            FlagCondition::Set(PRODUCTION.to_string()),
            FlagCondition::Set(MIN.to_string()),
        ];
        assert!(!evaluate_when_list(&list, &flags));
        assert!(evaluate_when_list(&[], &flags));
    }

    #[test]
    fn test_from_config() {
        let when: config::When = serde_yaml::from_str("flag-not-set: prdeploy").unwrap();
        assert_eq!(
            FlagCondition::from_config(when),
            FlagCondition::NotSet("prdeploy".to_string())
        );
    }
}
