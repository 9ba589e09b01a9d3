//! Variable interpolation for commands
//!
//! Commands may reference flag values with the `${name}` syntax.

use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::sync::LazyLock;

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("variable pattern is valid"));

/// Longest chain of values referencing other values
const MAX_DEPTH: usize = 64;

/// Interpolate variables in a string
///
/// `${name}` is replaced by the flag value of that name, or by the
/// environment variable when no flag matches. Values may reference other
/// variables. Unknown variables, and references back into a value that is
/// still being expanded, are left as written.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    expand(s, vars, &mut Vec::new())
}

fn expand(
    s: &str,
    vars: &HashMap<String, String>,
    chain: &mut Vec<String>,
) -> InterpolationResult<String> {
    if chain.len() > MAX_DEPTH {
        return Err(InterpolationError::RecursiveInterpolation);
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;

    for caps in VARIABLE.captures_iter(s) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&s[last..whole.start()]);
        last = whole.end();

        let name = name.as_str();
        let value = if chain.iter().any(|n| n == name) {
            None
        } else {
            lookup(name, vars)
        };

        match value {
            Some(value) => {
                chain.push(name.to_string());
                out.push_str(&expand(&value, vars, chain)?);
                chain.pop();
            }
            None => out.push_str(whole.as_str()),
        }
    }

    out.push_str(&s[last..]);
    Ok(out)
}

fn lookup(name: &str, vars: &HashMap<String, String>) -> Option<String> {
    vars.get(name).cloned().or_else(|| env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_interpolation() {
        let result = interpolate("webpack --config ${w}", &vars(&[("w", "prod.js")])).unwrap();
        assert_eq!(result, "webpack --config prod.js");
    }

    #[test]
    fn test_unknown_variable_is_kept() {
        let result = interpolate("echo ${taskrig_surely_unset_var}", &HashMap::new()).unwrap();
        assert_eq!(result, "echo ${taskrig_surely_unset_var}");
    }

    #[test]
    fn test_nested_values() {
        let vars = vars(&[("config", "${dir}/webpack.js"), ("dir", "build")]);
        let result = interpolate("webpack --config ${config}", &vars).unwrap();
        assert_eq!(result, "webpack --config build/webpack.js");
    }

    #[test]
    fn test_self_reference_terminates() {
        let vars = vars(&[("a", "${a}")]);
        let result = interpolate("${a}", &vars).unwrap();
        assert_eq!(result, "${a}");
    }

    #[test]
    fn test_repeated_variable() {
        let result = interpolate("cp ${w} dist/${w}", &vars(&[("w", "prod.js")])).unwrap();
        assert_eq!(result, "cp prod.js dist/prod.js");
    }

    #[test]
    fn test_chained_then_direct() {
        let vars = vars(&[("a", "${b}"), ("b", "x")]);
        assert_eq!(interpolate("${a} ${b}", &vars).unwrap(), "x x");
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let vars = vars(&[("a", "<${b}>"), ("b", "${a}")]);
        assert_eq!(interpolate("${a}", &vars).unwrap(), "<${a}>");
    }

    #[test]
    fn test_deep_chain_is_rejected() {
        let vars: HashMap<String, String> = (0..=MAX_DEPTH + 1)
            .map(|i| (format!("v{}", i), format!("${{v{}}}", i + 1)))
            .collect();
        assert!(matches!(
            interpolate("${v0}", &vars),
            Err(InterpolationError::RecursiveInterpolation)
        ));
    }
}
