//! Runtime options and flag values
//!
//! Options are declared up front with optional aliases. Flag values are
//! always stored under the canonical option name, so every alias of an
//! option observes the same value.

use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fmt;

/// Production build
pub const PRODUCTION: &str = "production";

/// Minimal / install-only build
pub const MIN: &str = "min";

/// Pre-deploy build
pub const PRDEPLOY: &str = "prdeploy";

/// Path to a webpack configuration
pub const WEBPACK_CONFIG: &str = "webpack-config";

/// Declaration of a runtime option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    /// Canonical name
    pub name: String,

    /// Alternative names resolving to the same option
    pub aliases: Vec<String>,

    /// Help text
    pub usage: Option<String>,

    /// Whether the option carries a string value (otherwise it is a switch)
    pub takes_value: bool,
}

impl OptionDecl {
    /// Declare a boolean switch
    pub fn flag(name: impl Into<String>) -> Self {
        OptionDecl {
            name: name.into(),
            aliases: Vec::new(),
            usage: None,
            takes_value: false,
        }
    }

    /// Declare an option carrying a string value
    pub fn value(name: impl Into<String>) -> Self {
        OptionDecl {
            takes_value: true,
            ..Self::flag(name)
        }
    }

    /// Add an alias
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the help text
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Canonical name followed by every alias
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Registry of declared options
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    decls: Vec<OptionDecl>,
}

impl OptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the options the standard pipelines consult
    pub fn standard() -> Self {
        OptionRegistry {
            decls: vec![
                OptionDecl::flag(PRODUCTION).usage("Build for production"),
                OptionDecl::flag(MIN)
                    .alias("npm-install-mode")
                    .usage("Minimal build that skips linting, tests and bundling"),
                OptionDecl::flag(PRDEPLOY).usage("Pre-deploy build that skips verification steps"),
                OptionDecl::value(WEBPACK_CONFIG)
                    .alias("webpackConfig")
                    .alias("w")
                    .usage("Path to the webpack configuration"),
            ],
        }
    }

    /// Declare an option
    ///
    /// Fails if the name or any alias is already taken by another option.
    pub fn declare(&mut self, decl: OptionDecl) -> ConfigResult<()> {
        if let Some(taken) = decl.names().find(|name| self.resolve(name).is_some()) {
            return Err(ConfigError::DuplicateOption(taken.to_string()));
        }
        self.decls.push(decl);
        Ok(())
    }

    /// Resolve a name or alias to its canonical option name
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|decl| decl.names().any(|n| n == name))
            .map(|decl| decl.name.as_str())
    }

    /// Look up a declaration by name or alias
    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.decls.iter().find(|decl| decl.names().any(|n| n == name))
    }

    /// All declarations in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &OptionDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Value of a runtime flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
}

impl FlagValue {
    /// Whether the flag counts as set for conditions
    pub fn is_truthy(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Str(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Str(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Str(value)
    }
}

/// Snapshot of runtime flag values
///
/// Names are resolved through the option registry, so setting or reading
/// an alias is the same as using the canonical name. Undeclared names are
/// stored verbatim.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    options: OptionRegistry,
    values: HashMap<String, FlagValue>,
}

impl Flags {
    /// Create an empty snapshot over the given options
    pub fn new(options: OptionRegistry) -> Self {
        Flags {
            options,
            values: HashMap::new(),
        }
    }

    /// Set a flag by canonical name or alias
    pub fn set(&mut self, name: &str, value: impl Into<FlagValue>) {
        let key = self.canonical(name);
        self.values.insert(key, value.into());
    }

    /// Builder form of [`Flags::set`]
    pub fn with(mut self, name: &str, value: impl Into<FlagValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a flag value by canonical name or alias
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(&self.canonical(name))
    }

    /// Whether the flag is present and truthy
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(FlagValue::is_truthy)
    }

    /// The options backing this snapshot
    pub fn options(&self) -> &OptionRegistry {
        &self.options
    }

    /// Flag values keyed by canonical name and every alias, for interpolation
    pub fn vars(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        for (name, value) in &self.values {
            let rendered = value.to_string();
            match self.options.get(name) {
                Some(decl) => {
                    for n in decl.names() {
                        vars.insert(n.to_string(), rendered.clone());
                    }
                }
                None => {
                    vars.insert(name.clone(), rendered);
                }
            }
        }
        vars
    }

    fn canonical(&self, name: &str) -> String {
        self.options.resolve(name).unwrap_or(name).to_string()
    }
}
