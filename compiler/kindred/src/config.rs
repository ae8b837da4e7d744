//! Contains the [`Config`] of a compilation [`crate::Unit`].

use serde::{Deserialize, Serialize};

/// The limits a [`crate::Unit`] runs with.
///
/// Loaded from TOML; missing keys take their default value and unknown keys
/// are rejected.
///
/// ```toml
/// max_instantiation_depth = 32
/// max_query_depth = 64
/// max_call_depth = 256
/// max_nesting_depth = 128
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The limit of nested instance members generated by one instance.
    pub max_instantiation_depth: usize,

    /// The limit of nested where-clause proofs in structural queries.
    pub max_query_depth: usize,

    /// The limit of nested calls while evaluating.
    pub max_call_depth: usize,

    /// The limit of nested types, constraints and expressions in parsed
    /// sources.
    pub max_nesting_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_instantiation_depth: kindred_instance::DEFAULT_MAX_DEPTH,
            max_query_depth: kindred_marker::table::DEFAULT_MAX_DEPTH,
            max_call_depth: kindred_host::evaluate::DEFAULT_MAX_CALL_DEPTH,
            max_nesting_depth: kindred_syntax::parser::DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl Config {
    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input, a key of the wrong type or
    /// an unknown key.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns the error of the serializer.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
