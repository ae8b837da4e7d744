//! Contains the per-instance options: the skip set and the export set.

use std::{collections::BTreeSet, fmt};

use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The set of generated members made visible outside the declaring scope.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumAsInner,
    Serialize,
    Deserialize,
)]
pub enum ExportSet {
    /// Every generated member is exported, written `exporting(_)`.
    All,

    /// Only the named members are exported.
    Names(BTreeSet<String>),
}

impl Default for ExportSet {
    fn default() -> Self { Self::Names(BTreeSet::new()) }
}

impl ExportSet {
    /// Returns `true` if the member with the given name is exported.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.contains(name),
        }
    }
}

/// The options of an instance declaration.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
pub struct InstanceOptions {
    /// The members that are not generated nor checked.
    pub skip: BTreeSet<String>,

    /// The generated members that are exported.
    pub export: ExportSet,
}

impl InstanceOptions {
    /// Adds the given names to the skip set.
    #[must_use]
    pub fn skipping<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.skip.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds the given names to the export set.
    ///
    /// Has no effect if every member is already exported.
    #[must_use]
    pub fn exporting<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        if let ExportSet::Names(exported) = &mut self.export {
            exported.extend(names.into_iter().map(Into::into));
        }

        self
    }

    /// Exports every generated member.
    #[must_use]
    pub fn exporting_all(mut self) -> Self {
        self.export = ExportSet::All;
        self
    }

    /// Returns `true` if the member is in the skip set.
    #[must_use]
    pub fn is_skipped(&self, name: &str) -> bool { self.skip.contains(name) }

    /// Returns `true` if the member is in the export set.
    #[must_use]
    pub fn is_exported(&self, name: &str) -> bool { self.export.contains(name) }
}

impl fmt::Display for InstanceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";

        if !self.skip.is_empty() {
            write!(f, "skipping({})", self.skip.iter().format(", "))?;
            separator = " ";
        }

        match &self.export {
            ExportSet::All => write!(f, "{separator}exporting(_)"),
            ExportSet::Names(names) if !names.is_empty() => write!(
                f,
                "{separator}exporting({})",
                names.iter().format(", ")
            ),
            ExportSet::Names(_) => Ok(()),
        }
    }
}
