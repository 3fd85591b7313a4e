//! Environment mutations applied to a single child process.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::process::Command;

/// Variables to add or override, and variables to delete, in the child's
/// inherited environment.
///
/// Additions are applied before removals, so a key that is both added and
/// removed ends up absent. The caller's own environment is never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvChanges {
    pub add: BTreeMap<OsString, OsString>,
    pub remove: BTreeSet<OsString>,
}

impl EnvChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value` in the child.
    #[must_use]
    pub fn set(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.add.insert(key.into(), value.into());
        self
    }

    /// Set several variables in the child.
    #[must_use]
    pub fn set_all<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.add
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Delete `key` from the child's environment.
    #[must_use]
    pub fn unset(mut self, key: impl Into<OsString>) -> Self {
        self.remove.insert(key.into());
        self
    }

    /// Delete several variables from the child's environment.
    #[must_use]
    pub fn unset_all<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<OsString>,
    {
        self.remove.extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    pub(crate) fn apply(&self, command: &mut Command) {
        for (key, value) in &self.add {
            command.env(key, value);
        }
        for key in &self.remove {
            command.env_remove(key);
        }
    }
}
