/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      environment.rs
 * Purpose:   The workspace: the mutable name-to-value mapping holding all
 *            currently bound script variables.
 *
 * License:
 * This file is part of the MLAB project.
 *
 * MLAB is dual-licensed under the terms of:
 *   - The MIT License
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::MlabError;
use crate::value::Value;

/// Variable names start with a letter or underscore; the rest is
/// alphanumeric or underscore.
pub fn is_valid_name(name: &str) -> bool {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
    re.is_match(name)
}

/// The variable workspace for one script run or interactive session.
///
/// A single flat scope: MLAB has no user-defined functions, so there is no
/// scope chain. Bindings have value semantics, `set` stores a value that is
/// logically independent of any prior value, and `get` hands out a clone.
///
/// The workspace is exclusively owned by one runner or REPL; sharing state
/// between successive script runs means passing the owning `Session`
/// explicitly, never ambient/global state.
#[derive(Debug, Default)]
pub struct Workspace {
    vars: HashMap<String, Value>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a binding.
    pub fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Reads a binding, failing with `UndefinedVariable` when absent.
    pub fn get(&self, name: &str) -> Result<Value, MlabError> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| MlabError::UndefinedVariable(name.to_string()))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Removes every binding (`clear` / `clear all`).
    pub fn clear_all(&mut self) {
        self.vars.clear();
    }

    /// Removes one binding (`clear <name>`); absent names are a no-op.
    pub fn clear_one(&mut self, name: &str) {
        self.vars.remove(name);
    }

    /// All bound names in sorted order, so `who`/`whos` listings are
    /// deterministic.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vars.keys().cloned().collect();
        names.sort();
        names
    }

    /// Estimated storage for one binding in bytes, for the `whos` listing.
    pub fn memory_estimate(&self, name: &str) -> Option<usize> {
        self.vars.get(name).map(Value::memory_size)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_get_overwrite() {
        let mut ws = Workspace::new();
        ws.set("x", Value::Scalar(5.0));
        assert_eq!(ws.get("x").unwrap(), Value::Scalar(5.0));

        ws.set("x", Value::Sequence(vec![1.0, 2.0]));
        assert_eq!(ws.get("x").unwrap(), Value::Sequence(vec![1.0, 2.0]));
    }

    #[test]
    fn missing_variable_is_an_error() {
        let ws = Workspace::new();
        assert!(matches!(
            ws.get("nope"),
            Err(MlabError::UndefinedVariable(_))
        ));
    }

    #[test]
    fn clear_one_and_all() {
        let mut ws = Workspace::new();
        ws.set("a", Value::Scalar(1.0));
        ws.set("b", Value::Scalar(2.0));

        ws.clear_one("a");
        assert!(!ws.exists("a"));
        assert!(ws.exists("b"));

        ws.clear_all();
        assert!(ws.is_empty());
    }

    #[test]
    fn listing_is_sorted() {
        let mut ws = Workspace::new();
        ws.set("zebra", Value::Scalar(1.0));
        ws.set("ans", Value::Scalar(2.0));
        ws.set("M", Value::Scalar(3.0));
        assert_eq!(ws.list_names(), vec!["M", "ans", "zebra"]);
    }

    #[test]
    fn memory_estimate_counts_elements() {
        let mut ws = Workspace::new();
        ws.set("m", Value::Grid(vec![vec![0.0; 3]; 3]));
        assert_eq!(ws.memory_estimate("m"), Some(72));
        assert_eq!(ws.memory_estimate("missing"), None);
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("x"));
        assert!(is_valid_name("_tmp2"));
        assert!(is_valid_name("waterData"));
        assert!(!is_valid_name("2x"));
        assert!(!is_valid_name("a-b"));
        assert!(!is_valid_name(""));
    }
}
