use lazy_static::lazy_static;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::aggregate::{has_project_fn, sum_by_project_fn};
use crate::store::ValueAccessor;

/// Signature of a function callable from survey expressions
pub type SurveyFunction = fn(&dyn ValueAccessor, &[Value]) -> Value;

pub const SUM_BY_PROJECT: &str = "sumByProject";
pub const HAS_PROJECT: &str = "hasProject";

/// Table of expression functions keyed by name
///
/// Names are case-sensitive, the way they appear in expressions.
#[derive(Clone, Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, SurveyFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// A registry holding only the built-in aggregation functions
    pub fn with_builtins() -> Self {
        let mut registry = FunctionRegistry::new();
        registry.register(SUM_BY_PROJECT, sum_by_project_fn);
        registry.register(HAS_PROJECT, has_project_fn);
        registry
    }

    /// Register `func` under `name`, replacing any previous entry
    pub fn register(&mut self, name: &str, func: SurveyFunction) {
        if self.functions.insert(name.to_string(), func).is_some() {
            debug!("replaced expression function '{}'", name);
        }
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<SurveyFunction> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }
}

lazy_static! {
    /// Process-wide defaults every new survey starts from
    static ref FUNCTIONS: RwLock<FunctionRegistry> = RwLock::new(FunctionRegistry::with_builtins());
}

/// Snapshot of the process-wide registry
pub fn default_registry() -> FunctionRegistry {
    match FUNCTIONS.read() {
        Ok(registry) => registry.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Add a function to the process-wide registry
///
/// Surveys created afterwards pick it up; existing surveys keep their own
/// table.
pub fn register_function(name: &str, func: SurveyFunction) {
    match FUNCTIONS.write() {
        Ok(mut registry) => registry.register(name, func),
        Err(poisoned) => poisoned.into_inner().register(name, func),
    }
}

/// Remove a function from the process-wide registry
pub fn unregister_function(name: &str) -> bool {
    match FUNCTIONS.write() {
        Ok(mut registry) => registry.unregister(name),
        Err(poisoned) => poisoned.into_inner().unregister(name),
    }
}
