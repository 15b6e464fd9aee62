use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Read-only view over the survey's named values
///
/// This is the only capability expression functions receive. Returning
/// `None` means the key has no value yet.
pub trait ValueAccessor {
    fn get_value(&self, key: &str) -> Option<&Value>;
}

/// Key-value store backing a survey
///
/// Keys are question names; values are whatever the question produces
/// (the dynamic table stores an array of row objects).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SurveyData {
    values: Map<String, Value>,
}

impl SurveyData {
    pub fn new() -> Self {
        SurveyData { values: Map::new() }
    }

    /// Store a value, or drop the key when the value is `null`
    ///
    /// Returns `true` when the stored state actually changed.
    pub fn set_value(&mut self, key: &str, value: Value) -> bool {
        if value.is_null() {
            return self.values.remove(key).is_some();
        }
        if self.values.get(key) == Some(&value) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.values.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

impl ValueAccessor for SurveyData {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

impl From<Map<String, Value>> for SurveyData {
    fn from(values: Map<String, Value>) -> Self {
        SurveyData { values }
    }
}

/// An accessor with nothing in it
///
/// Used when a function is evaluated without any survey attached.
pub struct EmptyAccessor;

impl ValueAccessor for EmptyAccessor {
    fn get_value(&self, _key: &str) -> Option<&Value> {
        None
    }
}
