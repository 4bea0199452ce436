//! # Extension traits for raw invocation events.

use serde_json::Value;

use crate::errors::Error;

/// Trait to extract fields from a raw JSON event
///
/// The Lambda runtime hands the function an untyped JSON value. This trait
/// provides lookups that keep field values exactly as the invoker sent them.
pub trait EventValueExt {
    fn get_s(&self, key: &str) -> Option<&str>;
    fn require(&self, key: &str) -> Result<Value, Error>;
}

impl EventValueExt for Value {
    /// Return a string from a key
    ///
    /// E.g. if you run `get_s("op")` on an event structured like this,
    /// you will retrieve the value `"get"`.
    ///
    /// ```json
    /// {
    ///   "op": "get",
    ///   "id": "42"
    /// }
    /// ```
    ///
    /// Non-string values and non-object events yield `None`.
    fn get_s(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Return a copy of the value under `key`, whatever its JSON type.
    ///
    /// Only a missing key is an error; `null` is returned as is.
    fn require(&self, key: &str) -> Result<Value, Error> {
        self.get(key)
            .cloned()
            .ok_or_else(|| Error::InvalidEvent(format!("missing field `{}`", key)))
    }
}
