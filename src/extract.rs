//! Ordered response-shape probing.
//!
//! Services answer the same call with slightly different JSON shapes. Each
//! accepted shape is a [`Strategy`]: a named, pure function from the parsed
//! body to an optional value. Strategies are tried in priority order and the
//! first hit wins.

use serde_json::Value;

#[derive(Clone, Copy)]
pub struct Strategy<T> {
    pub name: &'static str,
    pub probe: fn(&Value) -> Option<T>,
}

impl<T> std::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// Runs `strategies` in order and returns the first value found together with
/// the name of the strategy that produced it.
#[must_use]
pub fn first_match<T>(strategies: &[Strategy<T>], body: &Value) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|strategy| (strategy.probe)(body).map(|value| (strategy.name, value)))
}

/// Parses `body` as JSON and probes it; unparseable bodies yield `None`.
#[must_use]
pub fn probe_body<T>(strategies: &[Strategy<T>], body: &str) -> Option<(&'static str, T)> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    first_match(strategies, &parsed)
}

/// Follows `path` through nested objects.
#[must_use]
pub fn at_path<'body>(body: &'body Value, path: &[&str]) -> Option<&'body Value> {
    path.iter()
        .try_fold(body, |current, segment| current.get(*segment))
}

/// Non-empty string at `path`.
#[must_use]
pub fn non_empty_string(body: &Value, path: &[&str]) -> Option<String> {
    at_path(body, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Array at `path`.
#[must_use]
pub fn array_at(body: &Value, path: &[&str]) -> Option<Vec<Value>> {
    at_path(body, path).and_then(Value::as_array).cloned()
}
