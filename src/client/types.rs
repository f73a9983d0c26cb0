//! Response types of the variant annotation service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error text the service uses to signal an exhausted scroll cursor.
pub const NO_MORE_RESULTS: &str = "No results to return";

/// One annotation record.
///
/// Records are free-form JSON objects. The keys the client relies on are
/// `_id` (the canonical variant id), `query` (the input term a batch hit
/// answers) and `notfound` (set when a term matched nothing).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hit(pub Map<String, Value>);

impl Hit {
    /// Canonical variant id (`_id`).
    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(Value::as_str)
    }

    /// The input term this hit answers, if echoed by the service.
    ///
    /// Numeric terms are rendered as strings.
    pub fn query(&self) -> Option<String> {
        match self.0.get("query")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Whether the service marked this term as not found.
    pub fn is_notfound(&self) -> bool {
        self.0.get("notfound").is_some_and(is_truthy)
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a nested field by dotted path, e.g. `cadd.phred`.
    ///
    /// ```
    /// use ferro_myvariant::client::Hit;
    /// use serde_json::json;
    ///
    /// let hit: Hit = serde_json::from_value(json!({"cadd": {"phred": 23.5}})).unwrap();
    /// assert_eq!(hit.get_path("cadd.phred"), Some(&json!(23.5)));
    /// assert_eq!(hit.get_path("cadd.raw"), None);
    /// ```
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Hit {
    fn from(map: Map<String, Value>) -> Self {
        Hit(map)
    }
}

/// Truthiness of a JSON value, as the service's clients interpret flags.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// One page of a search (`/query`) response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Matching records, in server order.
    #[serde(default)]
    pub hits: Vec<Hit>,
    /// Total number of matches for the query.
    #[serde(default)]
    pub total: u64,
    /// Best match score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    /// Server time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub took: Option<u64>,
    /// Scroll cursor for the next page.
    #[serde(
        rename = "_scroll_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cursor: Option<String>,
    /// Error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Non-fatal warning, e.g. an expiring cursor.
    #[serde(rename = "_warning", default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Explicit success flag; absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl QueryResponse {
    /// True if this page carries the "no more results" sentinel.
    pub fn is_exhausted(&self) -> bool {
        self.error.as_deref() == Some(NO_MORE_RESULTS)
    }

    /// Error text other than the "no more results" sentinel.
    pub fn failure(&self) -> Option<&str> {
        match self.error.as_deref() {
            Some(NO_MORE_RESULTS) => None,
            Some(err) => Some(err),
            None if self.success == Some(false) => Some("request was not successful"),
            None => None,
        }
    }
}
