use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::value::{Fields, Value};

/// A backend-agnostic query against one class.
///
/// `where` constraints map a field name to a value. Plain values mean
/// equality; operator objects such as `{"$gt": 5}` are opaque here and
/// forwarded verbatim to backends that understand them. `limit` and `skip`
/// use zero for "unbounded" and "none". `order`, `keys` and `include` are
/// comma-separated directives only the REST server interprets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    class_name: String,
    #[serde(rename = "where", default)]
    constraints: Fields,
    #[serde(default)]
    limit: u32,
    #[serde(default)]
    skip: u32,
    #[serde(default)]
    order: String,
    #[serde(default)]
    keys: String,
    #[serde(default)]
    include: String,
}

impl Query {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    /// Require `key` to equal `value`.
    pub fn equal_to(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_constraint(key, value)
    }

    /// Attach a raw constraint (plain value or operator object) to `key`.
    pub fn with_constraint(mut self, key: impl Into<String>, constraint: impl Into<Value>) -> Self {
        self.constraints.insert(key.into(), constraint.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    pub fn with_keys(mut self, keys: impl Into<String>) -> Self {
        self.keys = keys.into();
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = include.into();
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn constraints(&self) -> &Fields {
        &self.constraints
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn skip(&self) -> u32 {
        self.skip
    }

    pub fn order(&self) -> &str {
        &self.order
    }

    pub fn keys(&self) -> &str {
        &self.keys
    }

    pub fn include(&self) -> &str {
        &self.include
    }

    /// Encode as REST query-string parameters.
    ///
    /// `where` becomes one JSON-encoded parameter; the rest are sent
    /// individually. Anything at its zero or empty value is omitted, so an
    /// unconstrained query yields no parameters at all.
    pub fn to_params(&self) -> TypeResult<Vec<(&'static str, String)>> {
        let mut params = Vec::new();
        if !self.constraints.is_empty() {
            let encoded = serde_json::to_string(&self.constraints)
                .map_err(|e| TypeError::QueryEncoding(e.to_string()))?;
            params.push(("where", encoded));
        }
        if self.limit > 0 {
            params.push(("limit", self.limit.to_string()));
        }
        if self.skip > 0 {
            params.push(("skip", self.skip.to_string()));
        }
        for (name, value) in [("order", &self.order), ("keys", &self.keys), ("include", &self.include)] {
            if !value.is_empty() {
                params.push((name, value.clone()));
            }
        }
        Ok(params)
    }

    /// Equality match of every constraint against `data`.
    ///
    /// Used by backends without a native query language. A dotted key such
    /// as `"address.city"` is a path into nested objects, the same reading a
    /// document database gives it, so every backend returns the same rows.
    /// Operator objects are compared as plain values.
    pub fn matches(&self, data: &Fields) -> bool {
        self.constraints
            .iter()
            .all(|(key, expected)| field_at_path(data, key) == Some(expected))
    }

    /// Apply `skip` then `limit` to an already filtered result set.
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.skip as usize);
        if self.limit > 0 {
            iter.take(self.limit as usize).collect()
        } else {
            iter.collect()
        }
    }
}

/// Resolve a dotted path through nested objects.
fn field_at_path<'a>(data: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = data.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::fields_from;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn unconstrained_query_has_no_params() {
        let q = Query::new("Note");
        assert!(q.to_params().unwrap().is_empty());
    }

    #[test]
    fn all_params_encoded() {
        let q = Query::new("GameScore")
            .equal_to("playerName", "Sean Plott")
            .with_limit(10)
            .with_skip(20)
            .with_order("-score,createdAt")
            .with_keys("score,playerName")
            .with_include("game");
        let params = q.to_params().unwrap();
        assert_eq!(
            params,
            vec![
                ("where", r#"{"playerName":"Sean Plott"}"#.to_string()),
                ("limit", "10".to_string()),
                ("skip", "20".to_string()),
                ("order", "-score,createdAt".to_string()),
                ("keys", "score,playerName".to_string()),
                ("include", "game".to_string()),
            ]
        );
    }

    #[test]
    fn operator_constraints_forwarded_verbatim() {
        let q = Query::new("GameScore").with_constraint("score", json!({"$gte": 1000}));
        let params = q.to_params().unwrap();
        assert_eq!(params, vec![("where", r#"{"score":{"$gte":1000}}"#.to_string())]);
    }

    #[test]
    fn dotted_constraint_reads_nested_field() {
        let data = fields_from([
            ("address", json!({"city": "Lisbon", "zip": "1100"})),
            ("name", json!("x")),
        ]);
        assert!(Query::new("P").equal_to("address.city", "Lisbon").matches(&data));
        assert!(!Query::new("P").equal_to("address.city", "Porto").matches(&data));
        assert!(!Query::new("P").equal_to("name.first", "x").matches(&data));
        assert!(!Query::new("P").equal_to("address.street", "y").matches(&data));
    }

    #[test]
    fn matches_is_equality_on_every_constraint() {
        let q = Query::new("Note").equal_to("text", "hi").equal_to("n", 1);
        assert!(q.matches(&fields_from([("text", json!("hi")), ("n", json!(1)), ("x", json!(0))])));
        assert!(!q.matches(&fields_from([("text", json!("hi"))])));
        assert!(!q.matches(&fields_from([("text", json!("hi")), ("n", json!(2))])));
        assert!(Query::new("Note").matches(&Fields::new()));
    }

    #[test]
    fn window_applies_skip_then_limit() {
        let q = Query::new("N").with_skip(2).with_limit(3);
        assert_eq!(q.window(0..10), vec![2, 3, 4]);
        assert_eq!(Query::new("N").window(0..4), vec![0, 1, 2, 3]);
        assert_eq!(Query::new("N").with_skip(9).window(0..4), Vec::<i32>::new());
    }

    #[test]
    fn where_serializes_under_where_key() {
        let q = Query::new("Note").equal_to("a", 1);
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["where"], json!({"a": 1}));
        assert_eq!(v["className"], json!("Note"));
    }

    proptest! {
        #[test]
        fn zero_values_never_emitted(limit in 0u32..5, skip in 0u32..5) {
            let q = Query::new("N").with_limit(limit).with_skip(skip);
            let params = q.to_params().unwrap();
            prop_assert_eq!(params.iter().any(|(k, _)| *k == "limit"), limit > 0);
            prop_assert_eq!(params.iter().any(|(k, _)| *k == "skip"), skip > 0);
            prop_assert!(params.iter().all(|(k, _)| *k != "where"));
        }
    }
}
