//! Field values.
//!
//! Fields are deliberately schemaless. Anything JSON can represent is
//! accepted, which keeps serialization well defined for every backend.

pub use serde_json::Value;

/// Field name to value mapping carried by every object.
pub type Fields = serde_json::Map<String, Value>;

/// Build a [`Fields`] map from `(name, value)` pairs.
pub fn fields_from<I, K, V>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_from_pairs() {
        let f = fields_from([("text", json!("hi")), ("count", json!(3))]);
        assert_eq!(f.len(), 2);
        assert_eq!(f["text"], json!("hi"));
        assert_eq!(f["count"], json!(3));
    }

    #[test]
    fn nested_values_survive_roundtrip() {
        let f = fields_from([("nested", json!({"a": [1, true, null, {"b": "c"}]}))]);
        let text = serde_json::to_string(&f).unwrap();
        let back: Fields = serde_json::from_str(&text).unwrap();
        assert_eq!(back, f);
    }
}
