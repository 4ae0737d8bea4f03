use parsekit_types::{Fields, Value};
use reqwest::StatusCode;

/// A fully read server response.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    body: String,
}

impl Reply {
    pub fn new(status: StatusCode, body: String) -> Self {
        Self { status, body }
    }

    /// Parse the body as JSON. An empty body reads as `{}`.
    pub fn json(&self) -> Result<Value, String> {
        if self.body.trim().is_empty() {
            return Ok(Value::Object(Fields::new()));
        }
        serde_json::from_str(&self.body).map_err(|e| e.to_string())
    }

    /// Parse the body as a JSON object.
    pub fn object(&self) -> Result<Fields, String> {
        match self.json()? {
            Value::Object(map) => Ok(map),
            other => Err(format!("expected a JSON object, got {}", kind_of(&other))),
        }
    }

    /// `(code, message)` from an error body `{"code": …, "error": …}`.
    /// Falls back to the raw body when it is not in that shape.
    pub fn error_details(&self) -> (Option<i64>, String) {
        let parsed = self.object().ok();
        let code = parsed.as_ref().and_then(|m| m.get("code")).and_then(Value::as_i64);
        let message = match parsed.as_ref().and_then(|m| m.get("error")) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => self.body.trim().to_string(),
        };
        (code, message)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_details_from_server_shape() {
        let r = Reply::new(
            StatusCode::NOT_FOUND,
            r#"{"code":101,"error":"Object not found."}"#.into(),
        );
        assert_eq!(r.error_details(), (Some(101), "Object not found.".to_string()));
    }

    #[test]
    fn error_details_fall_back_to_raw_body() {
        let r = Reply::new(StatusCode::BAD_GATEWAY, "upstream down\n".into());
        assert_eq!(r.error_details(), (None, "upstream down".to_string()));
    }

    #[test]
    fn empty_body_is_empty_object() {
        let r = Reply::new(StatusCode::OK, String::new());
        assert!(r.object().unwrap().is_empty());
    }

    #[test]
    fn non_object_body_rejected() {
        let r = Reply::new(StatusCode::OK, "[1,2]".into());
        assert_eq!(r.object().unwrap_err(), "expected a JSON object, got array");
    }
}
