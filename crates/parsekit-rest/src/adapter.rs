use async_trait::async_trait;
use parsekit_types::object::timestamp_field;
use parsekit_types::{BackendKind, Fields, ObjectBackend, ObjectId, ParseObject, Query, Value};
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::client::RestClient;
use crate::error::{RestError, RestResult};
use crate::reply::Reply;

/// Persists objects through the server's `/classes` resources.
///
/// Ids and timestamps come from the server. On create the reply's
/// `objectId` fills the empty id; on update any `objectId` in the reply is
/// ignored so a saved object's id never changes.
#[derive(Clone, Debug)]
pub struct RestAdapter {
    client: RestClient,
}

impl RestAdapter {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    fn object_body(object: &ParseObject) -> RestResult<Fields> {
        let mut body = object.fields().clone();
        if let Some(acl) = object.acl() {
            let acl = serde_json::to_value(acl).map_err(|e| RestError::Encode(e.to_string()))?;
            body.insert("ACL".into(), acl);
        }
        Ok(body)
    }
}

/// Error for a reply whose status is not an accepted success.
pub(crate) fn server_error(reply: &Reply) -> RestError {
    let (code, message) = reply.error_details();
    warn!(status = %reply.status, ?code, %message, "server rejected request");
    RestError::Server {
        status: reply.status,
        code,
        message,
    }
}

/// Read `createdAt` / `updatedAt` from a success reply onto `object`.
/// Malformed values are logged and skipped.
pub(crate) fn apply_reply_timestamps(object: &mut ParseObject, reply: &Fields) {
    let created_at = timestamp_field(reply, "createdAt");
    // A fresh object has not been updated since it was created.
    let updated_at = timestamp_field(reply, "updatedAt").or(created_at);
    object.apply_timestamps(created_at, updated_at);
}

/// The id carried by a create reply.
pub(crate) fn reply_object_id(reply: &Fields) -> RestResult<ObjectId> {
    match reply.get("objectId") {
        Some(Value::String(id)) if !id.is_empty() => Ok(ObjectId::from(id.as_str())),
        _ => Err(RestError::Decode("create reply lacks objectId".into())),
    }
}

#[async_trait]
impl ObjectBackend for RestAdapter {
    type Error = RestError;

    fn kind(&self) -> BackendKind {
        BackendKind::Rest
    }

    async fn save(&self, object: &mut ParseObject) -> RestResult<()> {
        let creating = object.is_new();
        let (method, url) = if creating {
            (Method::POST, self.client.endpoint(&["classes", object.class_name()])?)
        } else {
            (
                Method::PUT,
                self.client
                    .endpoint(&["classes", object.class_name(), object.object_id().as_str()])?,
            )
        };
        let body = Self::object_body(object)?;
        let reply = self.client.send_json(method, url, &body).await?;
        if !reply.status.is_success() {
            return Err(server_error(&reply));
        }

        let fields = reply.object().map_err(RestError::Decode)?;
        // The row exists once the server answers, so the id is taken before
        // anything else in the reply is read.
        if creating {
            object.assign_id(reply_object_id(&fields)?)?;
        }
        apply_reply_timestamps(object, &fields);
        debug!(
            class = object.class_name(),
            object_id = %object.object_id(),
            creating,
            "saved object"
        );
        Ok(())
    }

    async fn delete(&self, object: &ParseObject) -> RestResult<()> {
        if object.is_new() {
            return Err(RestError::MissingObjectId {
                class: object.class_name().to_string(),
            });
        }
        let url = self
            .client
            .endpoint(&["classes", object.class_name(), object.object_id().as_str()])?;
        let reply = self.client.send(Method::DELETE, url, &[]).await?;
        if !reply.status.is_success() {
            return Err(server_error(&reply));
        }
        debug!(class = object.class_name(), object_id = %object.object_id(), "deleted object");
        Ok(())
    }

    async fn find(&self, query: &Query) -> RestResult<Vec<ParseObject>> {
        let url = self.client.endpoint(&["classes", query.class_name()])?;
        let params = query.to_params()?;
        let reply = self.client.send(Method::GET, url, &params).await?;
        if reply.status != StatusCode::OK {
            return Err(server_error(&reply));
        }

        // A reply without a `results` array is an empty result, not an error.
        let body = reply.json().map_err(RestError::Decode)?;
        let Some(Value::Array(results)) = body.get("results") else {
            debug!(class = query.class_name(), "reply has no results list");
            return Ok(Vec::new());
        };
        let objects = results
            .iter()
            .filter_map(|entry| entry.as_object().cloned())
            .map(|raw| ParseObject::from_server_fields(query.class_name(), raw))
            .collect::<Vec<_>>();
        debug!(class = query.class_name(), count = objects.len(), "found objects");
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RestConfig;
    use parsekit_types::value::fields_from;
    use parsekit_types::Acl;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, RestAdapter) {
        let server = MockServer::start().await;
        let config = RestConfig::new(format!("{}/parse", server.uri()), "app-id", "rest-key");
        let adapter = RestAdapter::new(RestClient::new(&config).unwrap());
        (server, adapter)
    }

    fn note(text: &str) -> ParseObject {
        ParseObject::new("Note", fields_from([("text", json!(text))]))
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn create_posts_fields_and_reads_id() {
        let (server, adapter) = setup().await;
        Mock::given(method("POST"))
            .and(path("/parse/classes/Note"))
            .and(header("X-Parse-Application-Id", "app-id"))
            .and(header("X-Parse-REST-API-Key", "rest-key"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"text": "hi"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "objectId": "Ed1nuqPvcm",
                "createdAt": "2011-08-20T02:06:57.931Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut obj = note("hi");
        adapter.save(&mut obj).await.unwrap();
        assert_eq!(obj.object_id().as_str(), "Ed1nuqPvcm");
        assert!(obj.created_at().is_some());
        assert_eq!(obj.updated_at(), obj.created_at());
    }

    #[tokio::test]
    async fn create_sends_acl() {
        let (server, adapter) = setup().await;
        Mock::given(method("POST"))
            .and(path("/parse/classes/Note"))
            .and(body_json(json!({"text": "hi", "ACL": {"*": {"read": true}}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"objectId": "x"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut obj = note("hi");
        obj.set_acl(Some(Acl::public_read()));
        adapter.save(&mut obj).await.unwrap();
        assert_eq!(obj.object_id().as_str(), "x");
    }

    #[tokio::test]
    async fn update_puts_to_object_path_and_keeps_id() {
        let (server, adapter) = setup().await;
        Mock::given(method("PUT"))
            .and(path("/parse/classes/Note/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objectId": "someone-else",
                "updatedAt": "2011-08-21T18:02:52.248Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut obj = ParseObject::with_id("Note", "abc123", Fields::new());
        adapter.save(&mut obj).await.unwrap();
        assert_eq!(obj.object_id().as_str(), "abc123");
        assert!(obj.updated_at().is_some());
        assert!(obj.created_at().is_none());
    }

    #[tokio::test]
    async fn create_reply_without_id_is_decode_error() {
        let (server, adapter) = setup().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .mount(&server)
            .await;

        let mut obj = note("hi");
        let err = adapter.save(&mut obj).await.unwrap_err();
        assert!(matches!(err, RestError::Decode(_)));
        assert!(obj.is_new());
    }

    #[tokio::test]
    async fn bad_created_at_still_records_id() {
        let (server, adapter) = setup().await;
        Mock::given(method("POST"))
            .and(path("/parse/classes/Note"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "objectId": "srv1",
                "createdAt": "not-a-time"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/parse/classes/Note/srv1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut obj = note("hi");
        adapter.save(&mut obj).await.unwrap();
        assert_eq!(obj.object_id().as_str(), "srv1");
        assert!(obj.created_at().is_none());

        // A second save updates the same row instead of creating another.
        adapter.save(&mut obj).await.unwrap();
        assert_eq!(obj.object_id().as_str(), "srv1");
    }

    #[tokio::test]
    async fn find_keeps_rows_with_bad_timestamps() {
        let (server, adapter) = setup().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"objectId": "a", "createdAt": "garbage"},
                    {"objectId": "b", "createdAt": "2024-01-01T00:00:00Z"}
                ]
            })))
            .mount(&server)
            .await;

        let found = adapter.find(&Query::new("Note")).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].created_at().is_none());
        assert!(found[1].created_at().is_some());
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let (server, adapter) = setup().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = adapter.save(&mut note("hi")).await.unwrap_err();
        assert!(matches!(err, RestError::Decode(_)));
    }

    #[tokio::test]
    async fn rejected_save_reports_status_and_message() {
        let (server, adapter) = setup().await;
        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"code": 101, "error": "Object not found."})),
            )
            .mount(&server)
            .await;

        let mut obj = ParseObject::with_id("Note", "gone", Fields::new());
        let err = adapter.save(&mut obj).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "404 Not Found: Object not found.");
        assert!(matches!(err, RestError::Server { code: Some(101), .. }));
        assert_eq!(obj.object_id().as_str(), "gone");
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delete_hits_object_path() {
        let (server, adapter) = setup().await;
        Mock::given(method("DELETE"))
            .and(path("/parse/classes/Note/abc123"))
            .and(header("X-Parse-Application-Id", "app-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let obj = ParseObject::with_id("Note", "abc123", Fields::new());
        adapter.delete(&obj).await.unwrap();
        assert_eq!(obj.object_id().as_str(), "abc123");
    }

    #[tokio::test]
    async fn delete_failure_is_error() {
        let (server, adapter) = setup().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "unauthorized"})))
            .mount(&server)
            .await;

        let obj = ParseObject::with_id("Note", "abc123", Fields::new());
        let err = adapter.delete(&obj).await.unwrap_err();
        assert_eq!(err.to_string(), "403 Forbidden: unauthorized");
    }

    #[tokio::test]
    async fn delete_unsaved_sends_nothing() {
        let (server, adapter) = setup().await;
        let err = adapter.delete(&note("x")).await.unwrap_err();
        assert!(matches!(err, RestError::MissingObjectId { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Find
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn unconstrained_find_sends_no_query_string() {
        let (server, adapter) = setup().await;
        Mock::given(method("GET"))
            .and(path("/parse/classes/Note"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"objectId": "a", "text": "one", "createdAt": "2024-01-01T00:00:00Z"},
                    {"objectId": "b", "text": "two"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = adapter.find(&Query::new("Note")).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].object_id().as_str(), "a");
        assert_eq!(found[0].get("text"), Some(&json!("one")));
        assert!(found[0].created_at().is_some());
        assert!(found.iter().all(|o| o.class_name() == "Note"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn find_encodes_every_directive() {
        let (server, adapter) = setup().await;
        Mock::given(method("GET"))
            .and(path("/parse/classes/GameScore"))
            .and(query_param("where", r#"{"playerName":"Sean Plott"}"#))
            .and(query_param("limit", "10"))
            .and(query_param("skip", "5"))
            .and(query_param("order", "-score"))
            .and(query_param("keys", "score"))
            .and(query_param("include", "game"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let query = Query::new("GameScore")
            .equal_to("playerName", "Sean Plott")
            .with_limit(10)
            .with_skip(5)
            .with_order("-score")
            .with_keys("score")
            .with_include("game");
        assert!(adapter.find(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_without_results_key_is_empty() {
        let (server, adapter) = setup().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 3})))
            .mount(&server)
            .await;

        assert!(adapter.find(&Query::new("Note")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_skips_non_object_entries() {
        let (server, adapter) = setup().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": [1, {"objectId": "a"}, "x"]})),
            )
            .mount(&server)
            .await;

        let found = adapter.find(&Query::new("Note")).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn find_with_unparseable_body_is_decode_error() {
        let (server, adapter) = setup().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = adapter.find(&Query::new("Note")).await.unwrap_err();
        assert!(matches!(err, RestError::Decode(_)));
    }

    #[tokio::test]
    async fn find_non_200_is_error() {
        let (server, adapter) = setup().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": 102, "error": "Invalid key name"})),
            )
            .mount(&server)
            .await;

        let err = adapter.find(&Query::new("Note")).await.unwrap_err();
        assert_eq!(err.to_string(), "400 Bad Request: Invalid key name");
    }

    #[tokio::test]
    async fn server_timeout_surfaces_as_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(500))
                    .set_body_json(json!({"results": []})),
            )
            .mount(&server)
            .await;
        let config = RestConfig::new(server.uri(), "a", "k")
            .with_timeout(std::time::Duration::from_millis(50));
        let adapter = RestAdapter::new(RestClient::new(&config).unwrap());

        let err = adapter.find(&Query::new("Note")).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
