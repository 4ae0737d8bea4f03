//! Account endpoints.

use parsekit_types::{ParseUser, Value};
use reqwest::{Method, StatusCode};
use tracing::info;

use crate::adapter::{apply_reply_timestamps, reply_object_id, server_error, RestAdapter};
use crate::error::{RestError, RestResult};

impl RestAdapter {
    /// Register `user` with the server.
    ///
    /// On `201 Created` the user receives its object id, creation time and
    /// session token. A user that already has an id is rejected by the
    /// server, not here.
    pub async fn sign_up(&self, user: &mut ParseUser) -> RestResult<()> {
        let url = self.client().endpoint(&["users"])?;
        let reply = self
            .client()
            .send_json(Method::POST, url, &user.sign_up_body())
            .await?;
        if reply.status != StatusCode::CREATED {
            return Err(server_error(&reply));
        }

        let fields = reply.object().map_err(RestError::Decode)?;
        user.object_mut().assign_id(reply_object_id(&fields)?)?;
        apply_reply_timestamps(user.object_mut(), &fields);
        if let Some(Value::String(token)) = fields.get("sessionToken") {
            user.set_session_token(token.as_str());
        }
        info!(username = user.username(), object_id = %user.object_id(), "signed up user");
        Ok(())
    }
}
