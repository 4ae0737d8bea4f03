use std::fmt;

use crate::id::ObjectId;
use crate::object::ParseObject;
use crate::value::{Fields, Value};

/// Class name the server reserves for users.
pub const USER_CLASS: &str = "_User";

/// An authenticable principal.
///
/// Holds a [`ParseObject`] of class `_User` plus the credential fields the
/// sign-up endpoint needs. Object behaviour is reached through
/// [`object`](Self::object) / [`object_mut`](Self::object_mut).
#[derive(Clone, PartialEq)]
pub struct ParseUser {
    object: ParseObject,
    username: String,
    password: String,
    email: String,
    session_token: Option<String>,
}

impl ParseUser {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            object: ParseObject::new(USER_CLASS, Fields::new()),
            username: username.into(),
            password: password.into(),
            email: email.into(),
            session_token: None,
        }
    }

    pub fn object(&self) -> &ParseObject {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut ParseObject {
        &mut self.object
    }

    pub fn object_id(&self) -> &ObjectId {
        self.object.object_id()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn set_session_token(&mut self, token: impl Into<String>) {
        self.session_token = Some(token.into());
    }

    /// Returns `true` once a session token has been issued.
    pub fn is_authenticated(&self) -> bool {
        self.session_token.is_some()
    }

    /// JSON body for the sign-up request: custom fields plus credentials.
    /// Empty credentials are left out.
    pub fn sign_up_body(&self) -> Fields {
        let mut body = self.object.fields().clone();
        for (key, value) in [
            ("username", &self.username),
            ("password", &self.password),
            ("email", &self.email),
        ] {
            if !value.is_empty() {
                body.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        if let Some(acl) = self.object.acl() {
            if let Ok(acl) = serde_json::to_value(acl) {
                body.insert("ACL".to_string(), acl);
            }
        }
        body
    }
}

impl fmt::Debug for ParseUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseUser")
            .field("object", &self.object)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
