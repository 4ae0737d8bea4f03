//! REST resource adapter for parsekit.
//!
//! Talks to a Parse-compatible object server:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create    | `POST /classes/{className}` |
//! | update    | `PUT /classes/{className}/{objectId}` |
//! | delete    | `DELETE /classes/{className}/{objectId}` |
//! | find      | `GET /classes/{className}?where=…&limit=…` |
//! | sign-up   | `POST /users` |
//!
//! Every request carries the application id and REST key headers. Non-2xx
//! replies surface as [`RestError::Server`] with the server's `error`
//! message; transport failures are passed through untouched.

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod users;

mod reply;

pub use adapter::RestAdapter;
pub use client::RestClient;
pub use config::RestConfig;
pub use error::{RestError, RestResult};
