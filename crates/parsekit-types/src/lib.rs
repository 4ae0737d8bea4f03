//! Foundation types for parsekit.
//!
//! Every backend adapter and the client facade speak in terms of the types
//! defined here, so an object saved through the REST server looks the same as
//! one saved into a document or key-value store.
//!
//! # Key Types
//!
//! - [`ParseObject`]: a persisted entity: id, class name, opaque fields
//! - [`ObjectId`]: opaque string identifier, empty until first save
//! - [`IdScheme`]: how an adapter mints identifiers
//! - [`Query`]: backend-agnostic filter/sort/projection request
//! - [`ParseUser`]: an authenticable principal built on [`ParseObject`]
//! - [`ObjectBackend`]: the capability trait every adapter implements

pub mod acl;
pub mod backend;
pub mod error;
pub mod id;
pub mod object;
pub mod query;
pub mod user;
pub mod value;

pub use acl::{Acl, AccessRule};
pub use backend::{BackendKind, ObjectBackend};
pub use error::{TypeError, TypeResult};
pub use id::{IdScheme, ObjectId};
pub use object::ParseObject;
pub use query::Query;
pub use user::ParseUser;
pub use value::{Fields, Value};
