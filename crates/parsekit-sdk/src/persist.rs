use async_trait::async_trait;
use parsekit_types::{ParseObject, ParseUser};

use crate::client::Client;
use crate::error::SdkResult;

/// Persistence for values that can save and delete themselves.
///
/// Both methods hand the value to the [`Client`]; the backend decides how
/// it is stored.
#[async_trait]
pub trait Persist {
    async fn save(&mut self, client: &Client) -> SdkResult<()>;

    async fn delete(&self, client: &Client) -> SdkResult<()>;
}

#[async_trait]
impl Persist for ParseObject {
    async fn save(&mut self, client: &Client) -> SdkResult<()> {
        client.save(self).await
    }

    async fn delete(&self, client: &Client) -> SdkResult<()> {
        client.delete(self).await
    }
}

/// Saving a user updates its profile fields. New accounts go through
/// [`Client::sign_up`].
#[async_trait]
impl Persist for ParseUser {
    async fn save(&mut self, client: &Client) -> SdkResult<()> {
        client.save(self.object_mut()).await
    }

    async fn delete(&self, client: &Client) -> SdkResult<()> {
        client.delete(self.object()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parsekit_store::{InMemoryDocumentStore, StoreConfig};
    use parsekit_types::value::fields_from;
    use parsekit_types::Query;
    use serde_json::json;

    #[tokio::test]
    async fn object_saves_and_deletes_itself() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let client = Client::document(store.clone(), StoreConfig::default());

        let mut obj = ParseObject::new("Note", fields_from([("text", json!("hi"))]));
        obj.save(&client).await.unwrap();
        assert!(!obj.is_new());

        let id = obj.object_id().clone();
        obj.set("text", "edited");
        obj.save(&client).await.unwrap();
        assert_eq!(obj.object_id(), &id);
        assert_eq!(store.write_count(), 2);

        let found = client.find(&Query::new("Note")).await.unwrap();
        assert_eq!(found[0].get("text"), Some(&json!("edited")));

        Persist::delete(&obj, &client).await.unwrap();
        assert!(client.find(&Query::new("Note")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_saves_through_its_object() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let client = Client::document(store.clone(), StoreConfig::default());

        let mut user = ParseUser::new("u", "p", "u@example.com");
        user.object_mut().set("nickname", "you");
        user.save(&client).await.unwrap();
        assert!(!user.object().is_new());

        let found = client.find(&Query::new("_User")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("nickname"), Some(&json!("you")));
        assert_eq!(found[0].get("password"), None);
    }
}
