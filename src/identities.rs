//! Identity endpoints, nested under a mailbox.

use crate::Result;
use crate::client::{Client, IDENTITIES_PATH, MAILBOXES_PATH, Transport};
use crate::models::{Identity, IdentityList, NewIdentityPayload};
use crate::request::RequestBuilder;
use reqwest::Method;
use serde::de::IgnoredAny;

impl<X: Transport> Client<X> {
    fn identities_builder(&self, method: Method, mailbox: &str) -> RequestBuilder<'_> {
        self.scoped_builder()
            .method(method)
            .add_restful_path(MAILBOXES_PATH, mailbox)
            .add_path(IDENTITIES_PATH)
    }

    /// List the identities of `mailbox`.
    pub async fn list_identities(&self, mailbox: &str) -> Result<Vec<Identity>> {
        let request = self.identities_builder(Method::GET, mailbox).build()?;

        let list: IdentityList = self.execute(request).await?;
        Ok(list.identities)
    }

    /// Fetch one identity of `mailbox` by its local part.
    pub async fn get_identity(&self, mailbox: &str, local_part: &str) -> Result<Identity> {
        let request = self
            .identities_builder(Method::GET, mailbox)
            .add_path(local_part)
            .build()?;

        self.execute(request).await
    }

    /// Create the identity `local_part` on `mailbox` with a display name.
    pub async fn create_identity(
        &self,
        mailbox: &str,
        local_part: &str,
        display_name: &str,
    ) -> Result<Identity> {
        let request = self
            .identities_builder(Method::POST, mailbox)
            .json_content_type()
            .body_json(&NewIdentityPayload {
                local_part,
                name: display_name,
            })
            .build()?;

        self.execute(request).await
    }

    /// Replace the identity `local_part` of `mailbox` with `identity`.
    pub async fn update_identity(
        &self,
        mailbox: &str,
        local_part: &str,
        identity: &Identity,
    ) -> Result<Identity> {
        let request = self
            .identities_builder(Method::PUT, mailbox)
            .add_path(local_part)
            .json_content_type()
            .body_json(identity)
            .build()?;

        self.execute(request).await
    }

    /// Delete the identity `local_part` of `mailbox`.
    pub async fn delete_identity(&self, mailbox: &str, local_part: &str) -> Result<()> {
        let request = self
            .identities_builder(Method::DELETE, mailbox)
            .add_path(local_part)
            .build()?;

        self.execute::<IgnoredAny>(request).await?;
        Ok(())
    }
}
