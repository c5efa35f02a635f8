//! Mailbox endpoints.

use crate::Result;
use crate::client::{Client, MAILBOXES_PATH, Transport};
use crate::models::{Mailbox, MailboxList, NewMailbox, NewMailboxPayload};
use reqwest::Method;
use serde::de::IgnoredAny;

impl<X: Transport> Client<X> {
    /// List every mailbox on the domain.
    ///
    /// This is also the call used to verify credentials when a client is built.
    pub async fn list_mailboxes(&self) -> Result<Vec<Mailbox>> {
        let request = self
            .scoped_builder()
            .method(Method::GET)
            .add_path(MAILBOXES_PATH)
            .build()?;

        let list: MailboxList = self.execute(request).await?;
        Ok(list.mailboxes)
    }

    /// Fetch a single mailbox by its local part.
    pub async fn get_mailbox(&self, local_part: &str) -> Result<Mailbox> {
        let request = self
            .scoped_builder()
            .method(Method::GET)
            .add_restful_path(MAILBOXES_PATH, local_part)
            .build()?;

        self.execute(request).await
    }

    /// Create a mailbox.
    pub async fn create_mailbox(&self, mailbox: &NewMailbox) -> Result<Mailbox> {
        let request = self
            .scoped_builder()
            .method(Method::POST)
            .add_path(MAILBOXES_PATH)
            .json_content_type()
            .body_json(&NewMailboxPayload::from(mailbox))
            .build()?;

        self.execute(request).await
    }

    /// Replace the mailbox `local_part` with the contents of `mailbox`.
    pub async fn update_mailbox(&self, local_part: &str, mailbox: &Mailbox) -> Result<Mailbox> {
        let request = self
            .scoped_builder()
            .method(Method::PUT)
            .add_restful_path(MAILBOXES_PATH, local_part)
            .json_content_type()
            .body_json(mailbox)
            .build()?;

        self.execute(request).await
    }

    /// Delete the mailbox `local_part`.
    pub async fn delete_mailbox(&self, local_part: &str) -> Result<()> {
        let request = self
            .scoped_builder()
            .method(Method::DELETE)
            .add_restful_path(MAILBOXES_PATH, local_part)
            .build()?;

        self.execute::<IgnoredAny>(request).await?;
        Ok(())
    }
}
