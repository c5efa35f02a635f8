//! Alias endpoints.

use crate::Result;
use crate::client::{ALIASES_PATH, Client, Transport};
use crate::models::{Alias, AliasList, AliasPayload};
use reqwest::Method;
use serde::de::IgnoredAny;

impl<X: Transport> Client<X> {
    /// List every alias on the domain.
    pub async fn list_aliases(&self) -> Result<Vec<Alias>> {
        let request = self
            .scoped_builder()
            .method(Method::GET)
            .add_path(ALIASES_PATH)
            .build()?;

        let list: AliasList = self.execute(request).await?;
        Ok(list.address_aliases)
    }

    /// Fetch a single alias by its local part.
    pub async fn get_alias(&self, local_part: &str) -> Result<Alias> {
        let request = self
            .scoped_builder()
            .method(Method::GET)
            .add_restful_path(ALIASES_PATH, local_part)
            .build()?;

        self.execute(request).await
    }

    /// Create `local_part@domain` forwarding to `destinations`.
    ///
    /// # Examples
    /// ```no_run
    /// # use migadu_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), migadu_client::Error> {
    /// let client = Client::new("admin@example.org", "api-key", "example.org").await?;
    /// let alias = client
    ///     .create_alias("info", &["jane@example.org".to_string()])
    ///     .await?;
    /// println!("{}", alias.address);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_alias(&self, local_part: &str, destinations: &[String]) -> Result<Alias> {
        let alias = Alias {
            local_part: local_part.to_string(),
            destinations: destinations.to_vec(),
            ..Default::default()
        };
        let request = self
            .scoped_builder()
            .method(Method::POST)
            .add_path(ALIASES_PATH)
            .json_content_type()
            .body_json(&AliasPayload::from(&alias))
            .build()?;

        self.execute(request).await
    }

    /// Replace the alias `local_part` with the contents of `alias`.
    pub async fn update_alias(&self, local_part: &str, alias: &Alias) -> Result<Alias> {
        let request = self
            .scoped_builder()
            .method(Method::PUT)
            .add_restful_path(ALIASES_PATH, local_part)
            .json_content_type()
            .body_json(&AliasPayload::from(alias))
            .build()?;

        self.execute(request).await
    }

    /// Delete the alias `local_part`.
    pub async fn delete_alias(&self, local_part: &str) -> Result<()> {
        let request = self
            .scoped_builder()
            .method(Method::DELETE)
            .add_restful_path(ALIASES_PATH, local_part)
            .build()?;

        self.execute::<IgnoredAny>(request).await?;
        Ok(())
    }
}
