//! Rewrite rule endpoints.

use crate::Result;
use crate::client::{Client, REWRITES_PATH, Transport};
use crate::models::{Rewrite, RewriteList, RewritePayload};
use reqwest::Method;
use serde::de::IgnoredAny;

impl<X: Transport> Client<X> {
    /// List every rewrite rule on the domain.
    pub async fn list_rewrites(&self) -> Result<Vec<Rewrite>> {
        let request = self
            .scoped_builder()
            .method(Method::GET)
            .add_path(REWRITES_PATH)
            .build()?;

        let list: RewriteList = self.execute(request).await?;
        Ok(list.rewrites)
    }

    /// Fetch a single rewrite by name.
    pub async fn get_rewrite(&self, name: &str) -> Result<Rewrite> {
        let request = self
            .scoped_builder()
            .method(Method::GET)
            .add_restful_path(REWRITES_PATH, name)
            .build()?;

        self.execute(request).await
    }

    /// Create a rewrite sending mail for local parts matching
    /// `local_part_rule` to `destinations`.
    pub async fn create_rewrite(
        &self,
        name: &str,
        local_part_rule: &str,
        destinations: &[String],
    ) -> Result<Rewrite> {
        let rewrite = Rewrite {
            name: name.to_string(),
            local_part_rule: local_part_rule.to_string(),
            destinations: destinations.to_vec(),
            ..Default::default()
        };
        let request = self
            .scoped_builder()
            .method(Method::POST)
            .add_path(REWRITES_PATH)
            .json_content_type()
            .body_json(&RewritePayload::from(&rewrite))
            .build()?;

        self.execute(request).await
    }

    /// Replace the rewrite `name` with the contents of `rewrite`.
    pub async fn update_rewrite(&self, name: &str, rewrite: &Rewrite) -> Result<Rewrite> {
        let request = self
            .scoped_builder()
            .method(Method::PUT)
            .add_restful_path(REWRITES_PATH, name)
            .json_content_type()
            .body_json(&RewritePayload::from(rewrite))
            .build()?;

        self.execute(request).await
    }

    /// Delete the rewrite `name`.
    pub async fn delete_rewrite(&self, name: &str) -> Result<()> {
        let request = self
            .scoped_builder()
            .method(Method::DELETE)
            .add_restful_path(REWRITES_PATH, name)
            .build()?;

        self.execute::<IgnoredAny>(request).await?;
        Ok(())
    }
}
