//! # Migadu Client
//! Asynchronous wrapper around the Migadu administration REST API, providing methods to list, create, update and delete aliases, rewrites, mailboxes and identities of one domain using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust developers automating a Migadu-hosted domain: provisioning mailboxes, keeping forwarding aliases in sync, or scripting one-off admin tasks without the web dashboard.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest` by default; any other stack can be plugged in through the [`Transport`] trait.
//!
//! ## Building requests by hand
//! Every endpoint method is a thin layer over two pieces that are public on their own: [`Client::scoped_builder`] hands out a pooled [`RequestBuilder`] already pointing at `/v1/domains/{domain}` with credentials attached, and [`Client::execute`] sends the built request, checks for `200 OK` and decodes the JSON body into any `DeserializeOwned` type.
//!
//! ## Errors
//! Builder misuse surfaces as [`Error::Config`], [`Error::Url`], [`Error::InvalidHeader`] or [`Error::Json`] before anything is sent. Transport failures are [`Error::Request`], non-200 answers are [`Error::Status`] with the raw body, undecodable bodies are [`Error::Decode`], and aborted calls are [`Error::Timeout`] or [`Error::Cancelled`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use migadu_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), migadu_client::Error> {
//!     let client = Client::new("admin@example.org", "api-key", "example.org").await?;
//!
//!     client
//!         .create_alias("info", &["jane@example.org".to_string()])
//!         .await?;
//!     for alias in client.list_aliases().await? {
//!         println!("{} -> {}", alias.address, alias.destinations.join(", "));
//!     }
//!
//!     client.delete_alias("info").await?;
//!     Ok(())
//! }
//! ```

mod aliases;
mod client;
mod error;
mod identities;
mod mailboxes;
mod models;
mod request;
mod rewrites;

pub use client::{API_HOST, Client, ClientBuilder, DEFAULT_TIMEOUT, Transport, V1_PATH};
pub use error::Error;
pub use models::{Alias, Identity, Mailbox, NewMailbox, Rewrite};
pub use request::{DescriptorPool, PoolStats, RequestBuilder};
pub use tokio_util::sync::CancellationToken;

/// Result type alias for Migadu operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
