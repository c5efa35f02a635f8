//! Data models for Migadu API resources.
//!
//! Models decode whatever the API returns; the `*Payload` types are the
//! write-side wire shapes. Multi-value destination fields are kept as
//! `Vec<String>` in memory but travel as one comma-joined string.

use serde::{Deserialize, Deserializer, Serialize};

/// An address alias forwarding to one or more destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Alias {
    /// Full address, e.g. `info@example.org`.
    pub address: String,
    /// Addresses mail is forwarded to.
    #[serde(deserialize_with = "destinations")]
    pub destinations: Vec<String>,
    pub domain_name: String,
    pub expireable: bool,
    pub expires_on: Option<String>,
    pub is_internal: bool,
    /// The part before the `@`.
    pub local_part: String,
    pub remove_upon_expiry: bool,
}

/// A pattern-based rewrite rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Rewrite {
    #[serde(deserialize_with = "destinations")]
    pub destinations: Vec<String>,
    /// Wildcard pattern matched against the local part, e.g. `sales-*`.
    pub local_part_rule: String,
    pub name: String,
    pub order_num: i64,
}

/// An additional sending identity attached to a mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    #[serde(skip_serializing)]
    pub address: String,
    #[serde(skip_serializing)]
    pub domain_name: String,
    pub footer_active: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer_html_body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer_plain_body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub local_part: String,
    pub may_access_imap: bool,
    pub may_access_managesieve: bool,
    pub may_access_pop3: bool,
    pub may_receive: bool,
    pub may_send: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

/// A mailbox on the domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mailbox {
    #[serde(skip_serializing)]
    pub address: String,
    #[serde(skip_serializing)]
    pub domain_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub local_part: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub is_internal: bool,
    pub may_send: bool,
    pub may_receive: bool,
    pub may_access_imap: bool,
    pub may_access_pop3: bool,
    pub may_access_managesieve: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password_recovery_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub spam_action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub spam_aggressiveness: String,
    pub expireable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
    pub remove_upon_expiry: bool,
    pub autorespond_active: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub autorespond_subject: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub autorespond_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorespond_expires_on: Option<String>,
    pub footer_active: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer_plain_body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer_html_body: String,
    #[serde(skip_serializing)]
    pub storage_usage: f64,
}

/// Fields for creating a mailbox.
///
/// Without a `password`, Migadu sends an invitation to
/// `password_recovery_email` so the user can pick one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewMailbox {
    pub local_part: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_recovery_email: Option<String>,
    pub is_internal: bool,
}

impl NewMailbox {
    /// Wire value selecting how the initial password is set.
    fn password_method(&self) -> Option<&'static str> {
        match self.password {
            Some(_) => None,
            None => Some("invitation"),
        }
    }
}

/// Body sent when creating a mailbox.
#[derive(Debug, Serialize)]
pub(crate) struct NewMailboxPayload<'a> {
    #[serde(flatten)]
    mailbox: &'a NewMailbox,
    #[serde(skip_serializing_if = "Option::is_none")]
    password_method: Option<&'static str>,
}

impl<'a> From<&'a NewMailbox> for NewMailboxPayload<'a> {
    fn from(mailbox: &'a NewMailbox) -> Self {
        Self {
            password_method: mailbox.password_method(),
            mailbox,
        }
    }
}

/// Body sent when creating an identity.
#[derive(Debug, Serialize)]
pub(crate) struct NewIdentityPayload<'a> {
    pub local_part: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub name: &'a str,
}

/// Body sent when creating or updating an alias.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct AliasPayload<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    local_part: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    destinations: String,
    expireable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_on: Option<&'a str>,
    is_internal: bool,
    remove_upon_expiry: bool,
}

impl<'a> From<&'a Alias> for AliasPayload<'a> {
    fn from(alias: &'a Alias) -> Self {
        Self {
            local_part: &alias.local_part,
            destinations: join_destinations(&alias.destinations),
            expireable: alias.expireable,
            expires_on: alias.expires_on.as_deref(),
            is_internal: alias.is_internal,
            remove_upon_expiry: alias.remove_upon_expiry,
        }
    }
}

/// Body sent when creating or updating a rewrite.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct RewritePayload<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    local_part_rule: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    destinations: String,
    #[serde(skip_serializing_if = "is_zero")]
    order_num: i64,
}

impl<'a> From<&'a Rewrite> for RewritePayload<'a> {
    fn from(rewrite: &'a Rewrite) -> Self {
        Self {
            name: &rewrite.name,
            local_part_rule: &rewrite.local_part_rule,
            destinations: join_destinations(&rewrite.destinations),
            order_num: rewrite.order_num,
        }
    }
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Flatten a destination list into the comma-joined wire form.
pub(crate) fn join_destinations(destinations: &[String]) -> String {
    destinations.join(",")
}

/// Accept destinations as a JSON array, a comma-joined string or `null`.
fn destinations<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Wire>::deserialize(deserializer)? {
        Some(Wire::List(list)) => list,
        Some(Wire::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    })
}

/// `GET aliases` envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AliasList {
    pub address_aliases: Vec<Alias>,
}

/// `GET rewrites` envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RewriteList {
    pub rewrites: Vec<Rewrite>,
}

/// `GET mailboxes/{mailbox}/identities` envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IdentityList {
    pub identities: Vec<Identity>,
}

/// `GET mailboxes` envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MailboxList {
    pub mailboxes: Vec<Mailbox>,
}
