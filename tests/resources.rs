use httpmock::prelude::*;
use migadu_client::{Alias, Client, Identity, Mailbox, NewMailbox, Rewrite};
use serde_json::json;

async fn client(server: &MockServer) -> Client {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/domains/example.org/mailboxes");
            then.status(200).json_body(json!({ "mailboxes": [] }));
        })
        .await;
    Client::builder("admin@example.org", "secret", "example.org")
        .api_host(server.base_url())
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn create_alias_sends_joined_destinations() {
    let server = MockServer::start_async().await;
    let client = client(&server).await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/domains/example.org/aliases")
                .header("content-type", "application/json")
                .json_body(json!({
                    "local_part": "info",
                    "destinations": "a@x.com,b@y.com",
                    "expireable": false,
                    "is_internal": false,
                    "remove_upon_expiry": false
                }));
            then.status(200).json_body(json!({
                "address": "info@example.org",
                "local_part": "info",
                "domain_name": "example.org",
                "destinations": ["a@x.com", "b@y.com"]
            }));
        })
        .await;

    let alias = client
        .create_alias("info", &["a@x.com".to_string(), "b@y.com".to_string()])
        .await
        .unwrap();

    create.assert_async().await;
    assert_eq!(alias.address, "info@example.org");
    assert_eq!(alias.destinations, ["a@x.com", "b@y.com"]);
}

#[tokio::test]
async fn alias_crud_paths() {
    let server = MockServer::start_async().await;
    let client = client(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/domains/example.org/aliases");
            then.status(200).json_body(json!({
                "address_aliases": [
                    { "address": "info@example.org", "local_part": "info" },
                    { "address": "sales@example.org", "local_part": "sales" }
                ]
            }));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v1/domains/example.org/aliases/info")
                .json_body_partial(r#"{ "destinations": "new@example.org", "is_internal": true }"#);
            then.status(200).json_body(json!({
                "address": "info@example.org",
                "destinations": ["new@example.org"],
                "is_internal": true
            }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/domains/example.org/aliases/info");
            then.status(200).json_body(json!({ "address": "info@example.org" }));
        })
        .await;

    let aliases = client.list_aliases().await.unwrap();
    assert_eq!(aliases.len(), 2);
    assert_eq!(aliases[1].local_part, "sales");

    let changed = Alias {
        destinations: vec!["new@example.org".to_string()],
        is_internal: true,
        ..aliases[0].clone()
    };
    let updated = client.update_alias("info", &changed).await.unwrap();
    assert!(updated.is_internal);

    client.delete_alias("info").await.unwrap();
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn rewrite_create_and_list() {
    let server = MockServer::start_async().await;
    let client = client(&server).await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/domains/example.org/rewrites")
                .json_body(json!({
                    "name": "sales",
                    "local_part_rule": "sales-*",
                    "destinations": "sales@example.org,ops@example.org"
                }));
            then.status(200).json_body(json!({
                "name": "sales",
                "local_part_rule": "sales-*",
                "order_num": 3,
                "destinations": ["sales@example.org", "ops@example.org"]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/domains/example.org/rewrites");
            then.status(200).json_body(json!({
                "rewrites": [{ "name": "sales", "local_part_rule": "sales-*", "order_num": 3 }]
            }));
        })
        .await;

    let created = client
        .create_rewrite(
            "sales",
            "sales-*",
            &["sales@example.org".to_string(), "ops@example.org".to_string()],
        )
        .await
        .unwrap();
    let listed = client.list_rewrites().await.unwrap();

    create.assert_async().await;
    assert_eq!(created.order_num, 3);
    assert_eq!(created.destinations.len(), 2);
    assert_eq!(
        listed,
        [Rewrite {
            name: "sales".to_string(),
            local_part_rule: "sales-*".to_string(),
            order_num: 3,
            destinations: Vec::new(),
        }]
    );
}

#[tokio::test]
async fn identities_are_nested_under_mailbox() {
    let server = MockServer::start_async().await;
    let client = client(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/domains/example.org/mailboxes/jane/identities");
            then.status(200).json_body(json!({
                "identities": [{ "address": "j@example.org", "local_part": "j", "may_send": true }]
            }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/domains/example.org/mailboxes/jane/identities")
                .json_body(json!({ "local_part": "support", "name": "Support" }));
            then.status(200)
                .json_body(json!({ "address": "support@example.org", "name": "Support" }));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v1/domains/example.org/mailboxes/jane/identities/support")
                .json_body_partial(r#"{ "name": "Helpdesk", "may_send": true }"#);
            then.status(200).json_body(json!({ "name": "Helpdesk", "may_send": true }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/v1/domains/example.org/mailboxes/jane/identities/support");
            then.status(200);
        })
        .await;

    let identities = client.list_identities("jane").await.unwrap();
    assert_eq!(identities.len(), 1);
    assert!(identities[0].may_send);

    let created = client
        .create_identity("jane", "support", "Support")
        .await
        .unwrap();
    assert_eq!(created.address, "support@example.org");

    let changed = Identity {
        name: "Helpdesk".to_string(),
        may_send: true,
        ..created
    };
    let updated = client
        .update_identity("jane", "support", &changed)
        .await
        .unwrap();
    assert_eq!(updated.name, "Helpdesk");

    client.delete_identity("jane", "support").await.unwrap();
    create.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn mailbox_create_by_invitation_and_get() {
    let server = MockServer::start_async().await;
    let client = client(&server).await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/domains/example.org/mailboxes")
                .json_body(json!({
                    "local_part": "jane",
                    "name": "Jane Doe",
                    "password_recovery_email": "jane@elsewhere.net",
                    "is_internal": false,
                    "password_method": "invitation"
                }));
            then.status(200).json_body(json!({
                "address": "jane@example.org",
                "local_part": "jane",
                "name": "Jane Doe",
                "storage_usage": 0.0
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/domains/example.org/mailboxes/jane");
            then.status(200).json_body(json!({
                "address": "jane@example.org",
                "local_part": "jane",
                "may_send": true,
                "may_receive": true
            }));
        })
        .await;

    let created = client
        .create_mailbox(&NewMailbox {
            local_part: "jane".to_string(),
            name: "Jane Doe".to_string(),
            password_recovery_email: Some("jane@elsewhere.net".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let fetched: Mailbox = client.get_mailbox("jane").await.unwrap();

    create.assert_async().await;
    assert_eq!(created.address, "jane@example.org");
    assert!(fetched.may_send && fetched.may_receive);
}

#[tokio::test]
async fn mailbox_update_and_delete() {
    let server = MockServer::start_async().await;
    let client = client(&server).await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v1/domains/example.org/mailboxes/jane")
                .json_body_partial(r#"{ "name": "Jane Q. Doe", "autorespond_active": true }"#);
            then.status(200)
                .json_body(json!({ "name": "Jane Q. Doe", "autorespond_active": true }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/domains/example.org/mailboxes/jane");
            then.status(200).json_body(json!({ "address": "jane@example.org" }));
        })
        .await;

    let mailbox = Mailbox {
        name: "Jane Q. Doe".to_string(),
        autorespond_active: true,
        ..Default::default()
    };
    let updated = client.update_mailbox("jane", &mailbox).await.unwrap();
    client.delete_mailbox("jane").await.unwrap();

    update.assert_async().await;
    delete.assert_async().await;
    assert!(updated.autorespond_active);
}

#[tokio::test]
async fn missing_resource_keeps_vendor_message() {
    let server = MockServer::start_async().await;
    let client = client(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/domains/example.org/mailboxes/ghost");
            then.status(404).json_body(json!({ "error": "Mailbox not found" }));
        })
        .await;

    let err = client.get_mailbox("ghost").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Mailbox not found"));
}

#[tokio::test]
async fn empty_identifiers_never_reach_the_collection() {
    let server = MockServer::start_async().await;
    let client = client(&server).await;
    let collection = server
        .mock_async(|when, then| {
            when.path_contains("/v1/domains/example.org/");
            then.status(200).json_body(json!({}));
        })
        .await;

    assert!(matches!(client.get_alias("").await, Err(migadu_client::Error::Config(_))));
    assert!(matches!(client.delete_alias("").await, Err(migadu_client::Error::Config(_))));
    assert!(matches!(client.delete_mailbox("/").await, Err(migadu_client::Error::Config(_))));
    assert!(matches!(
        client.delete_identity("jane", "").await,
        Err(migadu_client::Error::Config(_))
    ));
    assert!(matches!(
        client.delete_identity("jane", "..").await,
        Err(migadu_client::Error::Config(_))
    ));

    collection.assert_hits_async(0).await;
}
