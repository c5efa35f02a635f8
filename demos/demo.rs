use migadu_client::{ClientBuilder, NewMailbox};

#[tokio::main]
async fn main() -> Result<(), migadu_client::Error> {
    let client = ClientBuilder::from_env()?.build().await?;
    println!("Connected to {} as {}", client.domain(), client.email());

    for mailbox in client.list_mailboxes().await? {
        println!("Mailbox: {} ({})", mailbox.address, mailbox.name);
        for identity in client.list_identities(&mailbox.local_part).await? {
            println!("  Identity: {}", identity.address);
        }
    }

    let alias = client
        .create_alias("demo-alias", &["postmaster@".to_string() + client.domain()])
        .await?;
    println!("Created alias {} -> {:?}", alias.address, alias.destinations);

    for rewrite in client.list_rewrites().await? {
        println!("Rewrite: {} matches {}", rewrite.name, rewrite.local_part_rule);
    }

    client.delete_alias("demo-alias").await?;
    println!("Deleted alias {}", alias.address);

    if std::env::var("MIGADU_DEMO_INVITE").is_ok() {
        let invited = client
            .create_mailbox(&NewMailbox {
                local_part: "demo-user".to_string(),
                name: "Demo User".to_string(),
                password_recovery_email: Some(client.email().to_string()),
                ..Default::default()
            })
            .await?;
        println!("Invited {}", invited.address);
    }

    Ok(())
}
