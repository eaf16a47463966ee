use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base = std::env::var("HUDDLE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let client = reqwest::Client::new();
    println!("Starting Huddle smoke client against {}...", base);

    println!("\n[1/5] Saving profiles for alice and bob...");
    for (username, display) in [("alice", "Alice"), ("bob", "Bob")] {
        client
            .put(format!("{}/api/users/{}", base, username))
            .json(&json!({ "display_name": display }))
            .send()
            .await?
            .error_for_status()?;
    }

    println!("\n[2/5] alice posts...");
    let post: Value = client
        .post(format!("{}/api/posts", base))
        .json(&json!({ "title": "Hello", "body": "World", "author": "alice" }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let post_id = post["id"].as_i64().unwrap_or_default();
    println!("   -> Post #{}", post_id);

    println!("\n[3/5] bob mentions alice...");
    let created: Value = client
        .post(format!("{}/api/posts/{}/comments", base, post_id))
        .json(&json!({ "author": "bob", "body": "@alice hi" }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!(
        "   -> Comment #{} with {} notification(s)",
        created["comment"]["id"],
        created["notifications"].as_array().map(Vec::len).unwrap_or(0)
    );

    println!("\n[4/5] alice checks notifications...");
    let unread: Value = client
        .get(format!("{}/api/users/alice/notifications", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("   -> {} unread", unread["unread"]);

    let Some(first) = unread["items"].as_array().and_then(|items| items.first()) else {
        println!("   -> ❌ Expected a notification for alice");
        return Ok(());
    };
    println!("   -> {}", first["label"].as_str().unwrap_or_default());

    println!("\n[5/5] alice opens it...");
    client
        .post(format!("{}/api/notifications/{}/read", base, first["id"]))
        .json(&json!({ "session": "smoke" }))
        .send()
        .await?
        .error_for_status()?;

    let feed: Value = client
        .get(format!("{}/api/feed?viewer=alice&session=smoke", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("   -> Jump to comment {}", feed["jump_to"]);
    println!("   -> Unread left: {}", feed["notifications"].as_array().map(Vec::len).unwrap_or(0));

    Ok(())
}
