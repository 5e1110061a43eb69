use anyhow::Result;
use rmcp::{
    model::{CallToolRequestParam, ErrorCode, JsonObject},
    service::ServiceError,
};
use serde_json::{json, Value};

use user_registry_mcp::tools::users::UserLookup;

use crate::common::{build_server, connect, tool_text};

fn arguments(value: Value) -> JsonObject {
    value.as_object().expect("object").clone()
}

fn ada() -> JsonObject {
    arguments(json!({
        "name": "Ada",
        "email": "ada@x.io",
        "address": "1 Infinite Loop",
        "phone": "555-0100"
    }))
}

#[tokio::test]
async fn create_user_tool_is_annotated() -> Result<()> {
    let (client, server_task) = connect(build_server()).await?;

    let tools = client.list_tools(None).await?;
    let create = tools
        .tools
        .iter()
        .find(|tool| tool.name == "create-user")
        .expect("create-user registered");
    let value = serde_json::to_value(create)?;
    assert_eq!(value["annotations"]["title"], "Create User");
    assert_eq!(value["annotations"]["readOnlyHint"], false);
    assert_eq!(value["annotations"]["openWorldHint"], true);
    let required: Vec<&str> = value["inputSchema"]["required"]
        .as_array()
        .expect("required list")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    for field in ["name", "email", "address", "phone"] {
        assert!(required.contains(&field), "{field} should be required");
    }

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn create_user_assigns_first_id() -> Result<()> {
    let server = build_server();
    let repository = server.repository().clone();
    let (client, server_task) = connect(server).await?;

    let result = client
        .call_tool(CallToolRequestParam {
            name: "create-user".into(),
            arguments: Some(ada()),
        })
        .await?;
    let (text, is_error) = tool_text(&result)?;
    assert_eq!(text, "User 1 created successfully");
    assert!(!is_error);

    match repository.get_user(1).await? {
        UserLookup::Found(user) => {
            assert_eq!(user.name, "Ada");
            assert_eq!(user.address, "1 Infinite Loop");
            assert_eq!(user.phone, "555-0100");
        }
        UserLookup::NotFound => anyhow::bail!("user 1 should exist"),
    }

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn missing_email_is_rejected_before_the_handler() -> Result<()> {
    let server = build_server();
    let repository = server.repository().clone();
    let (client, server_task) = connect(server).await?;

    let error = client
        .call_tool(CallToolRequestParam {
            name: "create-user".into(),
            arguments: Some(arguments(json!({
                "name": "Ada",
                "address": "1 Infinite Loop",
                "phone": "555-0100"
            }))),
        })
        .await
        .expect_err("missing email should fail validation");
    match error {
        ServiceError::McpError(inner) => assert_eq!(inner.code, ErrorCode::INVALID_PARAMS),
        other => anyhow::bail!("unexpected error: {other:?}"),
    }
    assert!(repository.list_users().await?.is_empty());

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn empty_field_reports_save_failure() -> Result<()> {
    let server = build_server();
    let repository = server.repository().clone();
    let (client, server_task) = connect(server).await?;

    let result = client
        .call_tool(CallToolRequestParam {
            name: "create-user".into(),
            arguments: Some(arguments(json!({
                "name": "Ada",
                "email": "",
                "address": "1 Infinite Loop",
                "phone": "555-0100"
            }))),
        })
        .await?;
    let (text, is_error) = tool_text(&result)?;
    assert_eq!(text, "Failed to save user");
    assert!(is_error);
    assert!(repository.list_users().await?.is_empty());

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() -> Result<()> {
    let server = build_server();
    let repository = server.repository().clone();
    let (client, server_task) = connect(server).await?;

    let mut calls = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let peer = client.peer().clone();
        calls.spawn(async move {
            peer.call_tool(CallToolRequestParam {
                name: "create-user".into(),
                arguments: Some(ada()),
            })
            .await
        });
    }
    while let Some(joined) = calls.join_next().await {
        let (text, is_error) = tool_text(&joined??)?;
        assert!(!is_error, "{text}");
    }

    let mut ids: Vec<i64> = repository
        .list_users()
        .await?
        .into_iter()
        .map(|user| user.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}
