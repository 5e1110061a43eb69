use anyhow::Result;
use rmcp::{
    model::{CallToolRequestParam, ErrorCode, ReadResourceRequestParam},
    service::ServiceError,
};
use serde_json::json;

use crate::common::{build_server, connect, resource_body};

#[tokio::test]
async fn resources_and_templates_are_advertised() -> Result<()> {
    let (client, server_task) = connect(build_server()).await?;

    let resources = serde_json::to_value(client.list_resources(None).await?)?;
    assert_eq!(resources["resources"][0]["uri"], "users://all");
    assert_eq!(resources["resources"][0]["name"], "users");
    assert_eq!(resources["resources"][0]["mimeType"], "application/json");

    let templates = serde_json::to_value(client.list_resource_templates(None).await?)?;
    assert_eq!(
        templates["resourceTemplates"][0]["uriTemplate"],
        "users://{userId}/profile"
    );
    assert_eq!(templates["resourceTemplates"][0]["name"], "user-details");

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn empty_store_lists_no_users() -> Result<()> {
    let (client, server_task) = connect(build_server()).await?;

    let result = client
        .read_resource(ReadResourceRequestParam {
            uri: "users://all".into(),
        })
        .await?;
    assert_eq!(resource_body(&result)?, json!([]));

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn absent_profile_is_reported_in_content() -> Result<()> {
    let (client, server_task) = connect(build_server()).await?;

    let result = client
        .read_resource(ReadResourceRequestParam {
            uri: "users://42/profile".into(),
        })
        .await?;
    assert_eq!(
        resource_body(&result)?,
        json!({ "error": "No user found for the given ID" })
    );

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn created_user_appears_in_both_resources() -> Result<()> {
    let (client, server_task) = connect(build_server()).await?;

    let args = json!({
        "name": "Ada",
        "email": "ada@x.io",
        "address": "1 Infinite Loop",
        "phone": "555-0100"
    })
    .as_object()
    .expect("object")
    .clone();
    client
        .call_tool(CallToolRequestParam {
            name: "create-user".into(),
            arguments: Some(args),
        })
        .await?;

    let all = client
        .read_resource(ReadResourceRequestParam {
            uri: "users://all".into(),
        })
        .await?;
    let users = resource_body(&all)?;
    assert_eq!(users.as_array().map(Vec::len), Some(1));

    let profile = client
        .read_resource(ReadResourceRequestParam {
            uri: "users://1/profile".into(),
        })
        .await?;
    let user = resource_body(&profile)?;
    assert_eq!(user, users[0]);
    assert_eq!(user["id"], 1);
    assert_eq!(user["email"], "ada@x.io");
    assert_eq!(user["createdAt"], user["updatedAt"]);

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn unknown_uri_is_a_protocol_error() -> Result<()> {
    let (client, server_task) = connect(build_server()).await?;

    let error = client
        .read_resource(ReadResourceRequestParam {
            uri: "users://everyone".into(),
        })
        .await
        .expect_err("unrouted URI should fail");
    match error {
        ServiceError::McpError(inner) => {
            assert_eq!(inner.code, ErrorCode::RESOURCE_NOT_FOUND);
        }
        other => anyhow::bail!("unexpected error: {other:?}"),
    }

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}
