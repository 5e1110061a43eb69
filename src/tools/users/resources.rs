//! `users://` resources.
//!
//! Reads never fail at the protocol level once a URI is routed: a missing
//! user (or an unparsable id) is returned as a JSON `{"error": ...}` body
//! inside a normal resource result.

use rmcp::model::{ErrorData, ReadResourceResult, Resource, ResourceContents, ResourceTemplate};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::repository::{parse_user_id, UserLookup, UserRepository};
use crate::lib::errors::RESOURCE_NOT_FOUND_ERROR;

pub const USERS_ALL_URI: &str = "users://all";
pub const USER_PROFILE_TEMPLATE: &str = "users://{userId}/profile";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const USER_NOT_FOUND_MESSAGE: &str = "No user found for the given ID";

const USERS_SCHEME: &str = "users://";
const PROFILE_SUFFIX: &str = "/profile";

/// Static description of a registered resource or resource template.
struct ResourceDescriptor {
    address: &'static str,
    name: &'static str,
    title: &'static str,
    description: &'static str,
}

const USERS_RESOURCE: ResourceDescriptor = ResourceDescriptor {
    address: USERS_ALL_URI,
    name: "users",
    title: "Users",
    description: "Get all users data from the database",
};

const USER_DETAILS_TEMPLATE: ResourceDescriptor = ResourceDescriptor {
    address: USER_PROFILE_TEMPLATE,
    name: "user-details",
    title: "User Details",
    description: "Get a user's details from the database",
};

impl ResourceDescriptor {
    fn to_model<T: DeserializeOwned>(&self, address_key: &str) -> Result<T, ErrorData> {
        let value = json!({
            address_key: self.address,
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "mimeType": JSON_MIME_TYPE,
        });
        serde_json::from_value(value).map_err(|err| {
            ErrorData::internal_error(
                format!("failed to describe resource {}: {err}", self.name),
                None,
            )
        })
    }
}

/// Routed form of a `users://` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserResource<'a> {
    All,
    Profile { user_id: &'a str },
}

impl<'a> UserResource<'a> {
    /// Match a URI against the registered resource and template.
    pub fn parse(uri: &'a str) -> Option<Self> {
        if uri == USERS_ALL_URI {
            return Some(Self::All);
        }
        let user_id = uri
            .strip_prefix(USERS_SCHEME)?
            .strip_suffix(PROFILE_SUFFIX)?;
        if user_id.is_empty() || user_id.contains('/') {
            return None;
        }
        Some(Self::Profile { user_id })
    }
}

/// Concrete resources advertised by `resources/list`.
pub fn list_resources() -> Result<Vec<Resource>, ErrorData> {
    Ok(vec![USERS_RESOURCE.to_model("uri")?])
}

/// Templates advertised by `resources/templates/list`.
pub fn list_resource_templates() -> Result<Vec<ResourceTemplate>, ErrorData> {
    Ok(vec![USER_DETAILS_TEMPLATE.to_model("uriTemplate")?])
}

/// Resolve and read a `users://` URI.
pub async fn read_user_resource(
    repository: &UserRepository,
    uri: &str,
) -> Result<ReadResourceResult, ErrorData> {
    let route = UserResource::parse(uri).ok_or_else(|| unknown_resource(uri))?;
    let contents = match route {
        UserResource::All => match repository.list_users().await {
            Ok(users) => json_contents(uri, &users)?,
            Err(err) => {
                warn!(
                    target: "user_registry::tools",
                    uri,
                    error = %err,
                    "Failed to list users"
                );
                json_contents(uri, &error_payload(&format!("Failed to load users: {err}")))?
            }
        },
        UserResource::Profile { user_id } => {
            let body = match parse_user_id(user_id) {
                Some(id) => match repository.get_user(id).await {
                    Ok(UserLookup::Found(user)) => {
                        serde_json::to_value(&user).map_err(encode_error)?
                    }
                    Ok(UserLookup::NotFound) => error_payload(USER_NOT_FOUND_MESSAGE),
                    Err(err) => {
                        warn!(
                            target: "user_registry::tools",
                            user_id = id,
                            error = %err,
                            "User lookup failed"
                        );
                        error_payload(&format!("Failed to load user: {err}"))
                    }
                },
                None => error_payload(USER_NOT_FOUND_MESSAGE),
            };
            json_contents(uri, &body)?
        }
    };

    Ok(ReadResourceResult {
        contents: vec![contents],
    })
}

fn error_payload(message: &str) -> Value {
    json!({ "error": message })
}

fn json_contents(uri: &str, payload: &impl Serialize) -> Result<ResourceContents, ErrorData> {
    let text = serde_json::to_string(payload).map_err(encode_error)?;
    let mut contents = ResourceContents::text(text, uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(JSON_MIME_TYPE.into());
    }
    Ok(contents)
}

fn encode_error(err: serde_json::Error) -> ErrorData {
    ErrorData::internal_error(format!("failed to encode resource body: {err}"), None)
}

fn unknown_resource(uri: &str) -> ErrorData {
    RESOURCE_NOT_FOUND_ERROR
        .builder()
        .retryable(false)
        .with_context_field("uri", Value::String(uri.to_string()))
        .build()
        .unwrap_or_else(|err| ErrorData::resource_not_found(err.to_string(), None))
}
