//! Peer-sampled user creation used by `create-random-user`.
//!
//! The server asks the connected client to generate a user through
//! `sampling/createMessage`, strips an optional JSON code fence from the
//! reply, and hands the parsed fields to the repository.

use async_trait::async_trait;
use rmcp::{
    model::{Content, CreateMessageRequestParam, CreateMessageResult, Role, SamplingMessage},
    service::ServiceError,
    Peer, RoleServer,
};
use thiserror::Error;
use tracing::warn;

use super::{
    create::CreateUserRequest,
    repository::{RepositoryError, UserRepository},
};

/// Instruction sent to the peer.
pub const RANDOM_USER_INSTRUCTION: &str = "Generate fake user data. The user should have a realistic name, email, address, and phone number. Return this data as a JSON object with no other text or formatter so it can be used with JSON.parse.";

/// Failure text when the peer does not answer with text.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate user data";

/// Seam for the nested generation request.
#[async_trait]
pub trait UserDataSampler: Send + Sync {
    async fn create_message(
        &self,
        request: CreateMessageRequestParam,
    ) -> Result<CreateMessageResult, ServiceError>;
}

#[async_trait]
impl UserDataSampler for Peer<RoleServer> {
    async fn create_message(
        &self,
        request: CreateMessageRequestParam,
    ) -> Result<CreateMessageResult, ServiceError> {
        Peer::<RoleServer>::create_message(self, request).await
    }
}

/// Reasons `create-random-user` did not create a user.
#[derive(Debug, Error)]
pub enum RandomUserError {
    #[error("Failed to generate user data: {0}")]
    Request(#[source] ServiceError),
    #[error("Failed to generate user data")]
    NonTextContent,
    #[error("Generated user data is not valid: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Failed to save user: {0}")]
    Save(#[source] RepositoryError),
}

/// Build the sampling request for one synthetic user.
pub fn random_user_request(max_tokens: u32) -> CreateMessageRequestParam {
    CreateMessageRequestParam {
        messages: vec![SamplingMessage {
            role: Role::User,
            content: Content::text(RANDOM_USER_INSTRUCTION),
        }],
        model_preferences: None,
        system_prompt: None,
        include_context: None,
        temperature: None,
        max_tokens,
        stop_sequences: None,
        metadata: None,
    }
}

/// Trim the reply and strip a leading ```` ```json ```` and a trailing ```` ``` ```` fence.
pub fn strip_json_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Parse peer-generated text into the `create-user` input shape.
pub fn parse_generated_user(raw: &str) -> Result<CreateUserRequest, RandomUserError> {
    serde_json::from_str(strip_json_fence(raw)).map_err(RandomUserError::Malformed)
}

/// Ask the peer for a user and persist it, returning the new id.
pub async fn create_random_user(
    sampler: &dyn UserDataSampler,
    repository: &UserRepository,
    max_tokens: u32,
) -> Result<i64, RandomUserError> {
    let result = sampler
        .create_message(random_user_request(max_tokens))
        .await
        .map_err(|err| {
            warn!(
                target: "user_registry::tools",
                error = %err,
                "Sampling request failed"
            );
            RandomUserError::Request(err)
        })?;

    let text = match result.message.content.as_text() {
        Some(text) => text.text.clone(),
        None => return Err(RandomUserError::NonTextContent),
    };

    let generated = parse_generated_user(&text)?;
    repository
        .create_user(generated.into())
        .await
        .map_err(RandomUserError::Save)
}
