use rmcp::model::{PromptMessage, PromptMessageRole};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments for `generate-fake-user`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateFakeUserArgs {
    /// Name the generated user should have.
    pub name: String,
}

/// The single instruction message for a fake user with the given name.
pub fn fake_user_messages(args: &GenerateFakeUserArgs) -> Vec<PromptMessage> {
    vec![PromptMessage::new_text(
        PromptMessageRole::User,
        format!(
            "Generate a fake user with the name {}. The user should have a realistic email, address, and phone number.",
            args.name
        ),
    )]
}
