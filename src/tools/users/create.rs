use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::NewUser;

/// Failure text returned by `create-user` for any repository failure.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save user";

/// Input for `create-user`; also the shape expected from sampled user data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CreateUserRequest {
    /// Full name of the user.
    pub name: String,
    /// Email address. Not validated.
    pub email: String,
    /// Postal address.
    pub address: String,
    /// Phone number in any format.
    pub phone: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            address: request.address,
            phone: request.phone,
        }
    }
}

/// Success text shared by both create tools.
pub fn created_message(id: i64) -> String {
    format!("User {id} created successfully")
}
