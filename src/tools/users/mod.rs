//! User capabilities: resources, create tools, the sampling bridge, and prompts.

pub mod create;
pub mod prompts;
pub mod repository;
pub mod resources;
pub mod sampling;
pub mod write_queue;

pub use create::{created_message, CreateUserRequest, SAVE_FAILED_MESSAGE};
pub use prompts::{fake_user_messages, GenerateFakeUserArgs};
pub use repository::{parse_user_id, RepositoryError, UserLookup, UserRepository};
pub use resources::{
    list_resource_templates, list_resources, read_user_resource, UserResource, USERS_ALL_URI,
    USER_NOT_FOUND_MESSAGE, USER_PROFILE_TEMPLATE,
};
pub use sampling::{
    create_random_user, parse_generated_user, RandomUserError, UserDataSampler,
    GENERATION_FAILED_MESSAGE,
};
pub use write_queue::{UserWriteQueue, WriteTicket, WriteTurn};

pub const CREATE_USER_TOOL_ID: &str = "create-user";
pub const CREATE_RANDOM_USER_TOOL_ID: &str = "create-random-user";
pub const GENERATE_FAKE_USER_PROMPT_ID: &str = "generate-fake-user";
