//! MCP server startup and capability registration.
mod capability_registry;
mod server_info;
mod startup;

pub use capability_registry::UserRegistryServer;
pub use server_info::build_instructions;
pub use startup::{run_server, RuntimeExit, STORE_UNREACHABLE_EXIT, STORE_URL_REQUIRED_EXIT};
