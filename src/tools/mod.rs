//! MCP capabilities registered on the server and the routers that hold them.

pub mod users;

use rmcp::handler::server::router::{prompt::PromptRouter, tool::ToolRouter};

pub type ServerToolRouter<S> = ToolRouter<S>;
pub type ServerPromptRouter<S> = PromptRouter<S>;
