use std::sync::Arc;

use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler},
    model::{
        CallToolResult, Content, ErrorData, GetPromptRequestParam, GetPromptResult,
        ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParam, ReadResourceRequestParam, ReadResourceResult, ServerCapabilities,
        ServerInfo,
    },
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router, Peer, RoleServer,
};
use tracing::warn;

use crate::{
    lib::telemetry::CapabilitySpan,
    server::config::ServerConfig,
    tools::{
        users::{
            self, created_message, CreateUserRequest, GenerateFakeUserArgs, UserRepository,
            SAVE_FAILED_MESSAGE,
        },
        ServerPromptRouter, ServerToolRouter,
    },
};

/// MCP handler exposing the user registry's resources, tools, and prompt.
#[derive(Clone)]
pub struct UserRegistryServer {
    config: Arc<ServerConfig>,
    instructions: Arc<String>,
    tool_router: ServerToolRouter<Self>,
    prompt_router: ServerPromptRouter<Self>,
    repository: UserRepository,
}

impl UserRegistryServer {
    pub fn new(config: ServerConfig, instructions: String, repository: UserRepository) -> Self {
        Self {
            config: Arc::new(config),
            instructions: Arc::new(instructions),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
            repository,
        }
    }

    pub fn repository(&self) -> &UserRepository {
        &self.repository
    }
}

#[tool_router(router = tool_router)]
impl UserRegistryServer {
    #[tool(
        name = "create-user",
        description = "Create a new user in the database",
        annotations(
            title = "Create User",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn create_user(
        &self,
        Parameters(request): Parameters<CreateUserRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let span = CapabilitySpan::start("tool", users::CREATE_USER_TOOL_ID);
        match self.repository.create_user(request.into()).await {
            Ok(id) => {
                span.finish("ok");
                Ok(CallToolResult::success(vec![Content::text(created_message(
                    id,
                ))]))
            }
            Err(err) => {
                warn!(
                    target: "user_registry::tools",
                    error = %err,
                    "create-user failed"
                );
                span.finish("error");
                Ok(CallToolResult::error(vec![Content::text(
                    SAVE_FAILED_MESSAGE,
                )]))
            }
        }
    }

    #[tool(
        name = "create-random-user",
        description = "Create a random user with fake data",
        annotations(
            title = "Create Random User",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn create_random_user(
        &self,
        peer: Peer<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let span = CapabilitySpan::start("tool", users::CREATE_RANDOM_USER_TOOL_ID);
        let outcome = users::create_random_user(
            &peer,
            &self.repository,
            self.config.sampling.max_tokens,
        )
        .await;
        match outcome {
            Ok(id) => {
                span.finish("ok");
                Ok(CallToolResult::success(vec![Content::text(created_message(
                    id,
                ))]))
            }
            Err(err) => {
                span.finish("error");
                Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
            }
        }
    }
}

#[prompt_router]
impl UserRegistryServer {
    #[prompt(
        name = "generate-fake-user",
        description = "Generate a fake user based on a given name"
    )]
    async fn generate_fake_user(
        &self,
        Parameters(args): Parameters<GenerateFakeUserArgs>,
    ) -> Result<GetPromptResult, ErrorData> {
        let span = CapabilitySpan::start("prompt", users::GENERATE_FAKE_USER_PROMPT_ID);
        let messages = users::fake_user_messages(&args);
        span.finish("ok");
        Ok(GetPromptResult {
            description: None,
            messages,
        })
    }
}

#[tool_handler(router = self.tool_router)]
#[prompt_handler]
impl ServerHandler for UserRegistryServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            instructions: Some((*self.instructions).clone()),
            ..ServerInfo::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(users::list_resources()?))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult::with_all_items(
            users::list_resource_templates()?,
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let span = CapabilitySpan::start("resource", "users");
        let result = users::read_user_resource(&self.repository, &request.uri).await;
        span.finish(if result.is_ok() { "ok" } else { "not_found" });
        result
    }
}
