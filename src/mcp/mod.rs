use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    schemars::JsonSchema,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskline_core::db::Database;
use taskline_core::models::*;
use taskline_core::views::sort::{filter_tasks, sort_tasks, SortConfig, TaskFilter};
use taskline_core::{dates, StoreError};

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTasksRequest {
    #[schemars(description = "Restrict to one project id")]
    pub project_id: Option<String>,
    #[schemars(description = "Case-insensitive substring match on the task name")]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskRequest {
    #[schemars(description = "The primary project id for the task")]
    pub project_id: String,
    #[schemars(description = "The task name")]
    pub name: String,
    #[schemars(description = "Task type tag, e.g. 'Urgent'")]
    pub task_type: Option<String>,
    #[schemars(description = "Task status tag, e.g. 'Must do'")]
    pub status: Option<String>,
    #[schemars(description = "Due date display string, e.g. '5/Mar' or 'tomorrow'")]
    pub due_date: Option<String>,
    #[schemars(description = "Start date display string")]
    pub start_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetTaskStatusRequest {
    #[schemars(description = "The task id to update")]
    pub task_id: String,
    #[schemars(description = "The new status name; the configured Done label completes the task")]
    pub status: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DueSoonRequest {
    #[schemars(description = "Working-day horizon; defaults to 5")]
    pub within_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DueTask {
    pub task: Task,
    pub working_days_remaining: i64,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }

    fn store_err(e: StoreError) -> McpError {
        McpError::internal_error(e.to_string(), None)
    }

    fn sorted_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, McpError> {
        let mut tasks = filter_tasks(self.db.list_tasks().map_err(Self::store_err)?, filter);
        let config = SortConfig::new(
            &self.db.list_task_types().map_err(Self::store_err)?,
            &self.db.list_task_statuses().map_err(Self::store_err)?,
            self.db.done_label().map_err(Self::store_err)?,
        );
        sort_tasks(&mut tasks, &config, dates::today());
        Ok(tasks)
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "List all projects")]
    async fn list_projects(&self) -> Result<CallToolResult, McpError> {
        let projects = self.db.list_projects().map_err(Self::store_err)?;
        let json = serde_json::to_string_pretty(&projects)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List tasks in display order, optionally scoped to a project or search")]
    async fn list_tasks(
        &self,
        params: Parameters<ListTasksRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let mut filter = TaskFilter {
            search: req.search,
            ..Default::default()
        };
        if let Some(project_id) = req.project_id.as_deref() {
            filter.project_ids = vec![Self::parse_uuid(project_id)?];
        }

        let tasks = self.sorted_tasks(&filter)?;
        let json = serde_json::to_string_pretty(&tasks)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Create a task in a project")]
    async fn create_task(
        &self,
        params: Parameters<CreateTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let project_id = Self::parse_uuid(&req.project_id)?;

        let task = self
            .db
            .create_task(CreateTaskInput {
                project_id,
                name: req.name,
                task_type: req.task_type,
                status: req.status,
                start_date: req.start_date,
                due_date: req.due_date,
                notes: None,
                project_ids: Vec::new(),
                person_ids: Vec::new(),
            })
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Task created with id: {}",
            task.id
        ))]))
    }

    #[tool(description = "Set a task's status; the configured Done label stamps completion")]
    async fn set_task_status(
        &self,
        params: Parameters<SetTaskStatusRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let task_id = Self::parse_uuid(&req.task_id)?;

        let updated = self
            .db
            .update_task(
                task_id,
                UpdateTaskInput {
                    status: Some(req.status),
                    ..Default::default()
                },
            )
            .map_err(Self::store_err)?;

        if !updated {
            return Err(McpError::invalid_params("Task not found", None));
        }

        Ok(CallToolResult::success(vec![Content::text(
            "Task status updated",
        )]))
    }

    #[tool(description = "List tasks due within a working-day horizon, overdue included")]
    async fn due_soon(
        &self,
        params: Parameters<DueSoonRequest>,
    ) -> Result<CallToolResult, McpError> {
        let within = params.0.within_days.unwrap_or(5);
        let today = dates::today();
        let done_label = self.db.done_label().map_err(Self::store_err)?;

        let due: Vec<DueTask> = self
            .sorted_tasks(&TaskFilter::default())?
            .into_iter()
            .filter(|t| t.status.as_deref() != Some(done_label.as_str()))
            .filter_map(|task| {
                let remaining = dates::working_days_until_due(task.due_date.as_deref()?, today)?;
                (remaining <= within).then_some(DueTask {
                    task,
                    working_days_remaining: remaining,
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&due)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Taskline MCP server for project and task tracking".into()),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
