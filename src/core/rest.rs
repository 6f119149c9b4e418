//! REST Dispatcher
//!
//! Plain JSON endpoints: `GET /tools` lists tool definitions and
//! `POST /execute` runs one tool. Both are also mounted under `/mcp`.
//! Errors are returned as problem documents (`application/problem+json`).

use actix_web::{
    HttpRequest, HttpResponse, Result,
    error::{InternalError, JsonPayloadError},
    http::{StatusCode, header::ContentType},
    web,
};
use bytes::Bytes;
use std::convert::Infallible;
use futures_util::stream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::jsonrpc::log_execution_failure;
use super::server::ServerContext;
use super::tool::{ToolDefinition, ToolError};

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Body of `POST /execute`.
#[derive(Deserialize, Debug, Default)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub input: Option<Map<String, Value>>,
}

/// Envelope returned after a successful execution.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExecuteResponse {
    pub tool: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub result: Value,
}

/// Body of `GET /tools`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolListResponse {
    pub tools: Vec<ToolDefinition>,
}

/// Problem description for error responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Problem {
    pub title: String,
    pub status: u16,
    pub detail: String,
}

pub fn problem(status: StatusCode, title: &str, detail: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(PROBLEM_CONTENT_TYPE)
        .json(Problem {
            title: title.to_string(),
            status: status.as_u16(),
            detail: detail.into(),
        })
}

/// Turn body binding failures into 400 problem responses instead of actix's
/// plain-text default.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = problem(StatusCode::BAD_REQUEST, "Invalid request", err.to_string());
    InternalError::from_response(err, response).into()
}

pub async fn list_tools(ctx: web::Data<ServerContext>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ToolListResponse {
        tools: ctx.registry.list(),
    }))
}

pub async fn execute_tool(
    ctx: web::Data<ServerContext>,
    request: web::Json<ExecuteRequest>,
) -> Result<HttpResponse> {
    let ExecuteRequest { tool, input } = request.into_inner();

    let tool_name = match tool.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return Ok(problem(
                StatusCode::BAD_REQUEST,
                "Invalid request",
                "The 'tool' field is required.",
            ));
        }
    };

    let Some(tool) = ctx.registry.get(tool_name) else {
        return Ok(problem(
            StatusCode::NOT_FOUND,
            "Tool not found",
            format!("The tool '{tool_name}' is not registered."),
        ));
    };

    // Cancelled if this handler is dropped (client went away) or on shutdown.
    let cancel = ctx.request_token();
    let _guard = cancel.clone().drop_guard();

    let name = tool.definition().name().to_string();
    let result = match tool.execute(input, &cancel).await {
        Ok(result) => result,
        Err(err) => {
            log_execution_failure(&name, &err);
            return Ok(problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Execution failed",
                "The tool encountered an unexpected error.",
            ));
        }
    };

    let response = ExecuteResponse {
        tool: name,
        content_type: result.content_type,
        result: result.payload,
    };
    let body = match serde_json::to_vec(&response) {
        Ok(body) => body,
        Err(err) => {
            log_execution_failure(&response.tool, &ToolError::from(err));
            return Ok(problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Execution failed",
                "The tool encountered an unexpected error.",
            ));
        }
    };

    Ok(HttpResponse::Ok()
        .insert_header(ContentType::json())
        .streaming(stream::once(async move {
            Ok::<_, Infallible>(Bytes::from(body))
        })))
}
