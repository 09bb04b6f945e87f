// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON-RPC 2.0 tool server (MCP dialect) over the sync engine.
//!
//! Tools:
//! - `get_activities` (optional `filter`, `before`, `after`)
//! - `get_activity_stream` (required `activity_id`)
//! - `refresh_activities` (callable, not advertised in `tools/list`)

use crate::error::AppError;
use crate::models::{Activity, ReconciledStream};
use crate::time_utils::parse_date_range;
use crate::AppState;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// JSON-RPC 2.0 version string
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision we speak.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Standard JSON-RPC error codes
pub mod error_codes {
    /// Parse error - Invalid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Method (or tool) not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 Response; exactly one of `result` or `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }

    /// Response for a line that was not valid JSON-RPC.
    pub fn parse_error() -> Self {
        Self::error(None, error_codes::PARSE_ERROR, "Parse error")
    }
}

/// Dispatches JSON-RPC requests to the engine.
#[derive(Clone)]
pub struct McpServer {
    state: Arc<AppState>,
}

impl McpServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if req.method.starts_with("notifications/") {
            tracing::debug!(method = %req.method, "Notification received");
            return None;
        }

        let id = req.id.clone();
        let response = match req.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result()),
            "tools/list" => JsonRpcResponse::success(id, tool_list()),
            "tools/call" => self.handle_tool_call(id, req.params).await,
            other => {
                tracing::debug!(method = other, "Unknown method");
                JsonRpcResponse::error(id, error_codes::METHOD_NOT_FOUND, "Method not found")
            }
        };
        Some(response)
    }

    /// Handle one raw input line; `None` for notifications and blank lines.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        if line.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(req) => self.handle_request(req).await,
            Err(e) => {
                tracing::warn!(error = %e, "JSON parse error");
                Some(JsonRpcResponse::parse_error())
            }
        }
    }

    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let Some(Value::Object(params)) = params else {
            return JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, "Invalid params");
        };

        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, "Missing tool name");
        };

        let empty = Map::new();
        let arguments = params
            .get("arguments")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        tracing::info!(tool = tool_name, "Tool call");
        let cancel = CancellationToken::new();

        let result = match tool_name {
            "get_activities" => self.get_activities(arguments, &cancel).await,
            "get_activity_stream" => self.get_activity_stream(arguments, &cancel).await,
            "refresh_activities" => self.refresh_activities(&cancel).await,
            _ => {
                return JsonRpcResponse::error(id, error_codes::METHOD_NOT_FOUND, "Tool not found")
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(ToolError { context, error }) => {
                let message = match (&error, context) {
                    (AppError::BadRequest(msg), _) => msg.clone(),
                    (e, Some(context)) => format!("{}: {}", context, e),
                    (e, None) => e.to_string(),
                };
                JsonRpcResponse::error(id, error.rpc_code(), message)
            }
        }
    }

    async fn get_activities(
        &self,
        arguments: &Map<String, Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let filter = arguments
            .get("filter")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let (before, after) = parse_date_range(
            arguments.get("before").and_then(Value::as_str),
            arguments.get("after").and_then(Value::as_str),
        )?;

        let activities = self
            .state
            .engine
            .get_all_activities(filter, before, after, cancel)
            .await
            .map_err(|e| ToolError::context("Failed to get activities", e))?;

        let mut summary = format!("Retrieved {} activities", activities.len());
        let mut filters = Vec::new();
        if !filter.is_empty() {
            filters.push(format!("type: {}", filter));
        }
        if let Some(after) = after {
            filters.push(format!("after: {}", after.format("%Y-%m-%d")));
        }
        if let Some(before) = before {
            filters.push(format!("before: {}", before.format("%Y-%m-%d")));
        }
        if !filters.is_empty() {
            summary.push_str(&format!(" (filtered by {})", filters.join(", ")));
        }

        let mut content = vec![text_item(summary)];
        content.extend(activities.iter().map(|a| text_item(format_activity(a))));

        Ok(json!({
            "content": content,
            "data": activities,
        }))
    }

    async fn get_activity_stream(
        &self,
        arguments: &Map<String, Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let id = arguments
            .get("activity_id")
            .and_then(|v| match v {
                Value::String(s) => s.trim().parse::<u64>().ok(),
                Value::Number(n) => n.as_u64(),
                _ => None,
            })
            .ok_or_else(|| {
                AppError::BadRequest("Missing or invalid activity_id parameter".to_string())
            })?;

        let stream = self
            .state
            .reconciler
            .get_reconciled_stream(id, cancel)
            .await
            .map_err(|e| ToolError::context("Failed to retrieve activity stream data", e))?;

        Ok(json!({
            "content": [text_item(format_stream_summary(&stream))],
            "stream_data": stream,
        }))
    }

    async fn refresh_activities(&self, cancel: &CancellationToken) -> Result<Value, ToolError> {
        let summary = self
            .state
            .engine
            .refresh(cancel)
            .await
            .map_err(|e| ToolError::context("Failed to refresh activities", e))?;

        Ok(json!({
            "content": [text_item(format!(
                "Activities refreshed successfully from Strava API ({} new activities, {} new streams)",
                summary.new_activities, summary.new_streams
            ))],
        }))
    }
}

/// Engine error plus the tool-specific prefix for its message.
struct ToolError {
    context: Option<&'static str>,
    error: AppError,
}

impl ToolError {
    fn context(context: &'static str, error: AppError) -> Self {
        Self {
            context: Some(context),
            error,
        }
    }
}

impl From<AppError> for ToolError {
    fn from(error: AppError) -> Self {
        Self {
            context: None,
            error,
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": "strava-mirror",
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

fn tool_list() -> Value {
    json!({
        "tools": [
            {
                "name": "get_activities",
                "description": "Get all activities with optional filtering (runs, rides, swims, etc.)",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "filter": {
                            "type": "string",
                            "description": "Activity type to leave out (e.g., 'Run', 'Ride', 'Swim')"
                        },
                        "before": {
                            "type": "string",
                            "description": "Return activities before this date (ISO 8601 format)"
                        },
                        "after": {
                            "type": "string",
                            "description": "Return activities after this date (ISO 8601 format)"
                        }
                    }
                }
            },
            {
                "name": "get_activity_stream",
                "description": "Get detailed stream data for a specific activity (time, heart rate, power, cadence)",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "activity_id": {
                            "type": "string",
                            "description": "The ID of the activity"
                        }
                    },
                    "required": ["activity_id"]
                }
            }
        ]
    })
}

fn text_item(text: String) -> Value {
    json!({ "type": "text", "text": text })
}

/// Human-readable activity card.
pub fn format_activity(activity: &Activity) -> String {
    let mut out = format!("🏃 {} (ID: {})\n", activity.name, activity.id);

    if !activity.activity_type.is_empty() {
        let _ = writeln!(out, "   Type: {}", activity.activity_type);
    }
    if let Some(distance) = activity.distance.filter(|d| *d > 0.0) {
        let _ = writeln!(out, "   Distance: {:.2} km", distance / 1000.0);
    }
    if let Some(moving) = activity.moving_time.filter(|t| *t > 0) {
        let (hours, minutes, seconds) = (moving / 3600, (moving % 3600) / 60, moving % 60);
        if hours > 0 {
            let _ = writeln!(out, "   Duration: {}h {}m {}s", hours, minutes, seconds);
        } else {
            let _ = writeln!(out, "   Duration: {}m {}s", minutes, seconds);
        }
    }
    if let Some(hr) = activity.average_heartrate {
        let _ = writeln!(out, "   Avg heart rate: {:.2} bpm", hr);
    }
    if let Some(speed) = activity.average_speed.filter(|s| *s > 0.0) {
        let _ = writeln!(out, "   Avg Speed: {:.2} km/h", speed * 3.6);
    }
    if let Some(speed) = activity.max_speed.filter(|s| *s > 0.0) {
        let _ = writeln!(out, "   Max Speed: {:.2} km/h", speed * 3.6);
    }
    if let Some(watts) = activity.average_watts {
        let _ = writeln!(out, "   Average Watts (Power): {:.2}", watts);
    }
    if let Some(watts) = activity.weighted_average_watts {
        let _ = writeln!(out, "   Weighted Average Watts (Power): {:.0}", watts);
    }
    if let Some(gain) = activity.total_elevation_gain.filter(|g| *g > 0.0) {
        let _ = writeln!(out, "   Elevation Gain: {:.0} m", gain);
    }
    if !activity.start_date.is_empty() {
        let _ = writeln!(out, "   Date: {}", activity.start_date);
    }
    if let Some([lat, lng, ..]) = activity.start_latlng.as_deref() {
        let _ = writeln!(out, "   Start Location: {:.6}, {:.6}", lat, lng);
    }

    out
}

fn format_stream_summary(stream: &ReconciledStream) -> String {
    let mut text = if stream.activity_name.is_empty() {
        format!("Retrieved stream data for activity {}", stream.activity_id)
    } else {
        format!(
            "Retrieved stream data for '{}' (ID: {})",
            stream.activity_name, stream.activity_id
        )
    };
    let _ = write!(text, "\n- {} data points collected", stream.streams.len());

    if let Some(first) = stream.streams.first() {
        let kinds: Vec<&str> = [
            (first.time.is_some(), "time"),
            (first.watts.is_some(), "power"),
            (first.heartrate.is_some(), "heart rate"),
            (first.cadence.is_some(), "cadence"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect();

        if !kinds.is_empty() {
            let _ = write!(text, "\n- Available data: {}", kinds.join(", "));
        }
    }

    text
}
