mod schema;

use std::collections::BTreeMap;

use mixpost_core::operation::Operation;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::MixpostClient;
use crate::node::{error_record, Dispatcher, InputItem};
use crate::prelude::{eprintln, *};
use crate::run::{execute_workflow, Workflow};

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

const EXECUTE_TOOL: &str = "mixpost_execute";
const ACCOUNT_OPTIONS_TOOL: &str = "mixpost_account_options";
const MEDIA_OPTIONS_TOOL: &str = "mixpost_media_options";

#[derive(Debug, Clone, Copy, PartialEq)]
enum ToolCall {
    Execute,
    AccountOptions,
    MediaOptions,
    Single(Operation),
}

/// `mixpost_<resource>_<operation>`, e.g. `mixpost_media_download_url`
fn tool_name(operation: Operation) -> String {
    let mut name = format!("mixpost_{}_", operation.resource());
    for c in operation.name().chars() {
        if c.is_ascii_uppercase() {
            name.push('_');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

fn resolve(name: &str) -> Option<ToolCall> {
    match name {
        EXECUTE_TOOL => Some(ToolCall::Execute),
        ACCOUNT_OPTIONS_TOOL => Some(ToolCall::AccountOptions),
        MEDIA_OPTIONS_TOOL => Some(ToolCall::MediaOptions),
        other => Operation::ALL
            .into_iter()
            .find(|op| tool_name(*op) == other)
            .map(ToolCall::Single),
    }
}

fn returns_list(operation: Operation) -> bool {
    matches!(
        operation,
        Operation::ListPosts | Operation::ListMedia | Operation::ListAccounts
    )
}

fn to_rpc_value<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub fn handle_initialize() -> Result<Value, JsonRpcError> {
    to_rpc_value(InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "mixpost".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

pub fn handle_tools_list() -> Result<Value, JsonRpcError> {
    let mut tools = vec![Tool {
        name: EXECUTE_TOOL.to_string(),
        description: "Run one Mixpost operation over a batch of records. Each item carries 'params' (the operation's fields) and optionally 'binary' attachments. Returns the output records in input order. Requires MIXPOST_BASE_URL and MIXPOST_ACCESS_TOKEN.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "resource": {"type": "string", "enum": ["posts", "media", "accounts"]},
                "operation": {
                    "type": "string",
                    "description": "create, list, get, update, delete, publish (posts); upload, downloadUrl, list (media); list (accounts)"
                },
                "items": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "params": {"type": "object"},
                            "binary": {"type": "object"}
                        }
                    }
                },
                "continueOnFail": {
                    "type": "boolean",
                    "description": "Emit an error record for a failing item instead of stopping (default: false)"
                }
            },
            "required": ["resource", "operation"]
        }),
    }];

    tools.extend(Operation::ALL.into_iter().map(|operation| Tool {
        name: tool_name(operation),
        description: format!("{} in Mixpost.", operation.action()),
        input_schema: schema::input_schema(operation),
    }));

    tools.push(Tool {
        name: ACCOUNT_OPTIONS_TOOL.to_string(),
        description: "List connected social accounts as {name: \"<name> (<platform>)\", value: id} pairs.".to_string(),
        input_schema: json!({"type": "object", "properties": {}}),
    });
    tools.push(Tool {
        name: MEDIA_OPTIONS_TOOL.to_string(),
        description: "List uploaded media as {name, value: id} pairs.".to_string(),
        input_schema: json!({"type": "object", "properties": {}}),
    });

    to_rpc_value(ToolsList { tools })
}

pub async fn handle_tools_call(
    params: Option<Value>,
    global: &crate::Global,
) -> Result<Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?;

    let call = resolve(&params.name)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

    if global.verbose {
        eprintln!("Calling {}", params.name);
    }

    // Fresh client per call; concurrent SSE calls share nothing but the flags.
    let client = global
        .client()
        .map_err(|e| JsonRpcError::internal(format!("Tool execution error: {e}")))?;
    let arguments = params.arguments.unwrap_or(Value::Null);

    let outcome = match call {
        ToolCall::Execute => call_execute(&client, arguments).await?,
        ToolCall::AccountOptions => crate::accounts::account_options_data(&client)
            .await
            .map(|options| json!(options))
            .map_err(|e| error_record(&e)),
        ToolCall::MediaOptions => crate::media::media_options_data(&client)
            .await
            .map(|options| json!(options))
            .map_err(|e| error_record(&e)),
        ToolCall::Single(operation) => call_single(&client, operation, arguments).await?,
    };

    let (payload, is_error) = match outcome {
        Ok(value) => (value, None),
        Err(record) => (record, Some(true)),
    };

    let text = serde_json::to_string_pretty(&payload)
        .map_err(|e| JsonRpcError::internal(format!("Serialization error: {e}")))?;

    to_rpc_value(CallToolResult {
        content: vec![Content::Text { text }],
        is_error,
    })
}

type ToolOutcome = std::result::Result<Value, Value>;

async fn call_execute(client: &MixpostClient, arguments: Value) -> Result<ToolOutcome, JsonRpcError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ExecuteArgs {
        #[serde(flatten)]
        workflow: Workflow,
        #[serde(default)]
        continue_on_fail: bool,
    }

    let args: ExecuteArgs = serde_json::from_value(arguments)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments: {e}")))?;

    Ok(execute_workflow(client, &args.workflow, args.continue_on_fail)
        .await
        .map(Value::Array)
        .map_err(|e| json!({ "error": e.to_string() })))
}

async fn call_single(
    client: &MixpostClient,
    operation: Operation,
    arguments: Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let item = input_item(arguments)?;

    let records = match Dispatcher::new(client)
        .execute(operation, std::slice::from_ref(&item))
        .await
    {
        Ok(records) => records,
        Err(failure) => return Ok(Err(error_record(&failure.error))),
    };

    Ok(Ok(match records {
        records if returns_list(operation) => Value::Array(records),
        mut records if records.len() == 1 => records.remove(0),
        records => Value::Array(records),
    }))
}

/// Tool arguments are the record's params; an optional `binary` key carries attachments.
fn input_item(arguments: Value) -> Result<InputItem, JsonRpcError> {
    let mut params = match arguments {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(JsonRpcError::invalid_params(format!(
                "Invalid arguments: expected an object, got {other}"
            )))
        }
    };

    let binary = match params.remove("binary") {
        Some(value) => serde_json::from_value::<BTreeMap<_, _>>(value)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid binary: {e}")))?,
        None => BTreeMap::new(),
    };

    Ok(InputItem { params, binary })
}
