//! Workflow runner
//!
//! Executes one operation over a batch of records described by a JSON document:
//!
//! ```json
//! {
//!   "resource": "posts",
//!   "operation": "create",
//!   "items": [{"params": {"content": "Hello", "accounts": [1, 2]}}]
//! }
//! ```
//!
//! The output record array is printed to stdout as pretty JSON.

use std::path::PathBuf;

use mixpost_core::operation::{Operation, OperationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncReadExt;

use crate::client::MixpostClient;
use crate::node::{Dispatcher, ExecutionError, InputItem};
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "run")]
#[command(about = "Run an operation over a batch of records from a workflow document")]
pub struct App {
    /// Workflow document; read from stdin when omitted
    pub file: Option<PathBuf>,

    /// Emit an error record for a failing item and keep going
    #[arg(long)]
    pub continue_on_fail: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Workflow {
    pub resource: String,
    pub operation: String,
    #[serde(default)]
    pub items: Vec<InputItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Selector(#[from] OperationError),

    #[error("Item {} failed: {}", .0.item_index, .0.error)]
    Item(#[from] ExecutionError),
}

/// Parse the selectors and run the batch through the dispatcher
pub async fn execute_workflow(
    client: &MixpostClient,
    workflow: &Workflow,
    continue_on_fail: bool,
) -> std::result::Result<Vec<Value>, WorkflowError> {
    let operation = Operation::parse(&workflow.resource, &workflow.operation)?;

    let output = Dispatcher::new(client)
        .continue_on_fail(continue_on_fail)
        .execute(operation, &workflow.items)
        .await?;

    Ok(output)
}

async fn read_workflow(file: Option<&PathBuf>) -> Result<Workflow> {
    let text = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };

    serde_json::from_str(&text).wrap_err("invalid workflow document")
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let workflow = read_workflow(app.file.as_ref()).await?;
    let client = global.client()?;

    if global.verbose {
        eprintln!(
            "Running {}:{} over {} item(s)",
            workflow.resource,
            workflow.operation,
            workflow.items.len()
        );
    }

    let output = execute_workflow(&client, &workflow, app.continue_on_fail).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client_for;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn workflow(value: Value) -> Workflow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_document_shape() {
        let wf = workflow(json!({
            "resource": "media",
            "operation": "upload",
            "items": [{
                "params": {"binaryPropertyName": "image"},
                "binary": {"image": {"fileName": "a.png", "data": "AAEC"}}
            }]
        }));

        assert_eq!(wf.items.len(), 1);
        assert_eq!(
            wf.items[0].binary["image"].file_name.as_deref(),
            Some("a.png")
        );

        let empty = workflow(json!({"resource": "accounts", "operation": "list"}));
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_selector_makes_no_request() {
        let server = MockServer::start().await;
        let wf = workflow(json!({"resource": "posts", "operation": "archive", "items": [{}]}));

        let err = execute_workflow(&client_for(&server), &wf, false)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unknown operation 'archive' for resource 'posts'"
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_item_reports_its_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mixpost/posts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/mixpost/posts/2"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
            .mount(&server)
            .await;

        let wf = workflow(json!({
            "resource": "posts",
            "operation": "get",
            "items": [{"params": {"postId": 1}}, {"params": {"postId": 2}}]
        }));

        let err = execute_workflow(&client_for(&server), &wf, false)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Item 1 failed: Mixpost API Error (404): Resource not found. Verify the ID is correct."
        );

        let output = execute_workflow(&client_for(&server), &wf, true)
            .await
            .unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(output[0], json!({"id": 1}));
        assert!(output[1]["error"].as_str().unwrap().contains("(404)"));
    }

    #[tokio::test]
    async fn test_read_workflow_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("workflow.json");
        tokio::fs::write(&file, r#"{"resource": "accounts", "operation": "list"}"#)
            .await
            .unwrap();

        let wf = read_workflow(Some(&file)).await.unwrap();
        assert_eq!(wf.resource, "accounts");

        let missing = dir.path().join("missing.json");
        assert!(read_workflow(Some(&missing)).await.is_err());
    }
}
