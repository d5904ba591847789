use crate::prelude::{eprintln, *};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub async fn run_stdio(global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Mixpost MCP server listening on stdio");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        log::debug!("<- {message}");

        let Some(response) = super::handle_request(message, &global).await else {
            continue;
        };
        let response_json = serde_json::to_string(&response)?;

        log::debug!("-> {response_json}");

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    if global.verbose {
        eprintln!("stdin closed, shutting down");
    }

    Ok(())
}
