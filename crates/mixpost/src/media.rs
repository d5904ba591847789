use std::collections::BTreeMap;
use std::path::PathBuf;

use colored::Colorize;
use mixpost_core::fields::{with_limit, FieldError, ListScope, DEFAULT_BINARY_PROPERTY};
use mixpost_core::options::{media_options, OptionEntry};
use mixpost_core::pagination::page_items;
use mixpost_core::types::Media;
use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::binary::BinaryData;
use crate::client::MixpostClient;
use crate::params::ItemParams;
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "media")]
#[command(about = "Upload and list media")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Upload a media file
    #[clap(name = "upload")]
    Upload {
        /// File to upload
        file: PathBuf,

        /// Override the filename sent to Mixpost
        #[arg(long)]
        name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Have Mixpost download media from a URL
    #[clap(name = "download-url")]
    DownloadUrl {
        /// URL of the media file
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List media
    #[clap(name = "list")]
    List {
        /// Fetch every page instead of a single page of --limit items
        #[arg(long)]
        all: bool,

        /// Maximum number of items to return (1-100)
        #[arg(short, long, default_value = "50")]
        limit: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print media names and IDs for pickers
    #[clap(name = "options")]
    Options,
}

// --- Data functions (used by the dispatcher, CLI and MCP) ---

/// media:upload - send the attachment named by `binaryPropertyName` to `/media/upload`
pub async fn upload_media_data(
    client: &MixpostClient,
    params: &ItemParams,
    binary: &BTreeMap<String, BinaryData>,
) -> ApiResult<Value> {
    let property = params
        .optional_string("binaryPropertyName")?
        .unwrap_or_else(|| DEFAULT_BINARY_PROPERTY.to_string());

    let attachment = binary
        .get(&property)
        .ok_or_else(|| Error::MissingBinary(property.clone()))?
        .load(&property)
        .await?;

    client.upload_media(&attachment).await
}

/// media:downloadUrl - `POST /media/download` with `{url}`
pub async fn download_media_url_data(
    client: &MixpostClient,
    params: &ItemParams,
) -> ApiResult<Value> {
    let url = params.required_string("url")?;
    reqwest::Url::parse(&url)
        .map_err(|e| FieldError::invalid("url", format!("'{url}' is not a valid URL: {e}")))?;

    client.post("/media/download", &json!({ "url": url })).await
}

/// media:list - one page of `limit` items, or every page when `returnAll` is set
pub async fn list_media_data(client: &MixpostClient, params: &ItemParams) -> ApiResult<Vec<Value>> {
    match params.list_scope()? {
        ListScope::All => {
            client
                .request_all_items(Method::GET, "/media", None, &Map::new())
                .await
        }
        ListScope::Limit(limit) => {
            let response = client.get("/media", &with_limit(Map::new(), limit)).await?;
            Ok(page_items(&response))
        }
    }
}

/// Media picker entries from a single `GET /media`
pub async fn media_options_data(client: &MixpostClient) -> ApiResult<Vec<OptionEntry>> {
    let response = client.get("/media", &Map::new()).await?;
    Ok(media_options(&response))
}

// --- CLI ---

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let client = global.client()?;

    match app.command {
        Commands::Upload { file, name, json } => {
            if global.verbose {
                eprintln!("Uploading {}", file.display());
            }

            let mut binary = BTreeMap::new();
            binary.insert(
                DEFAULT_BINARY_PROPERTY.to_string(),
                BinaryData {
                    file_name: name,
                    ..BinaryData::from_path(file)
                },
            );

            let media = upload_media_data(&client, &ItemParams::default(), &binary).await?;
            print_media_item(&media, json)
        }
        Commands::DownloadUrl { url, json } => {
            let params = ItemParams::from(json!({ "url": url }));
            let media = download_media_url_data(&client, &params).await?;
            print_media_item(&media, json)
        }
        Commands::List { all, limit, json } => {
            let params = ItemParams::from(json!({ "returnAll": all, "limit": limit }));
            let media = list_media_data(&client, &params).await?;
            print_media_list(&media, json)
        }
        Commands::Options => {
            let options = media_options_data(&client).await?;
            println!("{}", serde_json::to_string_pretty(&options)?);
            Ok(())
        }
    }
}

fn print_media_item(value: &Value, json: bool) -> Result<()> {
    match serde_json::from_value::<Media>(value.clone()) {
        Ok(media) if !json => {
            std::println!(
                "{} {} {}",
                "Media".green().bold(),
                format!("#{}", media.id).bright_white(),
                media.name
            );
            if let Some(url) = &media.url {
                std::println!("  {}", url.bright_blue());
            }
        }
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn print_media_list(items: &[Value], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No media found.");
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Name".bold().cyan(),
        "Type".bold().cyan(),
        "Size".bold().cyan(),
        "Created".bold().cyan()
    ]);

    for media in items
        .iter()
        .filter_map(|v| serde_json::from_value::<Media>(v.clone()).ok())
    {
        table.add_row(prettytable::row![
            media.id.to_string().green().to_string(),
            media.name.bright_white().to_string(),
            media.mime_type.unwrap_or_default().bright_blue().to_string(),
            media.size.map(human_size).unwrap_or_default(),
            media.created_at.unwrap_or_default().bright_black().to_string()
        ]);
    }

    table.printstd();
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
