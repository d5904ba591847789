use crate::prelude::*;
use clap::Parser;
use mixpost_core::pagination::DEFAULT_MAX_PAGES;

mod accounts;
mod binary;
mod client;
mod config;
mod error;
mod mcp;
mod media;
mod node;
mod params;
mod posts;
mod prelude;
mod run;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Command line client, workflow runner and MCP server for the Mixpost REST API"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Root URL of the Mixpost installation, e.g. https://mixpost.example.com
    #[clap(long, env = "MIXPOST_BASE_URL", global = true)]
    base_url: Option<String>,

    /// API path appended to the base URL
    #[clap(long, env = "MIXPOST_API_PATH", global = true, default_value = "/api/mixpost")]
    api_path: Option<String>,

    /// Personal access token
    #[clap(long, env = "MIXPOST_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Give up on a "return all" listing after this many pages
    #[clap(long, env = "MIXPOST_MAX_PAGES", global = true, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Whether to display additional information.
    #[clap(long, env = "MIXPOST_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// HTTP client for the configured installation
    pub fn client(&self) -> ApiResult<client::MixpostClient> {
        let credentials = config::Credentials::from_global(self)?;
        Ok(client::MixpostClient::new(credentials)?.with_max_pages(self.max_pages))
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Create, list, update, publish and delete posts
    Posts(crate::posts::App),

    /// Upload and list media
    Media(crate::media::App),

    /// Connected social accounts
    Accounts(crate::accounts::App),

    /// Run an operation over a batch of records from a workflow document
    Run(crate::run::App),

    /// Verify that the credentials can reach the API
    Check,

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Posts(sub_app) => crate::posts::run(sub_app, app.global).await,
        SubCommands::Media(sub_app) => crate::media::run(sub_app, app.global).await,
        SubCommands::Accounts(sub_app) => crate::accounts::run(sub_app, app.global).await,
        SubCommands::Run(sub_app) => crate::run::run(sub_app, app.global).await,
        SubCommands::Check => crate::accounts::check(app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
