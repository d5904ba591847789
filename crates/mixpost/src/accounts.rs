use colored::Colorize;
use mixpost_core::options::{account_options, OptionEntry};
use mixpost_core::pagination::page_items;
use mixpost_core::types::Account;
use serde_json::{Map, Value};

use crate::client::MixpostClient;
use crate::prelude::{println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "accounts")]
#[command(about = "Connected social accounts")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List all connected social accounts
    #[clap(name = "list")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print account labels and IDs for pickers
    #[clap(name = "options")]
    Options,
}

/// accounts:list - every connected account, one record each
pub async fn list_accounts_data(client: &MixpostClient) -> ApiResult<Vec<Value>> {
    let response = client.get("/accounts", &Map::new()).await?;
    Ok(page_items(&response))
}

/// Account picker entries labelled `"<name> (<platform>)"`
pub async fn account_options_data(client: &MixpostClient) -> ApiResult<Vec<OptionEntry>> {
    let response = client.get("/accounts", &Map::new()).await?;
    Ok(account_options(&response))
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let client = global.client()?;

    match app.command {
        Commands::List { json } => {
            let accounts = list_accounts_data(&client).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&accounts)?);
                return Ok(());
            }

            if accounts.is_empty() {
                println!("No accounts connected.");
                return Ok(());
            }

            let mut table = new_table();
            table.add_row(prettytable::row![
                "ID".bold().cyan(),
                "Name".bold().cyan(),
                "Platform".bold().cyan(),
                "Username".bold().cyan()
            ]);
            for account in accounts
                .iter()
                .filter_map(|v| serde_json::from_value::<Account>(v.clone()).ok())
            {
                table.add_row(prettytable::row![
                    account.id.to_string().green().to_string(),
                    account.name.bright_white().to_string(),
                    account.platform.as_str().bright_blue().to_string(),
                    account.username.unwrap_or_default().bright_magenta().to_string()
                ]);
            }
            table.printstd();
        }
        Commands::Options => {
            let options = account_options_data(&client).await?;
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }

    Ok(())
}

/// `mixpost check` - exit non-zero when the credentials can't reach `GET /accounts`
pub async fn check(global: crate::Global) -> Result<()> {
    let client = global.client()?;

    if client.validate_connection().await {
        std::println!(
            "{} {}{}",
            "Connected to".green().bold(),
            client.credentials().base_url,
            client.credentials().api_path
        );
        Ok(())
    } else {
        Err(eyre!(
            "Could not reach {} with the configured access token",
            client.credentials().endpoint_url("/accounts")
        ))
    }
}
