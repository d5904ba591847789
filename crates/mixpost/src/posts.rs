use colored::Colorize;
use mixpost_core::fields::{
    create_post_body, post_filter_query, update_post_body, validate_schedule, validate_status,
    with_limit, AdditionalFields, CreatePost, FieldError, ListFilters, ListScope, UpdateFields,
};
use mixpost_core::pagination::page_items;
use mixpost_core::types::Post;
use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::client::MixpostClient;
use crate::params::ItemParams;
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "posts")]
#[command(about = "Create, list, edit and publish posts")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Create a new post
    #[clap(name = "create")]
    Create(CreateOptions),

    /// List posts
    #[clap(name = "list")]
    List(ListOptions),

    /// Get a post
    #[clap(name = "get")]
    Get(PostIdOptions),

    /// Update a post
    #[clap(name = "update")]
    Update(UpdateOptions),

    /// Delete a post
    #[clap(name = "delete")]
    Delete(PostIdOptions),

    /// Publish a post immediately
    #[clap(name = "publish")]
    Publish(PostIdOptions),
}

#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Draft a post for two accounts:
  mixpost posts create \"We are live!\" --accounts 1,2

  # Schedule a post with an image:
  mixpost posts create \"Launch\" --accounts 1 --media 7 --status scheduled --scheduled-at \"2026-03-01 09:30\"")]
pub struct CreateOptions {
    /// Post content
    pub content: String,

    /// Account IDs to post to (comma separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub accounts: Vec<u64>,

    /// Media IDs to attach (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub media: Option<Vec<u64>>,

    /// When to publish (RFC 3339 or YYYY-MM-DD HH:MM:SS)
    #[arg(long)]
    pub scheduled_at: Option<String>,

    /// Post status
    #[arg(long, value_parser = ["draft", "scheduled"])]
    pub status: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Fetch every page instead of a single page of --limit posts
    #[arg(long)]
    pub all: bool,

    /// Maximum number of posts to return (1-100)
    #[arg(short, long, default_value = "50")]
    pub limit: u32,

    /// Only posts with this status
    #[arg(long, value_parser = ["draft", "scheduled", "published", "failed"])]
    pub status: Option<String>,

    /// Only posts for this account ID
    #[arg(long)]
    pub account_id: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct PostIdOptions {
    /// Post ID
    pub post_id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct UpdateOptions {
    /// Post ID
    pub post_id: u64,

    /// New content
    #[arg(long)]
    pub content: Option<String>,

    /// New account IDs (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub accounts: Option<Vec<u64>>,

    /// New media IDs (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub media: Option<Vec<u64>>,

    /// New publish time
    #[arg(long)]
    pub scheduled_at: Option<String>,

    /// New status
    #[arg(long, value_parser = ["draft", "scheduled"])]
    pub status: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CreateOptions {
    fn to_params(&self) -> ItemParams {
        let mut additional = Map::new();
        if let Some(media) = &self.media {
            additional.insert("media".into(), json!(media));
        }
        if let Some(scheduled_at) = &self.scheduled_at {
            additional.insert("scheduled_at".into(), json!(scheduled_at));
        }
        if let Some(status) = &self.status {
            additional.insert("status".into(), json!(status));
        }

        ItemParams::from(json!({
            "content": self.content,
            "accounts": self.accounts,
            "additionalFields": additional,
        }))
    }
}

impl ListOptions {
    fn to_params(&self) -> ItemParams {
        let mut filters = Map::new();
        if let Some(status) = &self.status {
            filters.insert("status".into(), json!(status));
        }
        if let Some(account_id) = self.account_id {
            filters.insert("account_id".into(), json!(account_id));
        }

        ItemParams::from(json!({
            "returnAll": self.all,
            "limit": self.limit,
            "filters": filters,
        }))
    }
}

impl UpdateOptions {
    fn to_params(&self) -> ItemParams {
        let mut fields = Map::new();
        if let Some(content) = &self.content {
            fields.insert("content".into(), json!(content));
        }
        if let Some(accounts) = &self.accounts {
            fields.insert("accounts".into(), json!(accounts));
        }
        if let Some(media) = &self.media {
            fields.insert("media".into(), json!(media));
        }
        if let Some(scheduled_at) = &self.scheduled_at {
            fields.insert("scheduled_at".into(), json!(scheduled_at));
        }
        if let Some(status) = &self.status {
            fields.insert("status".into(), json!(status));
        }

        ItemParams::from(json!({ "postId": self.post_id, "updateFields": fields }))
    }
}

impl PostIdOptions {
    fn to_params(&self) -> ItemParams {
        ItemParams::from(json!({ "postId": self.post_id }))
    }
}

// --- Data functions (used by the dispatcher, CLI and MCP) ---

fn read_create_post(params: &ItemParams) -> std::result::Result<CreatePost, FieldError> {
    let additional = params.collection("additionalFields")?;

    let scheduled_at = additional.optional_string("scheduled_at")?;
    if let Some(when) = &scheduled_at {
        validate_schedule(when)?;
    }

    let status = additional.optional_string("status")?;
    if let Some(status) = &status {
        validate_status("additionalFields.status", status)?;
    }

    Ok(CreatePost {
        content: params.required_string("content")?,
        accounts: params.ids("accounts")?,
        additional: AdditionalFields {
            media: additional.optional_ids("media")?,
            scheduled_at,
            status,
        },
    })
}

fn read_update_fields(params: &ItemParams) -> std::result::Result<UpdateFields, FieldError> {
    let fields = params.collection("updateFields")?;

    let scheduled_at = fields.optional_string("scheduled_at")?;
    if let Some(when) = &scheduled_at {
        validate_schedule(when)?;
    }

    let status = fields.optional_string("status")?;
    if let Some(status) = &status {
        validate_status("updateFields.status", status)?;
    }

    Ok(UpdateFields {
        content: fields.optional_string("content")?,
        accounts: fields.optional_ids("accounts")?,
        media: fields.optional_ids("media")?,
        scheduled_at,
        status,
    })
}

fn read_filters(params: &ItemParams) -> std::result::Result<ListFilters, FieldError> {
    let filters = params.collection("filters")?;

    let status = filters.optional_string("status")?;
    if let Some(status) = &status {
        validate_status("filters.status", status)?;
    }

    Ok(ListFilters {
        status,
        account_id: filters.optional_id("account_id")?,
    })
}

/// posts:create - `POST /posts`
pub async fn create_post_data(client: &MixpostClient, params: &ItemParams) -> ApiResult<Value> {
    let post = read_create_post(params)?;
    client.post("/posts", &create_post_body(&post)).await
}

/// posts:list - one page of `limit` posts, or every page when `returnAll` is set
pub async fn list_posts_data(client: &MixpostClient, params: &ItemParams) -> ApiResult<Vec<Value>> {
    let query = post_filter_query(&read_filters(params)?);

    match params.list_scope()? {
        ListScope::All => {
            client
                .request_all_items(Method::GET, "/posts", None, &query)
                .await
        }
        ListScope::Limit(limit) => {
            let response = client.get("/posts", &with_limit(query, limit)).await?;
            Ok(page_items(&response))
        }
    }
}

/// posts:get - `GET /posts/{id}`
pub async fn get_post_data(client: &MixpostClient, params: &ItemParams) -> ApiResult<Value> {
    let post_id = params.id("postId")?;
    client.get(&format!("/posts/{post_id}"), &Map::new()).await
}

/// posts:update - `PUT /posts/{id}` with only the fields that were set
pub async fn update_post_data(client: &MixpostClient, params: &ItemParams) -> ApiResult<Value> {
    let post_id = params.id("postId")?;
    let fields = read_update_fields(params)?;
    client
        .put(&format!("/posts/{post_id}"), &update_post_body(&fields))
        .await
}

/// posts:delete - the server's reply is discarded; success is reported as `{success, id}`
/// with `id` echoed exactly as the record supplied it.
pub async fn delete_post_data(client: &MixpostClient, params: &ItemParams) -> ApiResult<Value> {
    let post_id = params.id("postId")?;
    client.delete(&format!("/posts/{post_id}")).await?;
    Ok(json!({ "success": true, "id": params.raw("postId") }))
}

/// posts:publish - `POST /posts/{id}/publish`
pub async fn publish_post_data(client: &MixpostClient, params: &ItemParams) -> ApiResult<Value> {
    let post_id = params.id("postId")?;
    client
        .request(
            Method::POST,
            &format!("/posts/{post_id}/publish"),
            None,
            &Map::new(),
        )
        .await
}

// --- CLI ---

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let client = global.client()?;

    if global.verbose {
        eprintln!("Running posts command against {}", client.credentials().base_url);
    }

    match app.command {
        Commands::Create(options) => {
            let post = create_post_data(&client, &options.to_params()).await?;
            print_post(&post, options.json)
        }
        Commands::List(options) => {
            let posts = list_posts_data(&client, &options.to_params()).await?;
            print_posts(&posts, options.json)
        }
        Commands::Get(options) => {
            let post = get_post_data(&client, &options.to_params()).await?;
            print_post(&post, options.json)
        }
        Commands::Update(options) => {
            let post = update_post_data(&client, &options.to_params()).await?;
            print_post(&post, options.json)
        }
        Commands::Delete(options) => {
            let result = delete_post_data(&client, &options.to_params()).await?;
            if options.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{} {}", "Deleted post".green().bold(), options.post_id);
            }
            Ok(())
        }
        Commands::Publish(options) => {
            let post = publish_post_data(&client, &options.to_params()).await?;
            print_post(&post, options.json)
        }
    }
}

/// Some endpoints wrap the entity in `{"data": {...}}`
fn unwrap_data(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}

fn print_post(value: &Value, json: bool) -> Result<()> {
    let post = match serde_json::from_value::<Post>(unwrap_data(value).clone()) {
        Ok(post) if !json => post,
        _ => {
            println!("{}", serde_json::to_string_pretty(value)?);
            return Ok(());
        }
    };

    std::println!(
        "\n{} {}\n",
        format!("Post #{}", post.id).bold().cyan(),
        post.status.as_str().green()
    );

    let mut table = new_table();
    if let Some(scheduled_at) = &post.scheduled_at {
        table.add_row(prettytable::row![
            "Scheduled".bold().cyan(),
            scheduled_at.yellow().to_string()
        ]);
    }
    if let Some(published_at) = &post.published_at {
        table.add_row(prettytable::row![
            "Published".bold().cyan(),
            published_at.green().to_string()
        ]);
    }
    if !post.accounts.is_empty() {
        let accounts = post
            .accounts
            .iter()
            .map(|a| format!("{} ({})", a.name, a.platform.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(prettytable::row!["Accounts".bold().cyan(), accounts.bright_magenta().to_string()]);
    }
    if !post.media.is_empty() {
        let media = post
            .media
            .iter()
            .map(|m| m.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(prettytable::row!["Media".bold().cyan(), media.bright_blue().to_string()]);
    }
    if !post.tags.is_empty() {
        let tags = post
            .tags
            .iter()
            .map(|t| t.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(prettytable::row!["Tags".bold().cyan(), tags.bright_green().to_string()]);
    }
    if let Some(created_at) = &post.created_at {
        table.add_row(prettytable::row![
            "Created".bold().cyan(),
            created_at.bright_black().to_string()
        ]);
    }
    table.printstd();

    if !post.content.is_empty() {
        std::println!("\n{}:\n{}\n", "Content".bold().cyan(), post.content);
    }

    Ok(())
}

fn print_posts(posts: &[Value], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(posts)?);
        return Ok(());
    }

    println!("Found {} post(s):\n", posts.len());
    if posts.is_empty() {
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Status".bold().cyan(),
        "Scheduled".bold().cyan(),
        "Content".bold().cyan()
    ]);

    for value in posts {
        match serde_json::from_value::<Post>(value.clone()) {
            Ok(post) => {
                table.add_row(prettytable::row![
                    post.id.to_string().green().to_string(),
                    post.status.as_str(),
                    post.scheduled_at.unwrap_or_default().bright_black().to_string(),
                    preview(&post.content, 60)
                ]);
            }
            Err(e) => log::debug!("skipping unreadable post row: {e}"),
        }
    }

    table.printstd();
    Ok(())
}

fn preview(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= width && !text.contains('\n') {
        return line.to_string();
    }
    let cut: String = line.chars().take(width.saturating_sub(1)).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client_for;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_read_create_post_rejects_bad_schedule() {
        let params = ItemParams::from(json!({
            "content": "x",
            "accounts": [1],
            "additionalFields": {"scheduled_at": "tomorrow-ish"}
        }));

        let err = read_create_post(&params).unwrap_err();
        assert!(err.to_string().contains("scheduled_at"));
    }

    #[test]
    fn test_read_create_post_requires_accounts() {
        let params = ItemParams::from(json!({"content": "x"}));
        assert_eq!(
            read_create_post(&params),
            Err(FieldError::Missing("accounts".to_string()))
        );
    }

    #[test]
    fn test_read_update_fields_skips_empty_values() {
        let params = ItemParams::from(json!({
            "postId": 3,
            "updateFields": {"content": "", "scheduled_at": "", "media": [4]}
        }));

        let fields = read_update_fields(&params).unwrap();

        assert_eq!(
            fields,
            UpdateFields {
                media: Some(vec![4]),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_preview_truncates_long_content() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghijkl", 5), "abcd…");
        assert_eq!(preview("line one\nline two", 40), "line one…");
    }

    #[tokio::test]
    async fn test_create_with_schedule_and_media() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/mixpost/posts"))
            .and(body_json(json!({
                "content": "Launch",
                "accounts": [1],
                "status": "scheduled",
                "media": [7],
                "scheduled_at": "2026-03-01 09:30"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let options = CreateOptions {
            content: "Launch".to_string(),
            accounts: vec![1],
            media: Some(vec![7]),
            scheduled_at: Some("2026-03-01 09:30".to_string()),
            status: Some("scheduled".to_string()),
            json: true,
        };

        let response = create_post_data(&client_for(&server), &options.to_params())
            .await
            .unwrap();
        assert_eq!(response["id"], 1);
    }

    #[tokio::test]
    async fn test_list_all_walks_pages_with_filters() {
        let server = MockServer::start().await;
        for page in 1..=2u32 {
            Mock::given(method("GET"))
                .and(path("/api/mixpost/posts"))
                .and(query_param("page", page.to_string()))
                .and(query_param("per_page", "50"))
                .and(query_param("status", "published"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": [{"id": page}],
                    "meta": {"current_page": page, "last_page": 2}
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let options = ListOptions {
            all: true,
            limit: 50,
            status: Some("published".to_string()),
            account_id: None,
            json: true,
        };

        let posts = list_posts_data(&client_for(&server), &options.to_params())
            .await
            .unwrap();
        assert_eq!(posts, vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[tokio::test]
    async fn test_update_sends_partial_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/mixpost/posts/8"))
            .and(body_json(json!({"accounts": [2, 3], "status": "draft"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 8})))
            .expect(1)
            .mount(&server)
            .await;

        let options = UpdateOptions {
            post_id: 8,
            content: None,
            accounts: Some(vec![2, 3]),
            media: None,
            scheduled_at: None,
            status: Some("draft".to_string()),
            json: true,
        };

        update_post_data(&client_for(&server), &options.to_params())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_echoes_post_id_as_given() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/mixpost/posts/6"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let params = ItemParams::from(json!({"postId": "6"}));
        let record = delete_post_data(&client_for(&server), &params)
            .await
            .unwrap();

        assert_eq!(record, json!({"success": true, "id": "6"}));
    }
}
