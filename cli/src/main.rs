use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use blog_client::config::{ClientConfig, ConfigError};
use blog_client::error::ApiError;
use blog_client::forms::validation::{
    self, ArticleForm, ChangePasswordForm, LoginForm, RegisterForm, UploadKind, ValidationErrors,
};
use blog_client::net::TransportError;
use blog_client::net::types::{
    ArticleListParams, ArticlePatch, ChangePasswordRequest, Comment, CommentListParams, CreateArticleRequest,
    CreateCommentRequest, FileUpload, LoginRequest, Page, PageParams, ProfileUpdate, RegisterRequest,
    UpdateCommentRequest,
};
use blog_client::notify::{NotificationLevel, Notifier};
use blog_client::router::{Location, NavigationError, Navigator};
use blog_client::storage::{FileStorage, StorageError};
use blog_client::BlogClient;
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("session storage: {0}")]
    Storage(#[from] StorageError),
    #[error("http client: {0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("navigation: {0}")]
    Navigation(#[from] NavigationError),
    #[error("read {path} failed: {source}")]
    ReadFile { path: String, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "blog", about = "Blog CMS API client")]
struct Cli {
    #[arg(long, env = "BLOG_API_BASE_URL", default_value = blog_client::config::DEFAULT_API_BASE_URL)]
    base_url: String,

    #[arg(long, env = "BLOG_API_TIMEOUT_MS", default_value_t = blog_client::config::DEFAULT_API_TIMEOUT_MS)]
    timeout_ms: u64,

    #[arg(long, env = "BLOG_SESSION_FILE", help = "Defaults to ~/.blog-client/session.json")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "BLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Logout,
    Whoami,
    Refresh,
    Passwd {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    Profile(ProfileArgs),
    CheckUsername {
        username: String,
    },
    CheckEmail {
        email: String,
    },
    Article(ArticleCommand),
    Comment(CommentCommand),
    Upload(UploadCommand),
    /// Run the navigation guard for a path and print where it lands.
    Route {
        path: String,
    },
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    avatar: Option<String>,
}

#[derive(Args, Debug)]
struct ArticleCommand {
    #[command(subcommand)]
    command: ArticleSubcommand,
}

#[derive(Subcommand, Debug)]
enum ArticleSubcommand {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        author_id: Option<i64>,
        #[arg(long)]
        published: Option<bool>,
    },
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long, help = "Comma-separated tag names")]
        tags: Option<String>,
        #[arg(long, default_value_t = false)]
        draft: bool,
        #[arg(long, default_value_t = false)]
        no_comments: bool,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        published: Option<bool>,
    },
    Delete {
        id: i64,
    },
    Like {
        id: i64,
    },
    Search {
        query: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
}

#[derive(Args, Debug)]
struct CommentCommand {
    #[command(subcommand)]
    command: CommentSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentSubcommand {
    List {
        #[arg(long)]
        article_id: Option<i64>,
        #[arg(long)]
        parent_id: Option<i64>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        article_id: i64,
        #[arg(long)]
        content: String,
        #[arg(long)]
        parent_id: Option<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        content: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct UploadCommand {
    #[command(subcommand)]
    command: UploadSubcommand,
}

#[derive(Subcommand, Debug)]
enum UploadSubcommand {
    Image { path: PathBuf },
    File { path: PathBuf },
}

// =============================================================================
// CONSOLE SEAMS
// =============================================================================

/// Notifications go to stderr so stdout stays machine-readable.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        let tag = match level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{tag}] {message}");
    }
}

/// A terminal has no login view; tell the user how to get one.
struct HintNavigator;

impl Navigator for HintNavigator {
    fn navigate(&self, to: Location) {
        tracing::debug!(location = %to, "forced navigation");
        if to.path == "/login" {
            eprintln!("run `blog login` to sign in again");
        }
    }
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::new(&cli.base_url)?.with_timeout(Duration::from_millis(cli.timeout_ms));
    if let Some(path) = cli.session_file {
        config = config.with_session_file(path);
    }

    let storage = Arc::new(FileStorage::open(&config.session_file)?);
    let mut client = BlogClient::new(config, storage, Arc::new(StderrNotifier), Arc::new(HintNavigator))?;

    run(&mut client, cli.command).await
}

async fn run(client: &mut BlogClient, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { username, password } => {
            LoginForm { username: username.clone(), password: password.clone() }.validate()?;
            let response = client.auth().login(&LoginRequest { username, password }).await?;
            eprintln!("logged in as {}", response.user.username);
            print_json(&serde_json::to_value(&response.user)?)
        }
        Command::Register { username, email, password, confirm_password } => {
            let form = RegisterForm { username, email, password, confirm_password };
            form.validate()?;
            let request = RegisterRequest {
                username: form.username,
                email: form.email,
                password: form.password,
                confirm_password: form.confirm_password,
            };
            let response = client.auth().register(&request).await?;
            print_json(&serde_json::to_value(&response.user)?)
        }
        Command::Logout => {
            client.logout().await;
            eprintln!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = client.init().await;
            print_json(&serde_json::to_value(&user)?)
        }
        Command::Refresh => {
            client.auth().refresh_access_token().await?;
            eprintln!("access token refreshed");
            Ok(())
        }
        Command::Passwd { current, new, confirm } => {
            let form = ChangePasswordForm { current_password: current, new_password: new, confirm_password: confirm };
            form.validate()?;
            let request = ChangePasswordRequest {
                current_password: form.current_password,
                new_password: form.new_password,
            };
            client.auth().change_password(&request).await?;
            eprintln!("password changed");
            Ok(())
        }
        Command::Profile(args) => {
            if let Some(email) = &args.email {
                if !validation::is_valid_email(email) {
                    let mut errors = ValidationErrors::new();
                    errors.add("email", "Please enter a valid email address");
                    return Err(errors.into());
                }
            }
            let update = ProfileUpdate {
                email: args.email,
                display_name: args.display_name,
                bio: args.bio,
                website: args.website,
                location: args.location,
                avatar: args.avatar,
            };
            let user = client.auth().update_profile(&update).await?;
            print_json(&serde_json::to_value(&user)?)
        }
        Command::CheckUsername { username } => {
            let available = client.auth().check_username(&username).await?;
            print_json(&json!({ "username": username, "available": available }))
        }
        Command::CheckEmail { email } => {
            let available = client.auth().check_email(&email).await?;
            print_json(&json!({ "email": email, "available": available }))
        }
        Command::Route { path } => {
            let landed = client.router_mut().push_path(&path).await?;
            print_json(&json!({
                "requested": path,
                "path": landed.path,
                "query": landed.query,
                "full_path": landed.full_path(),
            }))
        }
        Command::Article(article) => run_article(client, article).await,
        Command::Comment(comment) => run_comment(client, comment).await,
        Command::Upload(upload) => run_upload(client, upload).await,
    }
}

async fn run_article(client: &mut BlogClient, article: ArticleCommand) -> Result<(), CliError> {
    match article.command {
        ArticleSubcommand::List { page, per_page, search, tag, author_id, published } => {
            let params = ArticleListParams { page, per_page, search, tag, author_id, is_published: published };
            let store = client.articles_mut();
            let pagination = store.fetch_articles(&params).await?;
            print_json(&json!({ "items": store.articles, "pagination": pagination }))
        }
        ArticleSubcommand::Get { id } => {
            let article = client.articles_mut().fetch_article(id).await?;
            print_json(&serde_json::to_value(&article)?)
        }
        ArticleSubcommand::Create { title, content, summary, tags, draft, no_comments } => {
            let form = ArticleForm { title, content, summary, tags };
            form.validate()?;
            let tag_names = form.tag_names();
            let data = CreateArticleRequest {
                title: form.title,
                content: form.content,
                summary: form.summary,
                is_published: Some(!draft),
                allow_comments: Some(!no_comments),
                featured_image: None,
                tags: (!tag_names.is_empty()).then_some(tag_names),
            };
            let created = client.articles_mut().create_article(&data).await?;
            print_json(&serde_json::to_value(&created)?)
        }
        ArticleSubcommand::Update { id, title, content, summary, tags, published } => {
            let tags = tags.map(|raw| ArticleForm { tags: Some(raw), ..ArticleForm::default() }.tag_names());
            let patch = ArticlePatch { title, content, summary, is_published: published, tags, ..ArticlePatch::default() };
            let updated = client.articles_mut().update_article(id, &patch).await?;
            print_json(&serde_json::to_value(&updated)?)
        }
        ArticleSubcommand::Delete { id } => {
            client.articles_mut().delete_article(id).await?;
            print_json(&json!({ "deleted": id }))
        }
        ArticleSubcommand::Like { id } => {
            let result = client.articles_mut().like_article(id).await?;
            print_json(&serde_json::to_value(result)?)
        }
        ArticleSubcommand::Search { query, page, per_page } => {
            validation::validate_search(&query)?;
            let store = client.articles_mut();
            let pagination = store.search_articles(&query, PageParams { page, per_page }).await?;
            print_json(&json!({ "items": store.articles, "pagination": pagination }))
        }
    }
}

async fn run_comment(client: &BlogClient, comment: CommentCommand) -> Result<(), CliError> {
    let api = client.comments();
    match comment.command {
        CommentSubcommand::List { article_id, parent_id, page, per_page } => {
            let page = api.list(&CommentListParams { article_id, page, per_page, parent_id }).await?;
            print_page(page)
        }
        CommentSubcommand::Get { id } => print_json(&serde_json::to_value(api.get(id).await?)?),
        CommentSubcommand::Create { article_id, content, parent_id } => {
            validation::validate_comment(&content)?;
            let created = api.create(&CreateCommentRequest { content, article_id, parent_id }).await?;
            print_json(&serde_json::to_value(created)?)
        }
        CommentSubcommand::Update { id, content } => {
            validation::validate_comment(&content)?;
            let updated = api.update(id, &UpdateCommentRequest { content }).await?;
            print_json(&serde_json::to_value(updated)?)
        }
        CommentSubcommand::Delete { id } => {
            api.delete(id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

async fn run_upload(client: &BlogClient, upload: UploadCommand) -> Result<(), CliError> {
    let (kind, path) = match upload.command {
        UploadSubcommand::Image { path } => (UploadKind::Image, path),
        UploadSubcommand::File { path } => (UploadKind::File, path),
    };
    let file = read_upload(&path, kind).await?;
    let stored = client.upload().upload(kind, file).await?;
    let resolved = client.upload().file_url(&stored.url);
    let mut rendered = serde_json::to_value(&stored)?;
    rendered["resolved_url"] = Value::String(resolved);
    print_json(&rendered)
}

async fn read_upload(path: &Path, kind: UploadKind) -> Result<FileUpload, CliError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    validation::validate_upload(&filename, kind)?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CliError::ReadFile { path: path.display().to_string(), source })?;
    let mime_type = mime_for(&filename).to_owned();
    eprintln!("uploading {filename} ({} bytes)", bytes.len());
    Ok(FileUpload { filename, mime_type, bytes })
}

fn mime_for(filename: &str) -> &'static str {
    match validation::file_extension(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

fn print_page(page: Page<Comment>) -> Result<(), CliError> {
    print_json(&json!({ "items": page.items, "pagination": page.pagination }))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
