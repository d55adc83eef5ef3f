use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "styragon")]
#[command(author, version, about = "Content engine for the Styragon marketing site")]
#[command(after_help = "Examples:
  styragon blog --category design --page 2
  styragon post launching-our-new-site
  styragon sitemap > public/sitemap.xml
  styragon admin list posts --status draft
  styragon admin save posts --field title=\"Hello\" --field content=\"...\" --image cover.png")]
pub struct Config {
    /// PostgreSQL database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Base URL of the hosted backend (storage and auth)
    #[arg(long, env = "STYRAGON_BACKEND_URL")]
    pub backend_url: String,

    /// Public anonymous key of the hosted backend
    #[arg(long, env = "STYRAGON_ANON_KEY", hide_env_values = true)]
    pub anon_key: String,

    /// Custom path to site.toml
    #[arg(long, env = "STYRAGON_CONFIG", value_name = "PATH")]
    pub site_config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Paginated blog index (published posts, newest first)
    Blog {
        /// Search title and content
        #[arg(short, long)]
        search: Option<String>,
        /// Category name or slug; "All" for every category
        #[arg(short, long, default_value = "All")]
        category: String,
        /// 1-based page, clamped to the last page
        #[arg(short, long, default_value = "1")]
        page: u32,
    },
    /// A single published post
    Post { slug: String },
    /// A single published project
    Project { slug: String },
    /// Homepage blog section: featured posts first, at most six items
    Section {
        #[arg(short, long, default_value = "All")]
        category: String,
    },
    /// Featured case studies
    Work,
    /// Published testimonials, featured first
    Testimonials,
    /// Active services
    Services,
    /// Print sitemap.xml
    Sitemap,
    /// Print robots.txt
    Robots,
    /// Submit a "start a project" lead
    #[command(after_help = "Example: styragon lead --name Ada --email ada@example.com --field project_type=SaaS --attach brief.pdf")]
    Lead {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Additional form fields as key=value
        #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
        /// File to attach to the lead
        #[arg(long, value_name = "PATH")]
        attach: Option<PathBuf>,
    },
    /// Content administration (requires an admin account)
    Admin(AdminArgs),
    /// Apply database migrations
    Migrate,
}

#[derive(Args, Debug)]
pub struct AdminArgs {
    /// Admin account email
    #[arg(long, env = "STYRAGON_ADMIN_EMAIL")]
    pub email: Option<String>,

    /// Admin account password
    #[arg(long, env = "STYRAGON_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List records, filtered client-side
    List {
        kind: ContentKind,
        #[arg(short, long)]
        search: Option<String>,
        /// all, published, draft or featured
        #[arg(long, default_value = "all")]
        status: String,
    },
    /// Create a record, or edit one with --id
    #[command(after_help = "An empty or missing slug is derived from the title.")]
    Save {
        kind: ContentKind,
        #[arg(long)]
        id: Option<i64>,
        #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
        /// Image to upload for the record
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// Flip the published flag
    TogglePublished { kind: ContentKind, id: i64 },
    /// Flip the featured flag
    ToggleFeatured { kind: ContentKind, id: i64 },
    /// Delete a record
    Delete {
        kind: ContentKind,
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Captured leads, newest first
    Leads,
    /// Change the admin password
    Password {
        #[arg(long, env = "STYRAGON_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Email a password-recovery link
    ResetPassword { email: String },
}

/// Administered content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentKind {
    Posts,
    Projects,
    Categories,
    Authors,
    Testimonials,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Parses `key=value`; the value may itself contain `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
