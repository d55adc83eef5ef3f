use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use dotenvy::dotenv;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use styragon_cli::config::{AdminArgs, AdminCommand};
use styragon_cli::{render, Command, Config, ContentKind, OutputFormat};
use styragon_client::{AuthClient, BackendClient, StorageClient};
use styragon_core::config::{load_site_config, DbConfig, HttpConfig};
use styragon_core::models::{Author, Category, Post, Project, Testimonial};
use styragon_core::{
    default_config_path, render_sitemap, AdminEntity, AdminPanel, AppError, CategorySelection,
    ImageUploader, LeadForm, LeadService, ListingState, SessionContext, SiteService,
    StatusFilter, UploadFile,
};
use styragon_db::ContentRepository;

/// Everything a command needs, wired once.
struct App {
    repo: ContentRepository,
    site: SiteService<ContentRepository>,
    uploader: ImageUploader<StorageClient>,
    auth: AuthClient,
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Logs go to stderr so stdout stays clean for sitemap/JSON output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    let config = Config::parse();

    if let Err(err) = run(config).await {
        match err.downcast_ref::<AppError>() {
            Some(app_err) => {
                error!(kind = ?app_err.kind(), "{}", app_err);
                eprintln!("Error: {}", app_err.user_message());
            }
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let site_config_path = config.site_config.clone().or_else(default_config_path);
    let site_config = load_site_config(site_config_path.as_deref())?;

    let pool = PgPoolOptions::new()
        .max_connections(DbConfig::default().max_connections)
        .connect_lazy(&config.database_url)
        .context("Invalid database URL")?;

    let backend = BackendClient::new(&config.backend_url, &config.anon_key, &HttpConfig::default())
        .context("Invalid backend configuration")?;
    let auth = AuthClient::new(backend.clone())
        .with_redirect(format!("{}/admin/reset-password", site_config.origin()));
    let uploader = ImageUploader::new(StorageClient::new(backend), site_config.storage.clone());

    let repo = ContentRepository::new(pool);
    let app = App {
        site: SiteService::new(repo.clone(), site_config),
        repo,
        uploader,
        auth,
        format: config.format,
    };

    match config.command {
        Command::Blog {
            search,
            category,
            page,
        } => {
            let mut state = ListingState::new(app.site.config().posts_per_page);
            if let Some(term) = search {
                state.set_search(&term);
            }
            state.set_category(CategorySelection::parse(&category));
            state.go_to_page(page);
            let index = app.site.blog_index(&mut state).await;
            app.emit(&index, render::blog_index)?;
        }
        Command::Post { slug } => {
            let post = app.site.post(&slug).await?;
            app.emit(&post, render::post)?;
        }
        Command::Project { slug } => {
            let project = app.site.project(&slug).await?;
            app.emit(&project, render::project)?;
        }
        Command::Section { category } => {
            let section = app
                .site
                .blog_section(&CategorySelection::parse(&category))
                .await;
            app.emit(&section, render::blog_section)?;
        }
        Command::Work => {
            let projects = app.site.case_studies().await;
            app.emit(&projects, |p| render::case_studies(p))?;
        }
        Command::Testimonials => {
            let items = app.site.testimonials().await;
            app.emit(&items, |t| render::testimonials(t))?;
        }
        Command::Services => {
            let items = app.site.services().await;
            app.emit(&items, |s| render::services(s))?;
        }
        Command::Sitemap => {
            let entries = app.site.sitemap(Utc::now()).await;
            match app.format {
                OutputFormat::Text => print!("{}", render_sitemap(&entries)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
            }
        }
        Command::Robots => print!("{}", app.site.robots()),
        Command::Lead {
            name,
            email,
            fields,
            attach,
        } => {
            submit_lead(&app, name, email, fields, attach.as_deref()).await?;
        }
        Command::Admin(args) => admin(&app, args).await?,
        Command::Migrate => {
            info!("Applying migrations...");
            app.repo.migrate().await?;
            info!("Database is up to date");
        }
    }

    Ok(())
}

impl App {
    /// Prints `value` as pretty JSON or through the text renderer.
    fn emit<T: Serialize>(&self, value: &T, text: impl Fn(&T) -> String) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Text => print!("{}", text(value)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }

    fn panel<E: AdminEntity>(
        &self,
        session: &SessionContext,
    ) -> AdminPanel<E, ContentRepository, StorageClient> {
        AdminPanel::new(self.repo.clone(), self.uploader.clone(), session.clone())
    }
}

async fn read_upload(path: &Path) -> anyhow::Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(UploadFile::new(file_name, bytes))
}

async fn submit_lead(
    app: &App,
    name: String,
    email: String,
    fields: Vec<(String, String)>,
    attach: Option<&Path>,
) -> anyhow::Result<()> {
    let mut form = LeadForm::default();
    form.set_field("name", &name).map_err(AppError::from)?;
    form.set_field("email", &email).map_err(AppError::from)?;
    for (key, value) in &fields {
        form.set_field(key, value).map_err(AppError::from)?;
    }

    let attachment = match attach {
        Some(path) => Some(read_upload(path).await?),
        None => None,
    };

    let leads = LeadService::new(app.repo.clone(), app.uploader.clone());
    let id = leads.submit(form, attachment).await?;
    println!("Thanks! Your project request was received (reference {}).", id);
    Ok(())
}

async fn admin(app: &App, args: AdminArgs) -> anyhow::Result<()> {
    // Recovery is the one admin action that works signed out.
    if let AdminCommand::ResetPassword { email } = &args.command {
        SessionContext::new()
            .request_password_reset(&app.auth, email)
            .await?;
        println!("If {} has an account, a reset link is on its way.", email);
        return Ok(());
    }

    let email = args
        .email
        .context("Admin email required (--email or STYRAGON_ADMIN_EMAIL)")?;
    let password = args
        .password
        .context("Admin password required (--password or STYRAGON_ADMIN_PASSWORD)")?;

    let session = SessionContext::new();
    session.sign_in(&app.auth, &email, &password).await?;

    let result = admin_command(app, &session, args.command).await;

    if let Err(e) = session.sign_out(&app.auth).await {
        warn!(error = %e, "sign-out failed");
    }
    result
}

async fn admin_command(
    app: &App,
    session: &SessionContext,
    command: AdminCommand,
) -> anyhow::Result<()> {
    match command {
        AdminCommand::List {
            kind,
            search,
            status,
        } => {
            let status: StatusFilter = status.parse().map_err(AppError::from)?;
            match kind {
                ContentKind::Posts => list::<Post>(app, session, search, status).await,
                ContentKind::Projects => list::<Project>(app, session, search, status).await,
                ContentKind::Categories => list::<Category>(app, session, search, status).await,
                ContentKind::Authors => list::<Author>(app, session, search, status).await,
                ContentKind::Testimonials => {
                    list::<Testimonial>(app, session, search, status).await
                }
            }
        }
        AdminCommand::Save {
            kind,
            id,
            fields,
            image,
        } => {
            let image = match image {
                Some(path) => Some(read_upload(&path).await?),
                None => None,
            };
            let saved = match kind {
                ContentKind::Posts => save::<Post>(app, session, id, &fields, image).await?,
                ContentKind::Projects => save::<Project>(app, session, id, &fields, image).await?,
                ContentKind::Categories => {
                    save::<Category>(app, session, id, &fields, image).await?
                }
                ContentKind::Authors => save::<Author>(app, session, id, &fields, image).await?,
                ContentKind::Testimonials => {
                    save::<Testimonial>(app, session, id, &fields, image).await?
                }
            };
            println!("Saved {:?} #{}", kind, saved);
            Ok(())
        }
        AdminCommand::TogglePublished { kind, id } => {
            toggle(app, session, kind, id, Flag::Published).await
        }
        AdminCommand::ToggleFeatured { kind, id } => {
            toggle(app, session, kind, id, Flag::Featured).await
        }
        AdminCommand::Delete { kind, id, yes } => {
            if !yes {
                bail!("Refusing to delete {:?} #{} without --yes", kind, id);
            }
            let deleted = match kind {
                ContentKind::Posts => delete::<Post>(app, session, id).await?,
                ContentKind::Projects => delete::<Project>(app, session, id).await?,
                ContentKind::Categories => delete::<Category>(app, session, id).await?,
                ContentKind::Authors => delete::<Author>(app, session, id).await?,
                ContentKind::Testimonials => delete::<Testimonial>(app, session, id).await?,
            };
            if deleted {
                println!("Deleted {:?} #{}", kind, id);
            } else {
                println!("Nothing to delete");
            }
            Ok(())
        }
        AdminCommand::Leads => {
            let leads = LeadService::new(app.repo.clone(), app.uploader.clone())
                .list(session)
                .await?;
            app.emit(&leads, |l| render::leads(l))
        }
        AdminCommand::Password { new_password } => {
            session.update_password(&app.auth, &new_password).await?;
            println!("Password updated");
            Ok(())
        }
        AdminCommand::ResetPassword { .. } => Ok(()),
    }
}

async fn list<E: AdminEntity + Serialize>(
    app: &App,
    session: &SessionContext,
    search: Option<String>,
    status: StatusFilter,
) -> anyhow::Result<()> {
    let mut panel = app.panel::<E>(session);
    panel.refresh().await?;
    if let Some(term) = search {
        panel.set_search(&term);
    }
    panel.set_status_filter(status);

    let visible = panel.visible_items();
    match app.format {
        OutputFormat::Text => {
            for item in &visible {
                println!("{}", render::admin_row(*item));
            }
            println!("\n{} of {} shown", visible.len(), panel.items().len());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&visible)?),
    }
    Ok(())
}

async fn save<E: AdminEntity>(
    app: &App,
    session: &SessionContext,
    id: Option<i64>,
    fields: &[(String, String)],
    image: Option<UploadFile>,
) -> Result<i64, AppError> {
    let mut panel = app.panel::<E>(session);
    match id {
        Some(id) => {
            panel.refresh().await?;
            panel.open_edit(id)?;
        }
        None => panel.open_create(),
    }
    for (key, value) in fields {
        panel.set_field(key, value)?;
    }
    if let Some(file) = image {
        panel.set_image(file)?;
    }
    let saved = panel.submit().await?;
    info!(content_type = %E::CONTENT_TYPE, id = saved, "saved from cli");
    Ok(saved)
}

#[derive(Clone, Copy)]
enum Flag {
    Published,
    Featured,
}

async fn flip<E: AdminEntity>(
    app: &App,
    session: &SessionContext,
    id: i64,
    flag: Flag,
) -> Result<bool, AppError> {
    let mut panel = app.panel::<E>(session);
    panel.refresh().await?;
    match flag {
        Flag::Published => panel.toggle_published(id).await,
        Flag::Featured => panel.toggle_featured(id).await,
    }
}

async fn toggle(
    app: &App,
    session: &SessionContext,
    kind: ContentKind,
    id: i64,
    flag: Flag,
) -> anyhow::Result<()> {
    let value = match kind {
        ContentKind::Posts => flip::<Post>(app, session, id, flag).await?,
        ContentKind::Projects => flip::<Project>(app, session, id, flag).await?,
        ContentKind::Categories => flip::<Category>(app, session, id, flag).await?,
        ContentKind::Authors => flip::<Author>(app, session, id, flag).await?,
        ContentKind::Testimonials => flip::<Testimonial>(app, session, id, flag).await?,
    };
    let name = match flag {
        Flag::Published => "published",
        Flag::Featured => "featured",
    };
    println!("{:?} #{} {} = {}", kind, id, name, value);
    Ok(())
}

async fn delete<E: AdminEntity>(
    app: &App,
    session: &SessionContext,
    id: i64,
) -> Result<bool, AppError> {
    let mut panel = app.panel::<E>(session);
    panel.refresh().await?;
    panel.request_delete(id)?;
    panel.confirm_delete().await
}
