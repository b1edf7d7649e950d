//! CLI administration tool for deeplink-shortener.
//!
//! Provides commands for registering apps, viewing statistics, and
//! performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Register an app (prints its token)
//! cargo run --bin admin -- app register --name music --base-url https://music.example.com
//!
//! # List all apps
//! cargo run --bin admin -- app list
//!
//! # Show one app, including its token
//! cargo run --bin admin -- app show 1
//!
//! # View short URL statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use deeplink_shortener::application::services::{AppService, UrlService};
use deeplink_shortener::domain::entities::App;
use deeplink_shortener::infrastructure::persistence::{PgAppRepository, PgShortUrlRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing deeplink-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage client apps
    App {
        #[command(subcommand)]
        action: AppAction,
    },

    /// Show short URL statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum AppAction {
    /// Register an app, or show the existing one for the same name and base URL
    Register {
        /// App name (at least 2 characters)
        #[arg(short, long)]
        name: Option<String>,

        /// Base URL entity redirects are composed under
        #[arg(short, long)]
        base_url: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all apps
    List,

    /// Show one app, including its token
    Show {
        /// App ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::App { action } => handle_app_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_app_action(action: AppAction, pool: &PgPool) -> Result<()> {
    let service = AppService::new(Arc::new(PgAppRepository::new(Arc::new(pool.clone()))));

    match action {
        AppAction::Register {
            name,
            base_url,
            yes,
        } => register_app(&service, name, base_url, yes).await?,
        AppAction::List => list_apps(&service).await?,
        AppAction::Show { id } => show_app(&service, id).await?,
    }

    Ok(())
}

fn check_app_input(name: &str, base_url: &str) -> Result<()> {
    if name.chars().count() < 2 {
        anyhow::bail!("App name must be at least 2 characters");
    }
    url::Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;
    Ok(())
}

/// Registers an app with interactive prompts.
///
/// Re-registering a known (name, base URL) pair prints the existing token.
async fn register_app(
    service: &AppService,
    name: Option<String>,
    base_url: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "📱 Register App".bright_blue().bold());
    println!();

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("App name").interact_text()?,
    };

    let base_url = match base_url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Base URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    let name = name.trim().to_string();
    check_app_input(&name, &base_url)?;

    println!();
    println!("  Name:     {}", name.cyan());
    println!("  Base URL: {}", base_url.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Register this app?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let app = service
        .register(&name, &base_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to register app: {}", e))?;

    println!();
    println!("{}", "✅ App registered".green().bold());
    println!("  ID:    {}", app.id.to_string().bright_black());
    println!("  Token: {}", app.token.bright_yellow().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!("  {}: {}", "x-app-token".bright_cyan(), app.token.bright_yellow());
    println!();

    Ok(())
}

/// Lists all apps, newest first.
///
/// # Output Format
///
/// ```text
/// 📋 Apps
///
///   ID  Name                 Base URL                             Created
///   ───────────────────────────────────────────────────────────────────────────
///   2   video                https://video.example.com            2025-01-16 14:20
///   1   music                https://music.example.com            2025-01-15 10:30
/// ```
async fn list_apps(service: &AppService) -> Result<()> {
    println!("{}", "📋 Apps".bright_blue().bold());
    println!();

    let apps: Vec<App> = service
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list apps: {}", e))?;

    if apps.is_empty() {
        println!("{}", "  No apps registered".yellow());
        println!();
        println!(
            "  Register one with: {} admin app register",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<20} {:<36} {:<16}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Base URL".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for app in &apps {
        println!(
            "  {:<3} {:<20} {:<36} {}",
            app.id.to_string().bright_black(),
            app.name.cyan(),
            app.base_url,
            app.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!("  Total: {}", apps.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn show_app(service: &AppService, id: i64) -> Result<()> {
    let app = service
        .get_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load app {}: {}", id, e))?;

    println!("{}", "📱 App".bright_blue().bold());
    println!();
    println!("  ID:       {}", app.id.to_string().bright_black());
    println!("  Name:     {}", app.name.cyan());
    println!("  Base URL: {}", app.base_url);
    println!("  Token:    {}", app.token.bright_yellow().bold());
    println!(
        "  Created:  {}",
        app.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!();

    Ok(())
}

/// Displays short URL and app counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let url_service = UrlService::new(Arc::new(PgShortUrlRepository::new(pool.clone())), "");

    let stats = url_service
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load stats: {}", e))?;

    let apps_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM apps")
        .fetch_one(pool.as_ref())
        .await?;

    println!("  Apps:          {}", apps_count.to_string().bright_green().bold());
    println!("  Short URLs:    {}", stats.total.to_string().bright_green().bold());
    println!("  Active:        {}", stats.active.to_string().green());
    println!("  Expired:       {}", stats.expired.to_string().yellow());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
            )
            .fetch_one(pool)
            .await
            .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_app_input() {
        assert!(check_app_input("music", "https://music.example.com").is_ok());
        assert!(check_app_input("m", "https://music.example.com").is_err());
        assert!(check_app_input("music", "not a url").is_err());
    }

    #[test]
    fn test_cli_parses_register() {
        let cli = Cli::try_parse_from([
            "admin",
            "app",
            "register",
            "--name",
            "music",
            "--base-url",
            "https://music.example.com",
            "-y",
        ])
        .unwrap();

        match cli.command {
            Commands::App {
                action: AppAction::Register { name, base_url, yes },
            } => {
                assert_eq!(name.as_deref(), Some("music"));
                assert_eq!(base_url.as_deref(), Some("https://music.example.com"));
                assert!(yes);
            }
            _ => panic!("expected app register"),
        }
    }

    #[test]
    fn test_cli_parses_show() {
        let cli = Cli::try_parse_from(["admin", "app", "show", "42"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::App {
                action: AppAction::Show { id: 42 }
            }
        ));
        assert!(Cli::try_parse_from(["admin", "app", "show", "abc"]).is_err());
    }
}
