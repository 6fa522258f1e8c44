use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use sqlx::Executor;
use uuid::Uuid;

use crate::auth::AppRole;
use crate::db;

/// Operational companion to the API server. Role grants live here rather
/// than on any HTTP surface, so elevating an account always requires
/// database credentials.
#[derive(Parser)]
#[command(name = "clubctl")]
#[command(about = "Operations CLI for the Taj Royals club API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply the database schema (idempotent)")]
    InitDb,

    #[command(about = "Grant a role to a member by email")]
    GrantRole {
        email: String,
        #[arg(help = "One of: user, admin, super_admin")]
        role: String,
    },

    #[command(about = "List member accounts with their roles")]
    ListUsers,

    #[command(about = "Check a running server's health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::InitDb => init_db().await,
        Commands::GrantRole { email, role } => grant_role(&email, &role).await,
        Commands::ListUsers => list_users().await,
        Commands::Health { url } => health(&url).await,
    }
}

async fn init_db() -> anyhow::Result<()> {
    let pool = db::pool::pool().await.context("connecting to database")?;
    pool.execute(db::SCHEMA_SQL)
        .await
        .context("applying schema")?;
    println!("Schema applied");
    Ok(())
}

async fn grant_role(email: &str, role: &str) -> anyhow::Result<()> {
    let role: AppRole = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let pool = db::pool::pool().await.context("connecting to database")?;

    let user_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM profiles WHERE email = $1")
        .bind(email)
        .fetch_optional(&pool)
        .await?;

    let Some(user_id) = user_id else {
        bail!("no member with email {}", email);
    };

    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
        "#,
    )
    .bind(user_id)
    .bind(role)
    .execute(&pool)
    .await?;

    println!("{} is now {}", email, role);
    Ok(())
}

async fn list_users() -> anyhow::Result<()> {
    let pool = db::pool::pool().await.context("connecting to database")?;

    let rows: Vec<(String, String, Option<String>, bool, Option<AppRole>)> = sqlx::query_as(
        r#"
        SELECT p.username, p.email, p.member_id, p.is_suspended, ur.role
        FROM profiles p
        LEFT JOIN user_roles ur ON ur.user_id = p.id
        ORDER BY p.created_at
        "#,
    )
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        println!("No members registered");
        return Ok(());
    }

    for (username, email, member_id, suspended, role) in rows {
        println!(
            "{:<24} {:<32} {:<10} {:<12} {}",
            username,
            email,
            member_id.unwrap_or_else(|| "-".to_string()),
            role.unwrap_or(AppRole::User).as_str(),
            if suspended { "SUSPENDED" } else { "" }
        );
    }
    Ok(())
}

async fn health(url: &str) -> anyhow::Result<()> {
    let endpoint = format!("{}/health", url.trim_end_matches('/'));
    let response = reqwest::get(&endpoint)
        .await
        .with_context(|| format!("requesting {}", endpoint))?;

    let status = response.status();
    let body: Value = response.json().await.context("reading health body")?;
    println!("{} {}", status, serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("server reported unhealthy");
    }
    Ok(())
}
