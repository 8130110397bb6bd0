// ABOUTME: Administrative command-line tool for the Giftminder database
// ABOUTME: Creates the root account, wipes all rows, or runs the occurrence generator once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Usage:
//! ```bash
//! # Create the root account with default credentials
//! cargo run --bin giftminder-admin -- create-root-user
//!
//! # Create the root account with custom credentials
//! cargo run --bin giftminder-admin -- create-root-user --email root@mycompany.com --password s3cretpass
//!
//! # Delete every row in every table
//! cargo run --bin giftminder-admin -- clean-db --yes
//!
//! # Materialise missing occurrences up to today
//! cargo run --bin giftminder-admin -- generate-occurrences
//! ```

use std::env;

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use giftminder_server::{
    auth::AuthManager,
    config::AuthConfig,
    constants::{defaults, env_vars, root_user, tokens},
    database::Database,
    logging::LoggingConfig,
    scheduler::OccurrenceScheduler,
    services::{AuthService, Registration},
};
use jsonwebtoken::Algorithm;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "giftminder-admin",
    about = "Giftminder database administration",
    long_about = "Maintenance commands run directly against the Giftminder database."
)]
struct AdminArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create the root account unless its email is already registered
    CreateRootUser {
        /// Root email
        #[arg(long, default_value = root_user::EMAIL)]
        email: String,

        /// Root password
        #[arg(long, default_value = root_user::PASSWORD)]
        password: String,

        /// Root username
        #[arg(long, default_value = root_user::USERNAME)]
        username: String,
    },

    /// Delete all rows from every table
    CleanDb {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Run the occurrence generator once
    GenerateOccurrences {
        /// Generate up to this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminArgs::parse();

    let logging = LoggingConfig {
        level: if args.verbose { "debug" } else { "info" }.to_owned(),
        ..LoggingConfig::default()
    };
    logging.init()?;

    let database_url = args
        .database_url
        .or_else(|| env::var(env_vars::DATABASE_URL).ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());
    let database = Database::new(&database_url, 1).await?;
    info!("Connected to database");

    match args.command {
        AdminCommand::CreateRootUser {
            email,
            password,
            username,
        } => create_root_user(&database, username, email, password).await,
        AdminCommand::CleanDb { yes } => clean_db(&database, yes).await,
        AdminCommand::GenerateOccurrences { today } => {
            generate_occurrences(&database, today.unwrap_or_else(|| Utc::now().date_naive())).await
        }
    }
}

/// Password hashing only; this tool never issues tokens, so the signing secret is throwaway
fn hashing_auth_manager() -> Result<AuthManager> {
    let bcrypt_cost = match env::var(env_vars::BCRYPT_COST) {
        Ok(raw) => raw.trim().parse()?,
        Err(_) => bcrypt::DEFAULT_COST,
    };
    Ok(AuthManager::new(&AuthConfig {
        jwt_secret: Uuid::new_v4().to_string(),
        jwt_algorithm: Algorithm::HS256,
        access_token_expire_minutes: tokens::ACCESS_TOKEN_EXPIRE_MINUTES,
        refresh_token_expire_days: tokens::REFRESH_TOKEN_EXPIRE_DAYS,
        activation_token_expire_hours: tokens::ACTIVATION_TOKEN_EXPIRE_HOURS,
        bcrypt_cost,
    }))
}

async fn create_root_user(
    database: &Database,
    username: String,
    email: String,
    password: String,
) -> Result<()> {
    let auth_manager = hashing_auth_manager()?;
    let service = AuthService::new(database.users(), &auth_manager);
    let registration = Registration {
        username,
        email,
        password,
    };

    let (user, created) = service.ensure_root_user(&registration).await?;
    if created {
        info!(user_id = %user.id, email = %user.email, "Root user created");
    } else {
        warn!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "A user with this email already exists, nothing to do");
    }
    Ok(())
}

async fn clean_db(database: &Database, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete all data without --yes");
    }
    let deleted = database.clean().await?;
    info!(deleted, "Database cleaned");
    Ok(())
}

async fn generate_occurrences(database: &Database, today: NaiveDate) -> Result<()> {
    let scheduler = OccurrenceScheduler::new(database.events());
    match scheduler.run_once(today).await? {
        Some(created) => info!(%today, created, "Occurrences generated"),
        None => warn!("Generator already running"),
    }
    Ok(())
}
