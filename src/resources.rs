// ABOUTME: Centralized resource container shared by every HTTP handler
// ABOUTME: Holds config, database, token manager, storage, mailer and scheduler behind Arcs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Built once at startup and handed to every router as axum state. Services
//! are cheap views over these resources and are created per request.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::mail::{self, MailSender};
use crate::scheduler::OccurrenceScheduler;
use crate::services::{
    ActivationNotifier, AuthService, EventService, IdeaService, MediaService, RecipientService,
    UserService,
};
use crate::storage::{self, MediaStorage};

/// Shared server resources
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Database pool and managers
    pub database: Arc<Database>,
    /// JWT issuing and password hashing
    pub auth_manager: Arc<AuthManager>,
    /// Object storage for uploads
    pub storage: Arc<dyn MediaStorage>,
    /// Outgoing mail
    pub mailer: Arc<dyn MailSender>,
    /// Daily occurrence generator
    pub scheduler: Arc<OccurrenceScheduler>,
}

impl ServerResources {
    /// Assemble resources from already constructed parts
    #[must_use]
    pub fn new(
        config: ServerConfig,
        database: Database,
        storage: Arc<dyn MediaStorage>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        let auth_manager = Arc::new(AuthManager::new(&config.auth));
        let scheduler = Arc::new(OccurrenceScheduler::new(database.events()));
        Self {
            config: Arc::new(config),
            database: Arc::new(database),
            auth_manager,
            storage,
            mailer,
            scheduler,
        }
    }

    /// Connect the database and build storage and mail backends from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the mail
    /// configuration is incomplete
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database =
            Database::new(&config.database.url, config.database.max_connections).await?;
        tracing::info!("Database initialized");

        let storage = storage::from_config(&config.storage).await;
        let mailer = mail::from_config(&config.mail)?;

        Ok(Self::new(config, database, storage, mailer))
    }

    /// Authentication use cases
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(self.database.users(), &self.auth_manager)
    }

    /// Where activation emails are sent from
    #[must_use]
    pub fn activation_notifier(&self) -> ActivationNotifier<'_> {
        ActivationNotifier {
            mailer: self.mailer.as_ref(),
            app_name: &self.config.app_name,
            activation_url_base: &self.config.mail.activation_url_base,
        }
    }

    /// Profile use cases
    #[must_use]
    pub fn user_service(&self) -> UserService {
        UserService::new(self.database.users(), self.database.media())
    }

    /// Recipient use cases
    #[must_use]
    pub fn recipient_service(&self) -> RecipientService {
        RecipientService::new(self.database.recipients())
    }

    /// Event use cases
    #[must_use]
    pub fn event_service(&self) -> EventService {
        EventService::new(self.database.events(), self.database.recipients())
    }

    /// Gift idea use cases
    #[must_use]
    pub fn idea_service(&self) -> IdeaService {
        IdeaService::new(self.database.ideas())
    }

    /// Upload use cases
    #[must_use]
    pub fn media_service(&self) -> MediaService {
        MediaService::new(self.database.media(), Arc::clone(&self.storage))
    }
}
