// ABOUTME: Application-wide limits and defaults for Giftminder
// ABOUTME: Field length bounds, pagination limits, token lifetimes and media rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants shared by validation, persistence and the HTTP layer.

/// Field length limits
pub mod limits {
    /// Minimum username length
    pub const USERNAME_MIN: usize = 4;
    /// Maximum username length
    pub const USERNAME_MAX: usize = 32;
    /// Minimum password length
    pub const PASSWORD_MIN: usize = 8;
    /// Maximum password length
    pub const PASSWORD_MAX: usize = 64;
    /// Maximum email length
    pub const EMAIL_MAX: usize = 255;
    /// Maximum user bio length
    pub const BIO_MAX: usize = 500;

    /// Recipient name bounds
    pub const RECIPIENT_NAME_MIN: usize = 2;
    /// Recipient name upper bound
    pub const RECIPIENT_NAME_MAX: usize = 32;
    /// Recipient relation bounds
    pub const RELATION_MIN: usize = 2;
    /// Recipient relation upper bound
    pub const RELATION_MAX: usize = 32;
    /// Maximum number of preference entries
    pub const PREFERENCES_MAX: usize = 10;
    /// Earliest accepted birthday year
    pub const BIRTHDAY_MIN_YEAR: i32 = 1900;

    /// Maximum event title length
    pub const EVENT_TITLE_MAX: usize = 32;
    /// Maximum span of a calendar query, in days
    pub const CALENDAR_MAX_DAYS: i64 = 366;

    /// Gift idea title bounds
    pub const IDEA_TITLE_MIN: usize = 2;
    /// Gift idea title upper bound
    pub const IDEA_TITLE_MAX: usize = 64;
    /// Maximum length of a gift idea link
    pub const VIEW_URL_MAX: usize = 255;
    /// Exclusive upper bound of an estimated price (NUMERIC(10,2))
    pub const PRICE_MAX: f64 = 100_000_000.0;

    /// Maximum media alt text length
    pub const ALT_MAX: usize = 64;
}

/// Pagination defaults
pub mod pagination {
    /// Page size used when the client does not ask for one
    pub const DEFAULT_LIMIT: u32 = 20;
    /// Largest page a client may request
    pub const MAX_LIMIT: u32 = 100;
}

/// Token lifetimes used when configuration does not override them
pub mod tokens {
    /// Access token lifetime in minutes
    pub const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 15;
    /// Refresh token lifetime in days
    pub const REFRESH_TOKEN_EXPIRE_DAYS: i64 = 30;
    /// Activation token lifetime in hours
    pub const ACTIVATION_TOKEN_EXPIRE_HOURS: i64 = 24;
}

/// Media upload rules
pub mod media {
    /// Maximum size of a single uploaded file (5 MiB)
    pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
    /// Maximum number of files in one content upload
    pub const MAX_FILES_PER_UPLOAD: usize = 10;
    /// Smallest accepted width/height ratio for content images
    pub const CONTENT_MIN_RATIO: f64 = 0.5;
    /// Largest accepted width/height ratio for content images
    pub const CONTENT_MAX_RATIO: f64 = 2.0;
}

/// Default root account created by the admin CLI
pub mod root_user {
    /// Default root email
    pub const EMAIL: &str = "root@example.com";
    /// Default root username
    pub const USERNAME: &str = "root";
    /// Default root password
    pub const PASSWORD: &str = "12345678";
}
