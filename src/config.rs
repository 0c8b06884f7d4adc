//! OIDC client configuration.
//!
//! This module provides the settings handed to the wrapped `UserManager` when the
//! provider is created. The configuration is immutable for the lifetime of the
//! provider scope.

use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Scope requested when none is configured.
pub const DEFAULT_SCOPE: &str = "openid profile email";

/// OpenID Connect client configuration.
///
/// # Fields
///
/// - `authority`: URL of the OpenID provider (e.g., "https://login.example.com/realms/app")
/// - `client_id`: client identifier registered with the provider
/// - `redirect_uri`: where the provider sends the browser after sign-in
/// - `scope`: space separated scopes to request
/// - `post_logout_redirect_uri`: where the provider sends the browser after sign-out
/// - `silent_redirect_uri`: callback page used for silent renewal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OidcConfig {
    /// URL of the OpenID provider
    pub authority: String,

    /// Client identifier registered with the provider
    pub client_id: String,

    /// Redirect URI for the authorization code callback
    pub redirect_uri: String,

    /// Space separated scopes to request
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Redirect URI used after sign-out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,

    /// Redirect URI used by silent renewal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent_redirect_uri: Option<String>,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

impl OidcConfig {
    /// Creates a new OidcConfig with the default scope.
    ///
    /// # Example
    ///
    /// ```
    /// # use dxoidc::OidcConfig;
    /// let config = OidcConfig::new(
    ///     "https://login.example.com".to_string(),
    ///     "my_client".to_string(),
    ///     "http://localhost:8080/callback".to_string(),
    /// );
    /// assert_eq!(config.scope, "openid profile email");
    /// ```
    pub fn new(authority: String, client_id: String, redirect_uri: String) -> Self {
        Self {
            authority,
            client_id,
            redirect_uri,
            scope: default_scope(),
            post_logout_redirect_uri: None,
            silent_redirect_uri: None,
        }
    }

    /// Replaces the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the redirect URI used after sign-out.
    pub fn with_post_logout_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.post_logout_redirect_uri = Some(uri.into());
        self
    }

    /// Sets the redirect URI used by silent renewal.
    pub fn with_silent_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.silent_redirect_uri = Some(uri.into());
        self
    }

    /// Loads OidcConfig from compile-time environment variables.
    ///
    /// Expected environment variables:
    /// - `OIDC_AUTHORITY` - OpenID provider URL
    /// - `OIDC_CLIENT_ID` - client identifier
    /// - `OIDC_REDIRECT_URI` - sign-in redirect URI
    ///
    /// Optional:
    /// - `OIDC_SCOPE`
    /// - `OIDC_POST_LOGOUT_REDIRECT_URI`
    ///
    /// Returns `None` if any required environment variable is not set at compile time.
    pub fn from_env() -> Option<Self> {
        let authority = option_env!("OIDC_AUTHORITY")?;
        let client_id = option_env!("OIDC_CLIENT_ID")?;
        let redirect_uri = option_env!("OIDC_REDIRECT_URI")?;

        let mut config = Self::new(
            authority.to_string(),
            client_id.to_string(),
            redirect_uri.to_string(),
        );
        if let Some(scope) = option_env!("OIDC_SCOPE") {
            config.scope = scope.to_string();
        }
        config.post_logout_redirect_uri =
            option_env!("OIDC_POST_LOGOUT_REDIRECT_URI").map(str::to_string);

        Some(config)
    }

    /// Loads OidcConfig from compile-time environment variables or panics.
    ///
    /// # Panics
    ///
    /// Panics with a clear error message if any required environment variable
    /// is not set at compile time. Use this in production builds where the OIDC
    /// configuration is mandatory.
    pub fn from_env_or_panic() -> Self {
        Self::from_env().expect(
            "OIDC configuration not found. Please set the following environment variables at compile time:\n\
             - OIDC_AUTHORITY\n\
             - OIDC_CLIENT_ID\n\
             - OIDC_REDIRECT_URI\n\n\
             For local development, consider using OidcConfig::new() with test values.",
        )
    }

    /// Checks that every required setting is present.
    pub fn validate(&self) -> Result<(), AuthError> {
        let required = [
            ("authority", &self.authority),
            ("client_id", &self.client_id),
            ("redirect_uri", &self.redirect_uri),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AuthError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    /// Returns the OpenID discovery document URL for the authority.
    ///
    /// # Example
    ///
    /// ```
    /// # use dxoidc::OidcConfig;
    /// let config = OidcConfig::new(
    ///     "https://login.example.com/".to_string(),
    ///     "my_client".to_string(),
    ///     "http://localhost:8080/callback".to_string(),
    /// );
    /// assert_eq!(
    ///     config.metadata_url(),
    ///     "https://login.example.com/.well-known/openid-configuration"
    /// );
    /// ```
    pub fn metadata_url(&self) -> String {
        format!(
            "{}/.well-known/openid-configuration",
            self.authority.trim_end_matches('/')
        )
    }

    /// Returns the requested scopes as a list.
    pub fn scopes(&self) -> Vec<&str> {
        self.scope.split_whitespace().collect()
    }
}
