//! Error types surfaced by the authentication controller and hooks.

/// Errors returned by authentication operations.
///
/// The type is `Clone + PartialEq` so the most recent failure can be kept in
/// [`AuthState`](crate::AuthState) and compared by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// `use_auth()` was called outside of an `AuthProvider` scope
    #[error(
        "AuthProvider context is undefined, please verify you are calling use_auth() as child of a AuthProvider component."
    )]
    MissingProvider,

    /// No `UserManager` implementation was configured for the provider
    #[error(
        "UserManager::{operation} was called without a UserManager implementation. \
         Configure one with AuthProviderSettings::with_implementation() or with_user_manager()."
    )]
    MissingImplementation {
        /// Name of the operation that was attempted
        operation: &'static str,
    },

    /// A required configuration value is missing or empty
    #[error("Invalid OIDC configuration: {0}")]
    InvalidConfig(String),

    /// The wrapped OIDC client reported a failure
    #[error("OIDC client error: {0}")]
    Client(String),

    /// The ID token could not be decoded into a user profile
    #[error("Invalid ID token: {0}")]
    InvalidIdToken(String),
}

impl AuthError {
    /// Wraps any client-side failure message.
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client(message.into())
    }

    /// Returns true for errors caused by how the provider was set up rather
    /// than by the identity provider or the network.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingProvider | Self::MissingImplementation { .. } | Self::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_provider_message() {
        let message = AuthError::MissingProvider.to_string();
        assert!(message.contains("AuthProvider context is undefined"));
        assert!(message.contains("as child of a AuthProvider component"));
    }

    #[test]
    fn test_missing_implementation_names_operation() {
        let err = AuthError::MissingImplementation {
            operation: "signinRedirect",
        };
        assert!(err.to_string().contains("UserManager::signinRedirect"));
    }

    #[test]
    fn test_configuration_errors() {
        assert!(AuthError::MissingProvider.is_configuration_error());
        assert!(AuthError::InvalidConfig("client_id".into()).is_configuration_error());
        assert!(!AuthError::client("popup closed").is_configuration_error());
        assert!(!AuthError::InvalidIdToken("bad".into()).is_configuration_error());
    }
}
