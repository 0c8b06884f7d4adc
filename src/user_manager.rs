//! The capability interface of the wrapped OIDC client.
//!
//! The controller never talks to a concrete client type. Anything that can
//! perform the sign-in/sign-out flows, report the stored session, and publish
//! session events can be plugged in as a [`UserManager`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{AuthError, User};

/// Session events published by the wrapped client.
///
/// These cover changes the client makes on its own, such as silent renewal or
/// a sign-out detected in another tab.
#[derive(Clone, Debug, PartialEq)]
pub enum UserManagerEvent {
    /// A session was loaded or renewed
    UserLoaded(User),
    /// The stored session was removed
    UserUnloaded,
    /// The provider reported the user signed out
    UserSignedOut,
    /// The provider session expired
    UserSessionExpired,
    /// Background renewal failed
    SilentRenewError(String),
}

/// Arguments forwarded to the sign-in methods.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SigninArgs {
    /// Application state carried through the round trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    /// `prompt` parameter, e.g. "login" or "none"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// `login_hint` parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
    /// Overrides the configured redirect URI for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Additional authorization request parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_query_params: BTreeMap<String, String>,
}

/// Arguments forwarded to the sign-out methods.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignoutArgs {
    /// Application state carried through the round trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    /// ID token sent as `id_token_hint`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_hint: Option<String>,
    /// Overrides the configured post-logout redirect URI for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,
    /// Additional end-session request parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_query_params: BTreeMap<String, String>,
}

/// An OIDC client the authentication controller can drive.
///
/// Futures are not required to be `Send`: the controller runs on the UI thread,
/// which in the browser is the only thread.
#[async_trait(?Send)]
pub trait UserManager {
    /// Navigates the window to the authorization endpoint.
    async fn signin_redirect(&self, args: SigninArgs) -> Result<(), AuthError>;

    /// Signs in through a popup window.
    async fn signin_popup(&self, args: SigninArgs) -> Result<User, AuthError>;

    /// Signs in through a hidden frame or a refresh token.
    async fn signin_silent(&self, args: SigninArgs) -> Result<Option<User>, AuthError>;

    /// Processes the authorization response found in `url`.
    async fn signin_callback(&self, url: &str) -> Result<Option<User>, AuthError>;

    /// Navigates the window to the end-session endpoint.
    async fn signout_redirect(&self, args: SignoutArgs) -> Result<(), AuthError>;

    /// Signs out through a popup window.
    async fn signout_popup(&self, args: SignoutArgs) -> Result<(), AuthError>;

    /// Removes the stored session without contacting the provider.
    async fn remove_user(&self) -> Result<(), AuthError>;

    /// Loads the stored session, if any.
    async fn get_user(&self) -> Result<Option<User>, AuthError>;

    /// Subscribes to session events.
    fn events(&self) -> broadcast::Receiver<UserManagerEvent>;

    /// Removes leftover sign-in/sign-out state from storage.
    ///
    /// The default implementation does nothing.
    async fn clear_stale_state(&self) -> Result<(), AuthError> {
        Ok(())
    }

    /// Starts automatic background renewal.
    ///
    /// The default implementation does nothing.
    fn start_silent_renew(&self) {}

    /// Stops automatic background renewal.
    ///
    /// The default implementation does nothing.
    fn stop_silent_renew(&self) {}

    /// Revokes the session's tokens at the provider.
    ///
    /// The default implementation does nothing.
    async fn revoke_tokens(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signin_args_default_serialization() {
        let json = serde_json::to_string(&SigninArgs::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_signout_args_deserialization() {
        let json = r#"{
            "id_token_hint": "token",
            "extra_query_params": { "federated": "true" }
        }"#;

        let args: SignoutArgs = serde_json::from_str(json).unwrap();
        assert_eq!(args.id_token_hint.as_deref(), Some("token"));
        assert_eq!(
            args.extra_query_params.get("federated").map(String::as_str),
            Some("true")
        );
        assert!(args.post_logout_redirect_uri.is_none());
    }
}
