//! Session and profile data returned by the wrapped OIDC client.
//!
//! [`User`] is the opaque session record owned by the authentication controller.
//! It is only ever replaced, never mutated in place. [`UserProfile`] carries the
//! standard OpenID Connect claims of the signed-in user.

use serde::{Deserialize, Serialize};

use crate::AuthError;
use crate::client::jwt::decode_id_token;

/// Standard OpenID Connect claims describing the signed-in user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Subject, the unique user identifier at the provider
    pub sub: String,

    /// User's email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Email verification status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// User's display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// User's given/first name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    /// User's family/last name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// User's nickname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// URL to the user's profile picture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Issuer of the ID token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience of the ID token, a string or an array of strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// Expiration timestamp of the ID token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl UserProfile {
    /// Creates a profile with only the subject set.
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            ..Self::default()
        }
    }

    /// Returns a display name for the user.
    ///
    /// Prefers the user's name if available, falls back to email,
    /// and finally to the subject.
    ///
    /// # Example
    ///
    /// ```
    /// # use dxoidc::UserProfile;
    /// let mut profile = UserProfile::new("user-123");
    /// assert_eq!(profile.display_name(), "user-123");
    /// profile.name = Some("John Doe".to_string());
    /// assert_eq!(profile.display_name(), "John Doe");
    /// ```
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }

    /// Returns the user's initials for avatar display.
    ///
    /// If the user has a name, returns the first letter of the first two words.
    /// Otherwise, returns the first two characters of the email or subject.
    pub fn initials(&self) -> String {
        if let Some(name) = &self.name {
            let parts: Vec<&str> = name.split_whitespace().collect();
            match parts.as_slice() {
                [] => "??".to_string(),
                [single] => single.chars().take(2).collect::<String>().to_uppercase(),
                [first, second, ..] => {
                    let first = first.chars().next().unwrap_or('?');
                    let second = second.chars().next().unwrap_or('?');
                    format!("{}{}", first, second).to_uppercase()
                }
            }
        } else if let Some(email) = &self.email {
            email.chars().take(2).collect::<String>().to_uppercase()
        } else {
            self.sub.chars().take(2).collect::<String>().to_uppercase()
        }
    }
}

/// The signed-in user's session record as returned by the OIDC client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Access token for calling protected resources
    pub access_token: String,

    /// Raw ID token (JWT)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Refresh token, when the provider issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Session state value from the authorization response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,

    /// Token type, normally "Bearer"
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Granted scopes, space separated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Claims describing the user
    pub profile: UserProfile,

    /// Unix timestamp (seconds) when the access token expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,

    /// Application state carried through the sign-in round trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl User {
    /// Creates a session record with a bearer access token and profile.
    pub fn new(access_token: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: None,
            refresh_token: None,
            session_state: None,
            token_type: default_token_type(),
            scope: None,
            profile,
            expires_at: None,
            state: None,
        }
    }

    /// Builds a session record from raw tokens, decoding the profile from the ID token.
    ///
    /// The ID token signature is not verified; the wrapped client is expected to
    /// have done so before handing the tokens over.
    pub fn from_tokens(
        access_token: String,
        id_token: String,
        expires_in: Option<u64>,
    ) -> Result<Self, AuthError> {
        let profile = decode_id_token(&id_token)?;
        let mut user = Self::new(access_token, profile);
        user.id_token = Some(id_token);
        user.expires_at = expires_in.map(|secs| current_timestamp().saturating_add(secs));
        Ok(user)
    }

    /// Seconds until the access token expires, negative once it has expired.
    pub fn expires_in(&self) -> Option<i64> {
        self.expires_at
            .map(|at| {
                let at = i64::try_from(at).unwrap_or(i64::MAX);
                let now = i64::try_from(current_timestamp()).unwrap_or(i64::MAX);
                at.saturating_sub(now)
            })
    }

    /// Returns true once the access token's expiry has passed.
    ///
    /// Sessions without an expiry never report as expired.
    pub fn expired(&self) -> bool {
        self.expires_in().is_some_and(|secs| secs <= 0)
    }

    /// Returns the granted scopes as a list.
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|scope| scope.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Returns current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Date::now() / 1000.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
