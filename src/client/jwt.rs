//! ID token decoding.
//!
//! Extracts the profile claims from a JWT ID token. This performs basic JWT
//! parsing without signature verification; validating tokens is the wrapped
//! OIDC client's job.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::{AuthError, UserProfile};

/// Decodes a JWT ID token and extracts the profile claims.
///
/// # Arguments
///
/// * `token` - The JWT ID token string
///
/// # Errors
///
/// Returns [`AuthError::InvalidIdToken`] when the token is not three
/// dot-separated parts, the payload is not base64url, or the payload is not
/// a JSON claims object with a `sub`.
pub fn decode_id_token(token: &str) -> Result<UserProfile, AuthError> {
    tracing::trace!("Decoding ID token to extract profile claims");

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        tracing::error!("Invalid JWT format: expected 3 parts, got {}", parts.len());
        return Err(AuthError::InvalidIdToken(
            "must have 3 parts separated by dots".to_string(),
        ));
    };

    let decoded_bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidIdToken(format!("failed to decode base64: {}", e)))?;

    let profile: UserProfile = serde_json::from_slice(&decoded_bytes)
        .map_err(|e| AuthError::InvalidIdToken(format!("failed to parse claims: {}", e)))?;

    tracing::trace!(
        "Successfully decoded ID token: sub={}, email={:?}",
        profile.sub,
        profile.email
    );

    Ok(profile)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds an unsigned JWT around the given payload.
    pub(crate) fn create_test_jwt(payload: &str) -> String {
        let header = r#"{"alg":"RS256","typ":"JWT"}"#;
        let header_b64 = URL_SAFE_NO_PAD.encode(header.as_bytes());
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());

        format!("{}.{}.dummy_signature", header_b64, payload_b64)
    }

    #[test]
    fn test_decode_full_claims() {
        let payload = r#"{
            "sub": "user-123",
            "email": "test@example.com",
            "email_verified": true,
            "name": "Test User",
            "given_name": "Test",
            "family_name": "User",
            "nickname": "tester",
            "picture": "https://example.com/avatar.jpg",
            "iss": "https://login.example.com/",
            "aud": ["client_a", "client_b"],
            "iat": 1234567890,
            "exp": 1234571490
        }"#;

        let profile = decode_id_token(&create_test_jwt(payload)).unwrap();

        assert_eq!(profile.sub, "user-123");
        assert_eq!(profile.email.as_deref(), Some("test@example.com"));
        assert_eq!(profile.email_verified, Some(true));
        assert_eq!(profile.given_name.as_deref(), Some("Test"));
        assert_eq!(profile.family_name.as_deref(), Some("User"));
        assert_eq!(profile.nickname.as_deref(), Some("tester"));
        assert_eq!(profile.iss.as_deref(), Some("https://login.example.com/"));
        assert_eq!(
            profile.aud,
            Some(serde_json::json!(["client_a", "client_b"]))
        );
        assert_eq!(profile.iat, Some(1234567890));
        assert_eq!(profile.exp, Some(1234571490));
    }

    #[test]
    fn test_decode_minimal_claims() {
        let profile = decode_id_token(&create_test_jwt(r#"{"sub":"user-123"}"#)).unwrap();

        assert_eq!(profile.sub, "user-123");
        assert!(profile.email.is_none());
        assert!(profile.aud.is_none());
    }

    #[test]
    fn test_decode_invalid_format() {
        let err = decode_id_token("not.a.valid.jwt.format").unwrap_err();
        assert!(err.to_string().contains("must have 3 parts"));
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert!(decode_id_token("header.!@#$%^&*().signature").is_err());
    }

    #[test]
    fn test_decode_missing_subject() {
        let err = decode_id_token(&create_test_jwt(r#"{"name":"No Sub"}"#)).unwrap_err();
        assert!(err.to_string().contains("failed to parse claims"));
    }
}
