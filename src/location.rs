//! Helpers for recognising and cleaning up authorization callback URLs.

use url::form_urlencoded;

/// Query/fragment parameters the provider adds when redirecting back.
const AUTH_PARAMS: [&str; 4] = ["code", "error", "state", "session_state"];

/// Returns true if the URL carries the parameters of an authorization response:
/// `state` plus either `code` or `error`, in the query string or the fragment.
///
/// Accepts absolute URLs as well as bare paths such as `/?code=a&state=b`.
///
/// # Example
///
/// ```
/// # use dxoidc::has_auth_params;
/// assert!(has_auth_params("https://app.example.com/?code=abc&state=xyz"));
/// assert!(has_auth_params("/callback#error=access_denied&state=xyz"));
/// assert!(!has_auth_params("/?state=xyz"));
/// ```
pub fn has_auth_params(url: &str) -> bool {
    let (query, fragment) = split_url(url);
    [query, fragment]
        .into_iter()
        .flatten()
        .any(params_indicate_callback)
}

fn params_indicate_callback(params: &str) -> bool {
    let mut has_code_or_error = false;
    let mut has_state = false;
    for (key, _) in form_urlencoded::parse(params.as_bytes()) {
        match key.as_ref() {
            "code" | "error" => has_code_or_error = true,
            "state" => has_state = true,
            _ => {}
        }
    }
    has_code_or_error && has_state
}

/// Splits a URL into its (query, fragment) parts.
fn split_url(url: &str) -> (Option<&str>, Option<&str>) {
    let (before_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let query = before_fragment.split_once('?').map(|(_, query)| query);
    (query, fragment)
}

/// Removes the authorization response parameters from a URL, keeping any other
/// query parameters intact.
///
/// # Example
///
/// ```
/// # use dxoidc::strip_auth_params;
/// assert_eq!(
///     strip_auth_params("https://app.example.com/home?code=abc&state=xyz&tab=2"),
///     "https://app.example.com/home?tab=2"
/// );
/// ```
pub fn strip_auth_params(url: &str) -> String {
    let (before_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (path, query) = match before_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (before_fragment, None),
    };

    let mut stripped = path.to_string();
    if let Some(query) = query.and_then(strip_callback_params) {
        stripped.push('?');
        stripped.push_str(&query);
    }
    if let Some(fragment) = fragment.and_then(strip_callback_params) {
        stripped.push('#');
        stripped.push_str(&fragment);
    }
    stripped
}

/// Drops the auth parameters from a callback query or fragment. Anything else is
/// kept as is.
fn strip_callback_params(params: &str) -> Option<String> {
    if !params_indicate_callback(params) {
        return (!params.is_empty()).then(|| params.to_string());
    }
    retain_non_auth_params(params)
}

fn retain_non_auth_params(params: &str) -> Option<String> {
    let kept: Vec<(String, String)> = form_urlencoded::parse(params.as_bytes())
        .filter(|(key, _)| !AUTH_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        return None;
    }

    Some(
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish(),
    )
}

/// Reads the browser's current URL.
#[cfg(target_arch = "wasm32")]
pub fn current_location() -> Option<String> {
    web_sys::window().and_then(|w| w.location().href().ok())
}

/// Non-WASM stub for current_location.
#[cfg(not(target_arch = "wasm32"))]
pub fn current_location() -> Option<String> {
    None
}

/// Replaces the browser's history entry with the current URL minus the
/// authorization response parameters.
///
/// Intended for use inside an `on_signin_callback` hook so a page reload does not
/// replay the callback.
#[cfg(target_arch = "wasm32")]
pub fn remove_auth_params_from_location() {
    let Some(window) = web_sys::window() else {
        tracing::error!("Failed to get window for history cleanup");
        return;
    };
    let Ok(href) = window.location().href() else {
        return;
    };

    let cleaned = strip_auth_params(&href);
    match window.history() {
        Ok(history) => {
            if history
                .replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&cleaned))
                .is_err()
            {
                tracing::warn!("Failed to replace history state after sign-in callback");
            } else {
                tracing::trace!("Removed authorization parameters from location");
            }
        }
        Err(_) => tracing::warn!("Browser history is not available"),
    }
}

/// Non-WASM stub for remove_auth_params_from_location.
#[cfg(not(target_arch = "wasm32"))]
pub fn remove_auth_params_from_location() {
    tracing::trace!("History cleanup skipped (non-WASM)");
}
