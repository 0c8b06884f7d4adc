//! Guard component that sends anonymous visitors to the sign-in page.

use dioxus::prelude::*;

use crate::{AuthState, SigninArgs};
use crate::client::use_auth::use_auth;

/// Decides when the guard starts a sign-in redirect.
///
/// At most one redirect is started per signed-out period. Becoming
/// authenticated re-arms the guard so a later sign-out redirects again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RedirectGuard {
    attempted: bool,
}

impl RedirectGuard {
    /// Returns true if a redirect should start for `state`.
    pub(crate) fn observe(&mut self, state: &AuthState) -> bool {
        if state.is_authenticated {
            self.attempted = false;
            return false;
        }
        if self.attempted
            || state.is_loading
            || state.active_navigator.is_some()
            || state.error.is_some()
        {
            return false;
        }
        self.attempted = true;
        true
    }
}

/// Renders `children` only for authenticated users.
///
/// Once initialization has finished without a session, no navigation is in
/// flight and no error was recorded, a sign-in redirect is started. Until the
/// user is authenticated `on_redirecting` is rendered instead, or nothing.
///
/// # Example
///
/// ```ignore
/// rsx! {
///     AuthenticationRequired {
///         on_redirecting: rsx! { p { "Redirecting to sign in..." } },
///         Dashboard {}
///     }
/// }
/// ```
#[component]
pub fn AuthenticationRequired(
    children: Element,
    on_redirecting: Option<Element>,
    #[props(default)] signin_args: SigninArgs,
) -> Element {
    let auth = use_auth();
    let mut guard = use_signal(RedirectGuard::default);

    use_effect({
        let auth = auth.clone();
        move || {
            let state = match auth.state() {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("AuthenticationRequired: {}", e);
                    return;
                }
            };

            if !guard.write().observe(&state) {
                return;
            }

            tracing::trace!("Not authenticated, starting sign-in redirect");
            let auth = auth.clone();
            let args = signin_args.clone();
            spawn(async move {
                if let Err(e) = auth.signin_redirect(args).await {
                    tracing::error!("Sign-in redirect failed: {}", e);
                }
            });
        }
    });

    if auth.is_authenticated() {
        children
    } else {
        on_redirecting.unwrap_or_else(|| rsx! {})
    }
}
