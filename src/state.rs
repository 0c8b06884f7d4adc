//! Authentication state snapshot and the transitions applied to it.
//!
//! The controller never edits [`AuthState`] field by field; every change goes
//! through an [`AuthAction`] so the `is_loading`/`active_navigator` invariant
//! holds at every observable point.

use std::fmt;

use crate::{AuthError, User};

/// The sign-in or sign-out flow currently in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Navigator {
    SigninRedirect,
    SigninPopup,
    SigninSilent,
    SignoutRedirect,
    SignoutPopup,
}

impl Navigator {
    /// Stable name of the navigation method, as used in errors and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SigninRedirect => "signinRedirect",
            Self::SigninPopup => "signinPopup",
            Self::SigninSilent => "signinSilent",
            Self::SignoutRedirect => "signoutRedirect",
            Self::SignoutPopup => "signoutPopup",
        }
    }
}

impl fmt::Display for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication state exposed to the rendering layer.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    /// Current session, if any
    pub user: Option<User>,
    /// Whether initialization or a navigation is still in progress
    pub is_loading: bool,
    /// Whether a non-expired session is present
    pub is_authenticated: bool,
    /// Navigation method currently in flight
    pub active_navigator: Option<Navigator>,
    /// Most recent failure
    pub error: Option<AuthError>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
            is_authenticated: false,
            active_navigator: None,
            error: None,
        }
    }
}

/// A single state transition.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthAction {
    /// Initial hydration finished
    Initialised(Option<User>),
    /// A session was loaded or replaced
    UserLoaded(User),
    /// The session was removed
    UserUnloaded,
    /// A navigation method became the active one
    NavigatorInit(Navigator),
    /// No navigation is in flight anymore
    NavigatorClose,
    /// An operation failed
    Error(AuthError),
}

impl AuthState {
    /// Applies an action, returning the next state.
    pub fn reduce(mut self, action: AuthAction) -> Self {
        self.apply(action);
        self
    }

    /// Applies an action in place.
    pub fn apply(&mut self, action: AuthAction) {
        match action {
            AuthAction::Initialised(user) => {
                self.set_user(user);
                self.is_loading = self.active_navigator.is_some();
                self.error = None;
            }
            AuthAction::UserLoaded(user) => {
                self.set_user(Some(user));
                self.error = None;
            }
            AuthAction::UserUnloaded => self.set_user(None),
            AuthAction::NavigatorInit(navigator) => {
                self.active_navigator = Some(navigator);
                self.is_loading = true;
            }
            AuthAction::NavigatorClose => {
                self.active_navigator = None;
                self.is_loading = false;
            }
            AuthAction::Error(error) => {
                self.is_loading = self.active_navigator.is_some();
                self.error = Some(error);
            }
        }
    }

    fn set_user(&mut self, user: Option<User>) {
        self.is_authenticated = user.as_ref().is_some_and(|user| !user.expired());
        self.user = user;
    }
}
