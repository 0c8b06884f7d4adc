//! Dioxus hooks exposing the authentication controller to components.
//!
//! `use_auth_provider()` (or the `AuthProvider` component) creates one
//! [`AuthController`] for the subtree and mirrors its state into a signal.
//! Descendants read the state and call the operations through `use_auth()`.

use dioxus::prelude::*;

use crate::controller::AuthController;
use crate::location::current_location;
use crate::settings::AuthProviderSettings;
use crate::{AuthError, AuthState, Navigator, SigninArgs, SignoutArgs, User};

/// Provides authentication context to the component tree.
///
/// This hook must be called once near the root of your application (e.g., in
/// `App`). The settings closure runs only on the first render. On mount the
/// controller processes a pending sign-in callback or loads the stored session,
/// and starts mirroring the client's session events. On unmount the controller
/// is disposed.
///
/// # Example
///
/// ```ignore
/// #[component]
/// pub fn App() -> Element {
///     use_auth_provider(|| {
///         AuthProviderSettings::new(OidcConfig::from_env_or_panic())
///             .with_implementation(|config| Rc::new(MyUserManager::new(config)))
///             .on_signin_callback(|_| remove_auth_params_from_location())
///     });
///     // ... rest of app
/// }
/// ```
pub fn use_auth_provider(init: impl FnOnce() -> AuthProviderSettings) -> AuthContext {
    let controller = use_hook(|| AuthController::new(init()));
    let state = use_signal(|| controller.snapshot());

    use_hook({
        let controller = controller.clone();
        move || {
            let mut changes = controller.subscribe();
            spawn(async move {
                let mut state = state;
                while changes.changed().await.is_ok() {
                    let next = changes.borrow_and_update().clone();
                    state.set(next);
                }
            });
            spawn(controller.listen());
        }
    });

    use_effect({
        let controller = controller.clone();
        move || {
            let controller = controller.clone();
            spawn(async move {
                let location = current_location();
                controller.initialize(location.as_deref()).await;
            });
        }
    });

    use_drop({
        let controller = controller.clone();
        move || controller.dispose()
    });

    use_context_provider(|| AuthContext::bound(state, controller.clone()))
}

/// Component form of [`use_auth_provider`].
///
/// # Example
///
/// ```ignore
/// rsx! {
///     AuthProvider { settings: settings.clone(),
///         Router::<Route> {}
///     }
/// }
/// ```
#[component]
pub fn AuthProvider(settings: AuthProviderSettings, children: Element) -> Element {
    use_auth_provider(move || settings);
    children
}

/// Hook for accessing authentication state and operations.
///
/// Outside of a provider this returns a detached context whose operations fail
/// with [`AuthError::MissingProvider`].
pub fn use_auth() -> AuthContext {
    try_use_context::<AuthContext>().unwrap_or_else(|| {
        tracing::trace!("use_auth() called without an AuthProvider ancestor");
        AuthContext::detached()
    })
}

/// Context object returned by `use_auth`.
#[derive(Clone)]
pub struct AuthContext {
    inner: Option<BoundContext>,
}

#[derive(Clone)]
struct BoundContext {
    state: Signal<AuthState>,
    controller: AuthController,
}

impl AuthContext {
    fn bound(state: Signal<AuthState>, controller: AuthController) -> Self {
        Self {
            inner: Some(BoundContext { state, controller }),
        }
    }

    /// A context with no provider behind it.
    pub fn detached() -> Self {
        Self { inner: None }
    }

    /// Returns true if this context is connected to a provider.
    pub fn is_bound(&self) -> bool {
        self.inner.is_some()
    }

    fn controller(&self) -> Result<&AuthController, AuthError> {
        self.inner
            .as_ref()
            .map(|inner| &inner.controller)
            .ok_or(AuthError::MissingProvider)
    }

    /// Returns the current state, subscribing the calling component to changes.
    pub fn state(&self) -> Result<AuthState, AuthError> {
        self.inner
            .as_ref()
            .map(|inner| inner.state.read().clone())
            .ok_or(AuthError::MissingProvider)
    }

    /// Returns the signed-in user, if available.
    pub fn user(&self) -> Option<User> {
        self.state().ok().and_then(|state| state.user)
    }

    /// Returns true while initialization or a navigation is in progress.
    pub fn is_loading(&self) -> bool {
        self.state().is_ok_and(|state| state.is_loading)
    }

    /// Returns true if a non-expired session is present.
    pub fn is_authenticated(&self) -> bool {
        self.state().is_ok_and(|state| state.is_authenticated)
    }

    /// Returns the navigation currently in flight.
    pub fn active_navigator(&self) -> Option<Navigator> {
        self.state().ok().and_then(|state| state.active_navigator)
    }

    /// Returns the most recent error.
    pub fn error(&self) -> Option<AuthError> {
        self.state().ok().and_then(|state| state.error)
    }

    /// Returns true if there is an authentication error.
    pub fn has_error(&self) -> bool {
        self.error().is_some()
    }

    pub async fn signin_redirect(&self, args: SigninArgs) -> Result<(), AuthError> {
        self.controller()?.signin_redirect(args).await
    }

    pub async fn signin_popup(&self, args: SigninArgs) -> Result<User, AuthError> {
        self.controller()?.signin_popup(args).await
    }

    pub async fn signin_silent(&self, args: SigninArgs) -> Result<Option<User>, AuthError> {
        self.controller()?.signin_silent(args).await
    }

    pub async fn signout_redirect(&self, args: SignoutArgs) -> Result<(), AuthError> {
        self.controller()?.signout_redirect(args).await
    }

    pub async fn signout_popup(&self, args: SignoutArgs) -> Result<(), AuthError> {
        self.controller()?.signout_popup(args).await
    }

    pub async fn remove_user(&self) -> Result<(), AuthError> {
        self.controller()?.remove_user().await
    }

    pub async fn clear_stale_state(&self) -> Result<(), AuthError> {
        self.controller()?.clear_stale_state().await
    }

    pub async fn revoke_tokens(&self) -> Result<(), AuthError> {
        self.controller()?.revoke_tokens().await
    }

    pub fn start_silent_renew(&self) -> Result<(), AuthError> {
        self.controller()?.start_silent_renew()
    }

    pub fn stop_silent_renew(&self) -> Result<(), AuthError> {
        self.controller()?.stop_silent_renew()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockUserManager, ProviderFixture, drive_until, test_user};
    use crate::UserManagerEvent;
    use dioxus_core::VirtualDom;

    #[tokio::test]
    async fn test_provider_supplies_bound_context() {
        let fixture =
            ProviderFixture::with_manager(MockUserManager::default().with_stored_user(test_user()));
        let mut dom = VirtualDom::new_with_props(ProviderFixture::render, fixture.clone());
        dom.rebuild_in_place();

        let auth = fixture.context();
        assert!(auth.is_bound());
        assert!(dom.in_runtime(|| auth.is_loading()));

        drive_until(&mut dom, |dom| dom.in_runtime(|| !auth.is_loading())).await;

        let state = dom.in_runtime(|| auth.state()).unwrap();
        assert!(state.is_authenticated);
        assert_eq!(state.user, Some(test_user()));
        assert!(state.error.is_none());
        assert_eq!(fixture.manager.calls("getUser"), 1);
    }

    #[tokio::test]
    async fn test_bound_context_follows_operations_and_events() {
        let fixture =
            ProviderFixture::with_manager(MockUserManager::default().with_stored_user(test_user()));
        let mut dom = VirtualDom::new_with_props(ProviderFixture::render, fixture.clone());
        dom.rebuild_in_place();
        let auth = fixture.context();
        drive_until(&mut dom, |dom| dom.in_runtime(|| auth.is_authenticated())).await;

        auth.remove_user().await.unwrap();
        drive_until(&mut dom, |dom| dom.in_runtime(|| auth.user().is_none())).await;
        assert_eq!(fixture.manager.calls("removeUser"), 1);

        fixture
            .manager
            .emit(UserManagerEvent::UserLoaded(test_user()));
        drive_until(&mut dom, |dom| dom.in_runtime(|| auth.is_authenticated())).await;
        assert_eq!(dom.in_runtime(|| auth.user()), Some(test_user()));
    }

    #[tokio::test]
    async fn test_detached_context_rejects_operations() {
        let auth = AuthContext::detached();
        assert!(!auth.is_bound());

        let err = auth
            .signin_redirect(SigninArgs::default())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MissingProvider);
        assert!(err.to_string().contains(
            "AuthProvider context is undefined, please verify you are calling use_auth() as child of a AuthProvider component."
        ));

        assert_eq!(
            auth.signin_popup(SigninArgs::default()).await,
            Err(AuthError::MissingProvider)
        );
        assert_eq!(
            auth.signin_silent(SigninArgs::default()).await,
            Err(AuthError::MissingProvider)
        );
        assert_eq!(
            auth.signout_redirect(SignoutArgs::default()).await,
            Err(AuthError::MissingProvider)
        );
        assert_eq!(
            auth.signout_popup(SignoutArgs::default()).await,
            Err(AuthError::MissingProvider)
        );
        assert_eq!(auth.remove_user().await, Err(AuthError::MissingProvider));
        assert_eq!(auth.clear_stale_state().await, Err(AuthError::MissingProvider));
        assert_eq!(auth.revoke_tokens().await, Err(AuthError::MissingProvider));
        assert_eq!(auth.start_silent_renew(), Err(AuthError::MissingProvider));
        assert_eq!(auth.stop_silent_renew(), Err(AuthError::MissingProvider));
    }

    #[test]
    fn test_detached_context_state() {
        let auth = AuthContext::detached();

        assert_eq!(auth.state(), Err(AuthError::MissingProvider));
        assert!(auth.user().is_none());
        assert!(!auth.is_loading());
        assert!(!auth.is_authenticated());
        assert!(auth.active_navigator().is_none());
        assert!(!auth.has_error());
    }
}
