//! The authentication state controller.
//!
//! [`AuthController`] owns the authentication state of one provider scope. It
//! delegates every flow to the configured [`UserManager`] and records the
//! outcome as [`AuthAction`]s on a watch channel that the rendering layer
//! observes.
//!
//! Overlapping navigations are tracked individually: the most recently started
//! navigation that is still in flight is reported as active, and loading ends
//! only when none is left. User and error updates are applied in the order the
//! operations settle.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use tokio::sync::{Notify, broadcast, watch};

use crate::location::has_auth_params;
use crate::settings::AuthProviderSettings;
use crate::{
    AuthAction, AuthError, AuthState, Navigator, SigninArgs, SignoutArgs, User, UserManager,
    UserManagerEvent,
};

/// Shared handle to one provider scope's authentication state.
///
/// Cloning is cheap; all clones drive the same state.
#[derive(Clone)]
pub struct AuthController {
    inner: Rc<ControllerInner>,
}

struct ControllerInner {
    settings: AuthProviderSettings,
    user_manager: Option<Rc<dyn UserManager>>,
    state: watch::Sender<AuthState>,
    in_flight: RefCell<Vec<(u64, Navigator)>>,
    next_navigation: Cell<u64>,
    disposed: Cell<bool>,
    shutdown: Notify,
}

impl AuthController {
    /// Creates a controller, building the client from the settings.
    pub fn new(settings: AuthProviderSettings) -> Self {
        if let Err(e) = settings.config.validate() {
            tracing::warn!("{}", e);
        }

        let user_manager = settings.build_user_manager();
        if user_manager.is_none() {
            tracing::warn!("No UserManager implementation configured, operations will fail");
        }

        let (state, _) = watch::channel(AuthState::default());

        Self {
            inner: Rc::new(ControllerInner {
                settings,
                user_manager,
                state,
                in_flight: RefCell::new(Vec::new()),
                next_navigation: Cell::new(0),
                disposed: Cell::new(false),
                shutdown: Notify::new(),
            }),
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Returns the settings the controller was created with.
    pub fn settings(&self) -> &AuthProviderSettings {
        &self.inner.settings
    }

    /// Returns the configured client, or a configuration error naming `operation`.
    pub fn user_manager(&self, operation: &'static str) -> Result<Rc<dyn UserManager>, AuthError> {
        self.inner
            .user_manager
            .clone()
            .ok_or(AuthError::MissingImplementation { operation })
    }

    /// Stops all further state updates and ends the event listener.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        tracing::trace!("Disposing authentication controller");
        self.inner.shutdown.notify_waiters();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    fn dispatch(&self, action: AuthAction) {
        if self.is_disposed() {
            tracing::trace!("Dropping {:?} after dispose", action);
            return;
        }
        self.inner.state.send_modify(|state| state.apply(action));
    }

    /// Hydrates the initial state.
    ///
    /// If `location` carries authorization response parameters the sign-in
    /// callback is processed first and `on_signin_callback` is invoked with its
    /// result. Otherwise, or when the callback produced no user, the stored
    /// session is loaded. Loading always ends, even when either step fails.
    pub async fn initialize(&self, location: Option<&str>) {
        let user_manager = match self.user_manager("getUser") {
            Ok(user_manager) => user_manager,
            Err(e) => {
                tracing::error!("Cannot initialize authentication: {}", e);
                self.dispatch(AuthAction::Error(e));
                return;
            }
        };

        let mut callback_error = None;
        let mut user = None;

        if let Some(url) = location.filter(|url| has_auth_params(url)) {
            if self.inner.settings.skip_signin_callback {
                tracing::trace!("Authorization parameters present, callback skipped by settings");
            } else {
                tracing::trace!("Processing sign-in callback");
                match user_manager.signin_callback(url).await {
                    Ok(result) => user = result,
                    Err(e) => {
                        tracing::error!("Sign-in callback failed: {}", e);
                        callback_error = Some(e);
                    }
                }
                if let Some(hook) = &self.inner.settings.on_signin_callback {
                    hook(user.as_ref());
                }
            }
        }

        if user.is_none() {
            tracing::trace!("Loading stored session");
            match user_manager.get_user().await {
                Ok(stored) => user = stored,
                Err(e) => {
                    tracing::error!("Failed to load stored session: {}", e);
                    self.dispatch(AuthAction::Initialised(None));
                    self.dispatch(AuthAction::Error(callback_error.unwrap_or(e)));
                    return;
                }
            }
        }

        tracing::trace!("Authentication initialized, signed in: {}", user.is_some());
        self.dispatch(AuthAction::Initialised(user));
        if let Some(e) = callback_error {
            self.dispatch(AuthAction::Error(e));
        }
    }

    /// Mirrors client session events into the state until the client closes its
    /// event channel or the controller is disposed.
    ///
    /// The subscription is taken when this method is called, not when the
    /// returned future is first polled.
    pub fn listen(&self) -> impl Future<Output = ()> + use<> {
        let events = self.inner.user_manager.as_ref().map(|m| m.events());
        let controller = self.clone();

        async move {
            let Some(mut events) = events else {
                return;
            };

            loop {
                if controller.is_disposed() {
                    break;
                }

                let received = tokio::select! {
                    biased;
                    _ = controller.inner.shutdown.notified() => break,
                    received = events.recv() => received,
                };

                match received {
                    Ok(event) => controller.handle_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} session events, reloading user", skipped);
                        controller.resync().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::trace!("Session event channel closed");
                        break;
                    }
                }
            }
        }
    }

    /// Applies a single session event.
    pub fn handle_event(&self, event: UserManagerEvent) {
        tracing::trace!("Session event: {:?}", event);
        match event {
            UserManagerEvent::UserLoaded(user) => self.dispatch(AuthAction::UserLoaded(user)),
            UserManagerEvent::UserUnloaded
            | UserManagerEvent::UserSignedOut
            | UserManagerEvent::UserSessionExpired => self.dispatch(AuthAction::UserUnloaded),
            UserManagerEvent::SilentRenewError(message) => {
                self.dispatch(AuthAction::Error(AuthError::Client(message)))
            }
        }
    }

    async fn resync(&self) {
        let Ok(user_manager) = self.user_manager("getUser") else {
            return;
        };
        match user_manager.get_user().await {
            Ok(Some(user)) => self.dispatch(AuthAction::UserLoaded(user)),
            Ok(None) => self.dispatch(AuthAction::UserUnloaded),
            Err(e) => self.dispatch(AuthAction::Error(e)),
        }
    }

    /// Runs one navigation: marks it active, awaits the client, then closes it.
    async fn navigate<T, F, Fut>(&self, navigator: Navigator, call: F) -> Result<T, AuthError>
    where
        F: FnOnce(Rc<dyn UserManager>) -> Fut,
        Fut: Future<Output = Result<T, AuthError>>,
    {
        let user_manager = self.user_manager(navigator.as_str())?;

        let id = self.inner.next_navigation.get();
        self.inner.next_navigation.set(id + 1);
        self.inner.in_flight.borrow_mut().push((id, navigator));
        tracing::trace!("Starting {}", navigator);
        self.dispatch(AuthAction::NavigatorInit(navigator));

        let result = call(user_manager).await;

        let still_active = {
            let mut in_flight = self.inner.in_flight.borrow_mut();
            in_flight.retain(|(other, _)| *other != id);
            in_flight.last().map(|(_, navigator)| *navigator)
        };

        if let Err(e) = &result {
            tracing::error!("{} failed: {}", navigator, e);
            self.dispatch(AuthAction::Error(e.clone()));
        }

        match still_active {
            Some(active) => self.dispatch(AuthAction::NavigatorInit(active)),
            None => self.dispatch(AuthAction::NavigatorClose),
        }
        tracing::trace!("Finished {}", navigator);

        result
    }

    /// Redirects the window to the provider's sign-in page.
    pub async fn signin_redirect(&self, args: SigninArgs) -> Result<(), AuthError> {
        self.navigate(Navigator::SigninRedirect, |m| async move {
            m.signin_redirect(args).await
        })
        .await
    }

    /// Signs in through a popup window and stores the resulting user.
    pub async fn signin_popup(&self, args: SigninArgs) -> Result<User, AuthError> {
        let user = self
            .navigate(Navigator::SigninPopup, |m| async move {
                m.signin_popup(args).await
            })
            .await?;
        self.dispatch(AuthAction::UserLoaded(user.clone()));
        Ok(user)
    }

    /// Signs in without user interaction and stores the resulting user, if any.
    pub async fn signin_silent(&self, args: SigninArgs) -> Result<Option<User>, AuthError> {
        let user = self
            .navigate(Navigator::SigninSilent, |m| async move {
                m.signin_silent(args).await
            })
            .await?;
        if let Some(user) = &user {
            self.dispatch(AuthAction::UserLoaded(user.clone()));
        }
        Ok(user)
    }

    /// Redirects the window to the provider's sign-out page.
    pub async fn signout_redirect(&self, args: SignoutArgs) -> Result<(), AuthError> {
        self.navigate(Navigator::SignoutRedirect, |m| async move {
            m.signout_redirect(args).await
        })
        .await?;
        self.dispatch(AuthAction::UserUnloaded);
        if let Some(hook) = &self.inner.settings.on_signout_redirect {
            hook();
        }
        Ok(())
    }

    /// Signs out through a popup window.
    pub async fn signout_popup(&self, args: SignoutArgs) -> Result<(), AuthError> {
        self.navigate(Navigator::SignoutPopup, |m| async move {
            m.signout_popup(args).await
        })
        .await?;
        self.dispatch(AuthAction::UserUnloaded);
        if let Some(hook) = &self.inner.settings.on_signout_popup {
            hook();
        }
        Ok(())
    }

    /// Removes the stored session locally.
    ///
    /// This is not a navigation, so it leaves `is_loading` and
    /// `active_navigator` untouched.
    pub async fn remove_user(&self) -> Result<(), AuthError> {
        let user_manager = self.user_manager("removeUser")?;
        if let Err(e) = user_manager.remove_user().await {
            tracing::error!("removeUser failed: {}", e);
            self.dispatch(AuthAction::Error(e.clone()));
            return Err(e);
        }
        self.dispatch(AuthAction::UserUnloaded);
        if let Some(hook) = &self.inner.settings.on_remove_user {
            hook();
        }
        Ok(())
    }

    /// Removes leftover sign-in/sign-out state kept by the client.
    pub async fn clear_stale_state(&self) -> Result<(), AuthError> {
        self.user_manager("clearStaleState")?
            .clear_stale_state()
            .await
    }

    /// Revokes the session's tokens at the provider.
    pub async fn revoke_tokens(&self) -> Result<(), AuthError> {
        self.user_manager("revokeTokens")?.revoke_tokens().await
    }

    pub fn start_silent_renew(&self) -> Result<(), AuthError> {
        self.user_manager("startSilentRenew")?.start_silent_renew();
        Ok(())
    }

    pub fn stop_silent_renew(&self) -> Result<(), AuthError> {
        self.user_manager("stopSilentRenew")?.stop_silent_renew();
        Ok(())
    }
}
