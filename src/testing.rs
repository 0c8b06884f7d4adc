//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use dioxus::prelude::*;
use dioxus_core::{NoOpMutations, VirtualDom};
use tokio::sync::{broadcast, oneshot};

use crate::client::{AuthContext, AuthenticationRequired, use_auth, use_auth_provider};
use crate::{
    AuthError, AuthProviderSettings, OidcConfig, SigninArgs, SignoutArgs, User, UserManager,
    UserManagerEvent, UserProfile,
};

pub(crate) fn test_config() -> OidcConfig {
    OidcConfig::new(
        "authority".to_string(),
        "client".to_string(),
        "redirect".to_string(),
    )
}

pub(crate) fn test_user() -> User {
    User::new("__test_access_token__", UserProfile::new("__test_user__"))
}

/// In-memory `UserManager` recording every call.
///
/// Operations resolve immediately unless gated with [`MockUserManager::gate`],
/// and fail only when configured with [`MockUserManager::failing`].
pub(crate) struct MockUserManager {
    calls: RefCell<Vec<&'static str>>,
    stored_user: RefCell<Option<User>>,
    callback_user: Option<User>,
    popup_user: Option<User>,
    failures: HashMap<&'static str, AuthError>,
    gates: RefCell<HashMap<&'static str, oneshot::Receiver<()>>>,
    events: RefCell<Option<broadcast::Sender<UserManagerEvent>>>,
}

impl Default for MockUserManager {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            calls: RefCell::new(Vec::new()),
            stored_user: RefCell::new(None),
            callback_user: None,
            popup_user: None,
            failures: HashMap::new(),
            gates: RefCell::new(HashMap::new()),
            events: RefCell::new(Some(events)),
        }
    }
}

impl MockUserManager {
    pub(crate) fn with_stored_user(self, user: User) -> Self {
        *self.stored_user.borrow_mut() = Some(user);
        self
    }

    pub(crate) fn with_callback_user(mut self, user: User) -> Self {
        self.callback_user = Some(user);
        self
    }

    pub(crate) fn with_popup_user(mut self, user: User) -> Self {
        self.popup_user = Some(user);
        self
    }

    pub(crate) fn failing(mut self, operation: &'static str, error: AuthError) -> Self {
        self.failures.insert(operation, error);
        self
    }

    /// Holds the next call to `operation` until the returned sender fires or drops.
    pub(crate) fn gate(&self, operation: &'static str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gates.borrow_mut().insert(operation, gate);
        release
    }

    pub(crate) fn calls(&self, operation: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub(crate) fn emit(&self, event: UserManagerEvent) {
        if let Some(events) = self.events.borrow().as_ref() {
            let _ = events.send(event);
        }
    }

    /// Drops the event sender so listeners see the channel close.
    pub(crate) fn close_events(&self) {
        self.events.borrow_mut().take();
    }

    async fn enter(&self, operation: &'static str) -> Result<(), AuthError> {
        self.calls.borrow_mut().push(operation);

        let gate = self.gates.borrow_mut().remove(operation);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match self.failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl UserManager for MockUserManager {
    async fn signin_redirect(&self, _args: SigninArgs) -> Result<(), AuthError> {
        self.enter("signinRedirect").await
    }

    async fn signin_popup(&self, _args: SigninArgs) -> Result<User, AuthError> {
        self.enter("signinPopup").await?;
        Ok(self.popup_user.clone().unwrap_or_else(test_user))
    }

    async fn signin_silent(&self, _args: SigninArgs) -> Result<Option<User>, AuthError> {
        self.enter("signinSilent").await?;
        Ok(Some(test_user()))
    }

    async fn signin_callback(&self, _url: &str) -> Result<Option<User>, AuthError> {
        self.enter("signinCallback").await?;
        Ok(self.callback_user.clone())
    }

    async fn signout_redirect(&self, _args: SignoutArgs) -> Result<(), AuthError> {
        self.enter("signoutRedirect").await
    }

    async fn signout_popup(&self, _args: SignoutArgs) -> Result<(), AuthError> {
        self.enter("signoutPopup").await
    }

    async fn remove_user(&self) -> Result<(), AuthError> {
        self.enter("removeUser").await?;
        self.stored_user.borrow_mut().take();
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<User>, AuthError> {
        self.enter("getUser").await?;
        Ok(self.stored_user.borrow().clone())
    }

    fn events(&self) -> broadcast::Receiver<UserManagerEvent> {
        match self.events.borrow().as_ref() {
            Some(events) => events.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    async fn clear_stale_state(&self) -> Result<(), AuthError> {
        self.enter("clearStaleState").await
    }

    fn start_silent_renew(&self) {
        self.calls.borrow_mut().push("startSilentRenew");
    }

    fn stop_silent_renew(&self) {
        self.calls.borrow_mut().push("stopSilentRenew");
    }

    async fn revoke_tokens(&self) -> Result<(), AuthError> {
        self.enter("revokeTokens").await
    }
}

/// Root props for mounting a provider in a `VirtualDom`.
///
/// The rendered tree captures the context `use_auth()` returns in a descendant.
#[derive(Clone, Default)]
pub(crate) struct ProviderFixture {
    pub(crate) manager: Rc<MockUserManager>,
    captured: Rc<RefCell<Option<AuthContext>>>,
    guarded: bool,
}

impl ProviderFixture {
    pub(crate) fn with_manager(manager: MockUserManager) -> Self {
        Self {
            manager: Rc::new(manager),
            ..Self::default()
        }
    }

    /// Also mounts an `AuthenticationRequired` guard.
    pub(crate) fn guarded(mut self) -> Self {
        self.guarded = true;
        self
    }

    /// The context seen by the descendant, available after the first render.
    pub(crate) fn context(&self) -> AuthContext {
        self.captured
            .borrow()
            .clone()
            .expect("descendant has not rendered")
    }

    pub(crate) fn render(fixture: ProviderFixture) -> Element {
        let manager: Rc<dyn UserManager> = fixture.manager.clone();
        use_auth_provider(move || AuthProviderSettings::new(test_config()).with_user_manager(manager));
        use_context_provider(|| fixture.captured.clone());

        if fixture.guarded {
            rsx! {
                CaptureAuth {}
                AuthenticationRequired { p { "protected" } }
            }
        } else {
            rsx! { CaptureAuth {} }
        }
    }
}

#[component]
fn CaptureAuth() -> Element {
    let captured = use_context::<Rc<RefCell<Option<AuthContext>>>>();
    *captured.borrow_mut() = Some(use_auth());
    rsx! {}
}

/// Polls the dom's tasks and re-renders until `done` holds.
pub(crate) async fn drive_until(dom: &mut VirtualDom, mut done: impl FnMut(&VirtualDom) -> bool) {
    let settle = async {
        while !done(&*dom) {
            let _ = tokio::time::timeout(Duration::from_millis(10), dom.wait_for_work()).await;
            dom.render_immediate(&mut NoOpMutations);
        }
    };
    tokio::time::timeout(Duration::from_secs(5), settle)
        .await
        .expect("virtual dom did not settle");
}
