//! Provider settings: the OIDC configuration plus application hooks and the
//! client implementation slot.

use std::fmt;
use std::rc::Rc;

use crate::{OidcConfig, User, UserManager};

/// Builds a [`UserManager`] from the provider's configuration.
pub type UserManagerFactory = Rc<dyn Fn(&OidcConfig) -> Rc<dyn UserManager>>;

/// Called once the sign-in callback has been processed, with the signed-in
/// user or `None` when the callback failed.
pub type SigninCallbackHook = Rc<dyn Fn(Option<&User>)>;

/// Called after a successful sign-out or user removal.
pub type AuthHook = Rc<dyn Fn()>;

/// Everything the authentication provider needs when it is created.
///
/// Settings are read once; changing them after the provider mounted has no
/// effect.
#[derive(Clone)]
pub struct AuthProviderSettings {
    /// OIDC client configuration
    pub config: OidcConfig,
    /// Factory building the client from `config`
    pub implementation: Option<UserManagerFactory>,
    /// Prebuilt client; takes precedence over `implementation`
    pub user_manager: Option<Rc<dyn UserManager>>,
    /// Runs after the sign-in callback was processed
    pub on_signin_callback: Option<SigninCallbackHook>,
    /// Runs after `remove_user` succeeded
    pub on_remove_user: Option<AuthHook>,
    /// Runs after `signout_redirect` succeeded
    pub on_signout_redirect: Option<AuthHook>,
    /// Runs after `signout_popup` succeeded
    pub on_signout_popup: Option<AuthHook>,
    /// Skip processing authorization parameters found in the URL on mount
    pub skip_signin_callback: bool,
}

impl AuthProviderSettings {
    /// Creates settings with no client implementation and no hooks.
    pub fn new(config: OidcConfig) -> Self {
        Self {
            config,
            implementation: None,
            user_manager: None,
            on_signin_callback: None,
            on_remove_user: None,
            on_signout_redirect: None,
            on_signout_popup: None,
            skip_signin_callback: false,
        }
    }

    /// Uses a factory to build the client from the configuration.
    pub fn with_implementation<F>(mut self, factory: F) -> Self
    where
        F: Fn(&OidcConfig) -> Rc<dyn UserManager> + 'static,
    {
        self.implementation = Some(Rc::new(factory));
        self
    }

    /// Uses an already constructed client.
    pub fn with_user_manager(mut self, user_manager: Rc<dyn UserManager>) -> Self {
        self.user_manager = Some(user_manager);
        self
    }

    pub fn on_signin_callback(mut self, hook: impl Fn(Option<&User>) + 'static) -> Self {
        self.on_signin_callback = Some(Rc::new(hook));
        self
    }

    pub fn on_remove_user(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_remove_user = Some(Rc::new(hook));
        self
    }

    pub fn on_signout_redirect(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_signout_redirect = Some(Rc::new(hook));
        self
    }

    pub fn on_signout_popup(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_signout_popup = Some(Rc::new(hook));
        self
    }

    pub fn skip_signin_callback(mut self, skip: bool) -> Self {
        self.skip_signin_callback = skip;
        self
    }

    /// Resolves the client: the prebuilt instance if set, otherwise the factory's output.
    pub(crate) fn build_user_manager(&self) -> Option<Rc<dyn UserManager>> {
        self.user_manager.clone().or_else(|| {
            self.implementation
                .as_ref()
                .map(|factory| factory(&self.config))
        })
    }
}

impl fmt::Debug for AuthProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthProviderSettings")
            .field("config", &self.config)
            .field("implementation", &self.implementation.is_some())
            .field("user_manager", &self.user_manager.is_some())
            .field("on_signin_callback", &self.on_signin_callback.is_some())
            .field("on_remove_user", &self.on_remove_user.is_some())
            .field("on_signout_redirect", &self.on_signout_redirect.is_some())
            .field("on_signout_popup", &self.on_signout_popup.is_some())
            .field("skip_signin_callback", &self.skip_signin_callback)
            .finish()
    }
}

/// Settings compare by configuration and by identity of the shared closures,
/// which is what component props need to decide whether to re-render.
impl PartialEq for AuthProviderSettings {
    fn eq(&self, other: &Self) -> bool {
        fn same<T: ?Sized>(a: &Option<Rc<T>>, b: &Option<Rc<T>>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
        }

        self.config == other.config
            && self.skip_signin_callback == other.skip_signin_callback
            && same(&self.implementation, &other.implementation)
            && same(&self.user_manager, &other.user_manager)
            && same(&self.on_signin_callback, &other.on_signin_callback)
            && same(&self.on_remove_user, &other.on_remove_user)
            && same(&self.on_signout_redirect, &other.on_signout_redirect)
            && same(&self.on_signout_popup, &other.on_signout_popup)
    }
}
