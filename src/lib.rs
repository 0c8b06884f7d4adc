//! # dxoidc
//!
//! OpenID Connect authentication state for Dioxus applications.
//!
//! This crate wraps an OIDC client behind a Dioxus context. Components get the
//! current user, a loading flag, the navigation in flight and the last error,
//! plus the sign-in/sign-out operations, from a single shared controller.
//!
//! ## Overview
//!
//! The protocol work (authorization requests, token exchange, validation,
//! storage, renewal) stays in the wrapped client. It is plugged in through the
//! [`UserManager`] trait, either as a prebuilt instance or as a factory building
//! one from the [`OidcConfig`].
//!
//! - **Shared types** (`OidcConfig`, `User`, `UserProfile`, `AuthState`, `AuthError`)
//! - **Controller** (`AuthController`) - the framework independent state machine
//! - **Client module** - Dioxus hooks and components
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use dioxus::prelude::*;
//! use dxoidc::{AuthProviderSettings, OidcConfig, remove_auth_params_from_location};
//! use dxoidc::client::{use_auth, use_auth_provider};
//!
//! #[component]
//! fn App() -> Element {
//!     use_auth_provider(|| {
//!         AuthProviderSettings::new(OidcConfig::from_env_or_panic())
//!             .with_implementation(|config| Rc::new(MyUserManager::new(config)))
//!             .on_signin_callback(|_| remove_auth_params_from_location())
//!     });
//!     rsx! { Home {} }
//! }
//!
//! #[component]
//! fn Home() -> Element {
//!     let auth = use_auth();
//!     if auth.is_loading() {
//!         return rsx! { "Loading..." };
//!     }
//!     match auth.user() {
//!         Some(user) => rsx! { "Signed in as {user.profile.display_name()}" },
//!         None => rsx! { "Signed out" },
//!     }
//! }
//! ```
//!
//! ## State transitions
//!
//! | Event | `is_loading` | `active_navigator` | `user` |
//! |-------|--------------|--------------------|--------|
//! | Provider mounted | `true` | `None` | `None` |
//! | Initialization done | `false` | unchanged | stored/callback user |
//! | Navigation started | `true` | that navigator | unchanged |
//! | Navigation settled | `false` | `None` | popup/silent result, cleared on sign-out |
//! | Session event | unchanged | unchanged | mirrored |
//!
//! ## Configuration
//!
//! `OidcConfig::from_env()` reads `OIDC_AUTHORITY`, `OIDC_CLIENT_ID`,
//! `OIDC_REDIRECT_URI` and optionally `OIDC_SCOPE` and
//! `OIDC_POST_LOGOUT_REDIRECT_URI` at compile time. The build script loads them
//! from a `.env` file when present.

pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod settings;
pub mod state;
pub mod user;
pub mod user_manager;

pub mod client;

#[cfg(test)]
mod testing;

pub use config::OidcConfig;
pub use controller::AuthController;
pub use error::AuthError;
pub use location::{has_auth_params, remove_auth_params_from_location, strip_auth_params};
pub use settings::{AuthHook, AuthProviderSettings, SigninCallbackHook, UserManagerFactory};
pub use state::{AuthAction, AuthState, Navigator};
pub use user::{User, UserProfile};
pub use user_manager::{SigninArgs, SignoutArgs, UserManager, UserManagerEvent};
