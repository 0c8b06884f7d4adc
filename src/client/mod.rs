//! Dioxus bindings for the authentication controller.
//!
//! This module provides:
//! - `use_auth_provider` / `AuthProvider` to create the controller for a subtree
//! - `use_auth` to reach the shared `AuthContext` from any descendant
//! - `AuthenticationRequired` to guard pages behind sign-in
//! - ID token decoding for building session records
//!
//! # Example
//!
//! ```rust,ignore
//! use dxoidc::client::{use_auth, AuthContext};
//!
//! #[component]
//! fn Profile() -> Element {
//!     let auth = use_auth();
//!     match auth.user() {
//!         Some(user) => rsx! { "Hello {user.profile.display_name()}" },
//!         None => rsx! {
//!             button {
//!                 onclick: move |_| {
//!                     let auth = auth.clone();
//!                     spawn(async move {
//!                         let _ = auth.signin_popup(Default::default()).await;
//!                     });
//!                 },
//!                 "Sign in"
//!             }
//!         },
//!     }
//! }
//! ```

pub mod authentication_required;
pub mod jwt;
pub mod use_auth;

pub use authentication_required::AuthenticationRequired;
pub use jwt::decode_id_token;
pub use use_auth::{AuthContext, AuthProvider, use_auth, use_auth_provider};
