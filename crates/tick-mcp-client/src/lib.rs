//! HTTP access to the TickTick open API.
//!
//! [`TaskStore`] is the seam the application layer depends on; [`TickTickClient`]
//! implements it over `reqwest` with bearer tokens handed out by
//! [`CredentialProvider`].

/// OAuth tokens and the credential provider.
pub mod auth;
/// REST client.
pub mod client;
/// Client and authentication errors.
pub mod error;
/// Provider deployments and base URLs.
pub mod region;
/// The task store abstraction.
pub mod store;

pub use auth::{CredentialProvider, OAuthApp, OAuthTokens, load_tokens, parse_callback, save_tokens};
pub use client::{TickTickClient, http_client};
pub use error::{AuthError, ClientError};
pub use region::{Endpoints, Region};
pub use store::TaskStore;
