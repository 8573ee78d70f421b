//! # Schedlink Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The signed OAuth state codec
//! - Port/adapter interfaces (traits)
//! - The connect (authorize + callback) service
//! - The token refresher
//!
//! ## Architecture Principles
//! - Only depends on `schedlink-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod connect;
pub mod ports;
pub mod refresh;
pub mod state;

pub use connect::{CallbackOutcome, ConnectService};
pub use ports::{CredentialStore, HostNotifier, OAuthProviderClient};
pub use refresh::TokenRefresher;
pub use state::{sign_state, verify_state, StatePayload};
