//! OAuth provider client implementations

mod google;
mod zoom;

pub use google::GoogleOAuthClient;
pub use zoom::ZoomOAuthClient;
