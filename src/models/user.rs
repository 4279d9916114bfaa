//! User profile model for local storage and API.

use serde::{Deserialize, Serialize};

/// Signed-in user, as decoded from the OAuth identity token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Subject id assigned by the identity provider
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Avatar URL (may not be shared)
    pub picture: Option<String>,
}
