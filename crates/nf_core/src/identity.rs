use async_trait::async_trait;

use crate::types::UserId;

/// Resolves an opaque bearer token to the user it belongs to.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `None` means the caller is not authenticated.
    async fn resolve(&self, token: &str) -> Option<UserId>;
}
