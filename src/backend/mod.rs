pub mod handlers;
pub mod middleware;
pub mod router;

use std::sync::Arc;

use crate::access::AccessGate;
use crate::db::repository::Repository;
use crate::identity::IdentityProvider;
use crate::invites::InviteGate;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub gate: AccessGate<Repository>,
    pub invites: InviteGate<Repository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub site_url: String,
    pub api_key: String,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        identity: Arc<dyn IdentityProvider>,
        site_url: String,
        api_key: String,
    ) -> Self {
        Self {
            gate: AccessGate::new(Arc::clone(&repo)),
            invites: InviteGate::new(Arc::clone(&repo)),
            repo,
            identity,
            site_url,
            api_key,
        }
    }
}
