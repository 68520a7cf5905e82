use std::sync::Arc;

use crate::auth::Credentials;
use crate::photos::PhotoSource;
use crate::store::KvStore;

/// Expiry applied to the keys the handlers write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ttls {
    pub session_seconds: u64,
    pub photo_cache_seconds: u64,
}

impl Default for Ttls {
    fn default() -> Self {
        Self {
            session_seconds: 3600,
            photo_cache_seconds: 30,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<Credentials>,
    pub store: Arc<dyn KvStore>,
    pub photos: Arc<dyn PhotoSource>,
    pub ttls: Ttls,
}
