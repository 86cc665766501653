//! Fire-and-forget signal telling dependent views which paths are stale.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

pub trait Revalidator: Send + Sync {
    fn revalidate(&self, path: &str);
}

/// Publishes invalidated paths on a broadcast channel. Having no subscriber is
/// not an error.
#[derive(Clone)]
pub struct BroadcastRevalidator {
    sender: broadcast::Sender<String>,
}

impl BroadcastRevalidator {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastRevalidator {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Revalidator for BroadcastRevalidator {
    fn revalidate(&self, path: &str) {
        let receivers = self.sender.send(path.to_string()).unwrap_or(0);
        debug!(receivers, "Revalidated {}", path);
    }
}

/// Log every invalidated path until the channel closes. A receiver that falls
/// behind skips the overwritten paths and keeps going. Returns how many paths
/// were logged.
pub async fn log_invalidations(mut receiver: broadcast::Receiver<String>) -> usize {
    let mut logged = 0;
    loop {
        match receiver.recv().await {
            Ok(path) => {
                debug!(path = %path, "View invalidated");
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Invalidation log fell behind"),
            Err(RecvError::Closed) => return logged,
        }
    }
}

/// View paths affected by workspace mutations
pub mod paths {
    use uuid::Uuid;

    pub const ADMIN_WORKSPACES: &str = "/admin/workspaces";
    pub const MEMBER_WORKSPACES: &str = "/w";

    pub fn admin_workspace(id: Uuid) -> String {
        format!("{}/{}", ADMIN_WORKSPACES, id)
    }

    pub fn workspace_home(slug: &str) -> String {
        format!("/w/{}", slug)
    }

    pub fn workspace_settings(slug: &str) -> String {
        format!("/w/{}/settings", slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_paths() {
        let revalidator = BroadcastRevalidator::new(4);
        let mut rx = revalidator.subscribe();

        revalidator.revalidate(paths::ADMIN_WORKSPACES);
        revalidator.revalidate(&paths::workspace_settings("acme"));

        assert_eq!(rx.recv().await.unwrap(), "/admin/workspaces");
        assert_eq!(rx.recv().await.unwrap(), "/w/acme/settings");
    }

    #[tokio::test]
    async fn logger_survives_lag_and_stops_on_close() {
        let revalidator = BroadcastRevalidator::new(2);
        let rx = revalidator.subscribe();

        for slug in ["a", "b", "c", "d", "e"] {
            revalidator.revalidate(&paths::workspace_home(slug));
        }
        drop(revalidator);

        // Three paths are overwritten; the two newest still arrive
        assert_eq!(log_invalidations(rx).await, 2);
    }

    #[test]
    fn no_subscribers_is_fine() {
        BroadcastRevalidator::default().revalidate("/w");
    }
}
