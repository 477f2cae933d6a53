//! Hook for telling the user that another instance is running.
//! Rendering the actual text is the host's job; the notifier only gets the
//! selected message variant and whatever the peer snapshot knows.

use crate::config::MessageConfig;
use crate::process::PeerProcessInfo;

pub trait BusyNotifier {
    fn notify_busy(&self, message: &MessageConfig, peer: Option<&PeerProcessInfo>);
}

impl<F> BusyNotifier for F
where
    F: Fn(&MessageConfig, Option<&PeerProcessInfo>),
{
    fn notify_busy(&self, message: &MessageConfig, peer: Option<&PeerProcessInfo>) {
        self(message, peer)
    }
}

/// Records the notification in the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl BusyNotifier for LogNotifier {
    fn notify_busy(&self, message: &MessageConfig, peer: Option<&PeerProcessInfo>) {
        match peer {
            Some(peer) => tracing::warn!(
                "Application is already running (pid {}, owner {}\\{}), message {:?}",
                peer.process_id,
                peer.owner_domain.as_deref().unwrap_or("?"),
                peer.owner_user.as_deref().unwrap_or("?"),
                message
            ),
            None => tracing::warn!(
                "Application is already running in another account, message {:?}",
                message
            ),
        }
    }
}
