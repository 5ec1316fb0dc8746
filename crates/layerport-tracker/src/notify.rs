//! User-facing notices emitted by the tracker.

use std::sync::Arc;

/// A message for the user, the equivalent of a toast or banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Error(String),
    /// The plan allowance is exhausted; point the user at pricing.
    UpgradeRequired {
        message: String,
        pricing_url: Option<String>,
    },
    ConnectionError(String),
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}

/// Writes notices to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(message) => tracing::info!(%message, "notice"),
            Notice::Success(message) => tracing::info!(%message, "success"),
            Notice::Error(message) => tracing::error!(%message, "error"),
            Notice::UpgradeRequired {
                message,
                pricing_url,
            } => tracing::warn!(%message, pricing_url = ?pricing_url, "upgrade required"),
            Notice::ConnectionError(message) => tracing::warn!(%message, "connection error"),
        }
    }
}
