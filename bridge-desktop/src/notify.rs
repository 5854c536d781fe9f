//! User notifications on desktop

use async_trait::async_trait;
use bridge_traits::notify::UserNotifier;
use tracing::warn;

/// Desktop hosts without a dialog surface get alerts as warning log lines.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl UserNotifier for TracingNotifier {
    async fn alert(&self, title: &str, message: &str) {
        warn!(target: "user_alert", title = title, "{}", message);
    }
}
