//! User Notification Abstraction
//!
//! Lets the core surface an error to the person using the app (an alert
//! dialog on mobile, a toast or log line elsewhere).

use async_trait::async_trait;

/// Sink for user-facing error messages
///
/// Implementations should not block on user acknowledgement for longer than
/// the dialog takes to be shown; the core awaits this call.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::notify::UserNotifier;
///
/// async fn warn_offline(notifier: &dyn UserNotifier) {
///     notifier.alert("Error", "Please check your network connection").await;
/// }
/// ```
#[async_trait]
pub trait UserNotifier: Send + Sync {
    /// Show `message` under `title`
    async fn alert(&self, title: &str, message: &str);
}
