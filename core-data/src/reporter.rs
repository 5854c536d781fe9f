//! User-facing classification of web-service call results

use crate::network::{field_text, CallResult, ALERT_TITLE};
use bridge_traits::UserNotifier;
use std::sync::Arc;
use tracing::debug;

pub const CONNECTIVITY_MESSAGE: &str = "Please check your network connection";

/// Body fields copied into the message, in order.
const DETAIL_FIELDS: [&str; 3] = ["Message", "ExceptionMessage", "ExceptionType"];

/// Message for a call that did not end with `expected_status`, or `None`
/// when it did.
///
/// A missing result, or one that never got a response, reads as a
/// connectivity problem. Otherwise the message is `HTTP status <n>` followed
/// by each server detail field as its own paragraph.
pub fn describe_call_failure(result: Option<&CallResult>, expected_status: u16) -> Option<String> {
    let Some(status) = result.and_then(|result| result.status) else {
        return Some(CONNECTIVITY_MESSAGE.to_string());
    };

    if status == expected_status {
        return None;
    }

    let mut message = format!("HTTP status {}", status);

    if let Some(body) = result.and_then(|result| result.body.as_ref()) {
        for field in DETAIL_FIELDS {
            if let Some(detail) = body.get(field).filter(|detail| !detail.is_null()) {
                let detail = field_text(detail);
                if !detail.is_empty() {
                    message.push_str("\n\n");
                    message.push_str(&detail);
                }
            }
        }
    }

    Some(message)
}

/// Shows call failures to the user.
pub struct ErrorReporter {
    notifier: Arc<dyn UserNotifier>,
}

impl ErrorReporter {
    pub fn new(notifier: Arc<dyn UserNotifier>) -> Self {
        Self { notifier }
    }

    /// `true` when the call ended with `expected_status`; otherwise alerts
    /// the user and returns `false`.
    pub async fn show_web_service_call_errors(
        &self,
        result: Option<&CallResult>,
        expected_status: u16,
    ) -> bool {
        match describe_call_failure(result, expected_status) {
            None => true,
            Some(message) => {
                debug!(expected_status, "Reporting web service failure");
                self.notifier.alert(ALERT_TITLE, &message).await;
                false
            }
        }
    }
}
