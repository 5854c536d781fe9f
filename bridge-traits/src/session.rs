//! Session Context Abstraction
//!
//! Read-only view of the signed-in user's session that the data layer needs
//! on every load.

/// Current-session read interface
///
/// The core never owns or mutates the session; it only asks for the two
/// values that influence where data is read from.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::session::SessionContext;
///
/// fn describe(session: &dyn SessionContext) -> String {
///     format!("lang={} offline={}", session.language(), session.is_offline_mode())
/// }
/// ```
pub trait SessionContext: Send + Sync {
    /// Language code of the current session (e.g. `chs`, `eng`)
    fn language(&self) -> String;

    /// Whether the user asked to prefer bundled offline data
    fn is_offline_mode(&self) -> bool;
}
