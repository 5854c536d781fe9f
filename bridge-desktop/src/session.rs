//! In-process session state

use bridge_traits::session::SessionContext;
use std::sync::RwLock;
use tracing::debug;

/// Languages the bundled content ships in.
pub const SUPPORTED_LANGUAGES: &[&str] = &["chs", "cht", "eng", "spa"];

/// Language used before anyone logs on.
pub const DEFAULT_LANGUAGE: &str = "chs";

#[derive(Debug, Clone)]
struct SessionState {
    logged_on: bool,
    language: String,
    offline_mode: bool,
}

/// Mutable session holder implementing [`SessionContext`]
///
/// While logged off, reads report the default language and online mode no
/// matter what was stored earlier.
#[derive(Debug)]
pub struct InMemorySessionContext {
    default_language: String,
    state: RwLock<SessionState>,
}

impl InMemorySessionContext {
    pub fn new() -> Self {
        Self::with_default_language(DEFAULT_LANGUAGE)
    }

    pub fn with_default_language(language: impl Into<String>) -> Self {
        let default_language = language.into();
        Self {
            state: RwLock::new(SessionState {
                logged_on: false,
                language: default_language.clone(),
                offline_mode: false,
            }),
            default_language,
        }
    }

    /// Mark the session as logged on with the given language.
    ///
    /// Unsupported language codes are replaced by the default.
    pub fn log_on(&self, language: &str) {
        let language = if SUPPORTED_LANGUAGES.contains(&language) {
            language.to_string()
        } else {
            self.default_language.clone()
        };
        debug!(language = %language, "Session logged on");

        let mut state = self.write();
        state.logged_on = true;
        state.language = language;
    }

    pub fn log_off(&self) {
        let mut state = self.write();
        state.logged_on = false;
        state.offline_mode = false;
    }

    /// Ignored while logged off.
    pub fn set_language(&self, language: &str) {
        if !SUPPORTED_LANGUAGES.contains(&language) {
            return;
        }
        let mut state = self.write();
        if state.logged_on {
            state.language = language.to_string();
        }
    }

    /// Ignored while logged off.
    pub fn set_offline_mode(&self, offline: bool) {
        let mut state = self.write();
        if state.logged_on {
            state.offline_mode = offline;
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemorySessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext for InMemorySessionContext {
    fn language(&self) -> String {
        let state = self.read();
        if state.logged_on {
            state.language.clone()
        } else {
            self.default_language.clone()
        }
    }

    fn is_offline_mode(&self) -> bool {
        let state = self.read();
        state.logged_on && state.offline_mode
    }
}
