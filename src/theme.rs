//! Theme

use std::{fmt, str::FromStr};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    storage::Storage,
    subscribers::{SubscriptionKey, Subscribers},
};

/// Storage key the theme is persisted under.
pub const THEME_KEY: &str = "theme";

/// Error parsing a theme name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown theme {0:?}, expected \"dark\" or \"light\"")]
pub struct UnknownTheme(String);

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Light mode
    Light,

    /// Dark mode
    Dark,
}

impl Theme {
    /// The persisted name of the theme.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Theme for a system dark-mode preference.
    #[must_use]
    pub fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark { Theme::Dark } else { Theme::Light }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

/// Persisted light/dark preference.
#[derive(Debug)]
pub struct ThemeStore<S: Storage> {
    storage: S,
    theme: Theme,
    subscribers: Subscribers<Theme>,
}

impl<S: Storage> ThemeStore<S> {
    /// Restore the saved theme, falling back to the system preference.
    ///
    /// The resolved theme is written back so the slot always holds a valid value.
    pub fn new(storage: S, prefers_dark: bool) -> Self {
        let theme = load_theme(&storage).unwrap_or_else(|| Theme::from_system(prefers_dark));

        let mut store = Self {
            storage,
            theme,
            subscribers: Subscribers::new(),
        };

        store.persist();

        store
    }

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether dark mode is active.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    /// Switch between light and dark.
    pub fn toggle(&mut self) -> Theme {
        let next = self.theme.toggled();

        self.apply(next);

        next
    }

    /// Switch to `theme`. Does nothing if it is already active.
    pub fn set(&mut self, theme: Theme) {
        if theme != self.theme {
            self.apply(theme);
        }
    }

    /// Register a listener called after each theme change.
    pub fn subscribe(&mut self, listener: impl FnMut(&Theme) + 'static) -> SubscriptionKey {
        self.subscribers.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if the key was unknown.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.unsubscribe(key)
    }

    /// Backing storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn apply(&mut self, theme: Theme) {
        self.theme = theme;

        info!(theme = %theme, "theme changed");

        self.persist();
        self.subscribers.notify(&self.theme);
    }

    fn persist(&mut self) {
        if let Err(err) = self.storage.write(THEME_KEY, self.theme.as_str()) {
            error!(error = %err, "failed to persist theme");
        }
    }
}

fn load_theme(storage: &impl Storage) -> Option<Theme> {
    match storage.read(THEME_KEY) {
        Ok(Some(raw)) => raw
            .parse::<Theme>()
            .inspect_err(|err| warn!(error = %err, "ignoring saved theme"))
            .ok(),
        Ok(None) => None,
        Err(err) => {
            warn!(error = %err, "failed to read saved theme");
            None
        }
    }
}
