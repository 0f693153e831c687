//! The reader's colour theme preference.
//!
//! The preference is persisted through a [`ThemeStorage`] (browser local
//! storage on a page, a map in tests) and interested parties can subscribe
//! to changes. Choosing [`Theme::System`] forgets the stored
//! preference so the system setting applies again.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The storage key holding the preference.
pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    System,
    Dark,
    Light,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Theme::System => "system",
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Theme::System),
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(UnknownTheme(other.to_owned())),
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}`")]
pub struct UnknownTheme(pub String);

/// Key/value persistence for the preference.
pub trait ThemeStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStorage(HashMap<String, String>);

impl ThemeStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }
}

/// Identifies a subscription for [`ThemeState::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(usize);

type Subscriber = Box<dyn FnMut(Theme)>;

pub struct ThemeState<S> {
    storage: S,
    prefers_dark: bool,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: usize,
}

impl<S: ThemeStorage> ThemeState<S> {
    /// `prefers_dark` is the system setting used when no preference is
    /// stored.
    pub fn new(storage: S, prefers_dark: bool) -> ThemeState<S> {
        ThemeState {
            storage,
            prefers_dark,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// The stored preference; anything unreadable counts as no preference.
    pub fn preference(&self) -> Theme {
        self.storage
            .get(THEME_KEY)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// The theme actually applied: never [`Theme::System`].
    pub fn resolved(&self) -> Theme {
        match self.preference() {
            Theme::System if self.prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            theme => theme,
        }
    }

    pub fn set(&mut self, theme: Theme) {
        match theme {
            Theme::System => self.storage.remove(THEME_KEY),
            theme => self.storage.set(THEME_KEY, &theme.to_string()),
        }
        let resolved = self.resolved();
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(resolved);
        }
    }

    /// Tracks changes of the system setting (e.g. the OS switching to dark
    /// mode at night).
    pub fn set_prefers_dark(&mut self, prefers_dark: bool) {
        self.prefers_dark = prefers_dark;
    }

    /// Registers `callback` to receive the resolved theme after every
    /// [`ThemeState::set`].
    pub fn subscribe(&mut self, callback: impl FnMut(Theme) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_defaults_to_system() {
        let state = ThemeState::new(MemoryStorage::default(), true);
        assert_eq!(Theme::System, state.preference());
        assert_eq!(Theme::Dark, state.resolved());
    }

    #[test]
    fn test_set_persists_and_system_clears() {
        let mut state = ThemeState::new(MemoryStorage::default(), false);
        state.set(Theme::Dark);
        assert_eq!(Some("dark".to_owned()), state.storage().get(THEME_KEY));
        assert_eq!(Theme::Dark, state.resolved());

        state.set(Theme::System);
        assert_eq!(None, state.storage().get(THEME_KEY));
        assert_eq!(Theme::Light, state.resolved());
    }

    #[test]
    fn test_unreadable_preference_is_system() {
        let mut storage = MemoryStorage::default();
        storage.set(THEME_KEY, "sepia");
        let state = ThemeState::new(storage, false);
        assert_eq!(Theme::System, state.preference());
        assert_eq!(Err(UnknownTheme("sepia".to_owned())), "sepia".parse::<Theme>());
    }

    #[test]
    fn test_subscribers_receive_resolved_theme() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut state = ThemeState::new(MemoryStorage::default(), true);

        let sink = Rc::clone(&seen);
        let id = state.subscribe(move |theme| sink.borrow_mut().push(theme));
        state.set(Theme::Light);
        state.set(Theme::System);
        state.unsubscribe(id);
        state.set(Theme::Dark);

        assert_eq!(vec![Theme::Light, Theme::Dark], *seen.borrow());
    }
}
