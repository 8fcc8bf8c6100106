//! Persisted theme colors applied as CSS custom properties

use std::collections::HashMap;

use checklist_config::ThemeDefaults;
use tracing::debug;

use crate::error::StoreError;

/// String storage such as `localStorage`
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store for headless use
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKey {
    Background,
    Primary,
    Text,
}

impl ThemeKey {
    pub const ALL: [ThemeKey; 3] = [ThemeKey::Background, ThemeKey::Primary, ThemeKey::Text];

    /// Storage key, also the id of the color input
    pub fn storage_key(self) -> &'static str {
        match self {
            ThemeKey::Background => "bgColor",
            ThemeKey::Primary => "primaryColor",
            ThemeKey::Text => "textColor",
        }
    }

    pub fn css_property(self) -> &'static str {
        match self {
            ThemeKey::Background => "--bg-color",
            ThemeKey::Primary => "--primary-color",
            ThemeKey::Text => "--text-color",
        }
    }

    pub fn default_value(self, defaults: &ThemeDefaults) -> &str {
        match self {
            ThemeKey::Background => &defaults.bg_color,
            ThemeKey::Primary => &defaults.primary_color,
            ThemeKey::Text => &defaults.text_color,
        }
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.storage_key() == key)
    }
}

/// A custom property assignment for the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssVar {
    pub key: ThemeKey,
    pub value: String,
}

impl CssVar {
    pub fn property(&self) -> &'static str {
        self.key.css_property()
    }
}

/// Saved value for every key, falling back to the default when unset or empty
pub fn load_theme<S: KeyValueStore + ?Sized>(store: &S, defaults: &ThemeDefaults) -> Vec<CssVar> {
    ThemeKey::ALL
        .into_iter()
        .map(|key| {
            let value = store
                .get(key.storage_key())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| key.default_value(defaults).to_string());
            CssVar { key, value }
        })
        .collect()
}

/// Persist a changed color and return the property to apply
///
/// The property is returned even if saving fails so the page still updates.
pub fn change_theme<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: ThemeKey,
    value: &str,
) -> (CssVar, Result<(), StoreError>) {
    debug!("Theme {} -> {}", key.storage_key(), value);
    let saved = store.set(key.storage_key(), value);
    (
        CssVar {
            key,
            value: value.to_string(),
        },
        saved,
    )
}
