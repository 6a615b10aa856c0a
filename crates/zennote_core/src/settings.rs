//! Theme preference persistence.
//!
//! The preference is stored as a bare string (`"light"` or `"dark"`), not
//! JSON, under `StoreConfig::theme_key`.

use crate::config::StoreConfig;
use crate::kv::{KeyValueStore, KvResult};
use log::{info, warn};
use std::fmt::{Display, Formatter};

/// Light/dark UI theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parses a stored value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl Display for ThemePreference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the theme preference, falling back to light.
pub fn load_theme<S: KeyValueStore>(backend: &S, config: &StoreConfig) -> ThemePreference {
    match backend.get(&config.theme_key) {
        Ok(Some(raw)) => ThemePreference::parse(&raw).unwrap_or_else(|| {
            warn!("event=theme_load module=settings status=degraded reason=unknown_value");
            ThemePreference::default()
        }),
        Ok(None) => ThemePreference::default(),
        Err(err) => {
            warn!("event=theme_load module=settings status=degraded reason=read_failed error={err}");
            ThemePreference::default()
        }
    }
}

/// Writes the theme preference.
pub fn save_theme<S: KeyValueStore>(
    backend: &mut S,
    config: &StoreConfig,
    theme: ThemePreference,
) -> KvResult<()> {
    backend.set(&config.theme_key, theme.as_str())?;
    info!("event=theme_save module=settings status=ok theme={theme}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_theme, save_theme, ThemePreference};
    use crate::config::StoreConfig;
    use crate::kv::{KeyValueStore, MemoryKvStore};

    #[test]
    fn missing_or_unknown_theme_defaults_to_light() {
        let config = StoreConfig::default();
        let mut backend = MemoryKvStore::new();
        assert_eq!(load_theme(&backend, &config), ThemePreference::Light);

        backend.set("theme", "sepia").unwrap();
        assert_eq!(load_theme(&backend, &config), ThemePreference::Light);
    }

    #[test]
    fn theme_is_stored_as_bare_string() {
        let config = StoreConfig::default();
        let mut backend = MemoryKvStore::new();
        save_theme(&mut backend, &config, ThemePreference::Dark).unwrap();

        assert_eq!(backend.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(load_theme(&backend, &config), ThemePreference::Dark);
    }

    #[test]
    fn toggled_flips_between_variants() {
        assert_eq!(ThemePreference::Light.toggled(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
    }
}
