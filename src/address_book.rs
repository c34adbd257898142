use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ADDRESS_BOOK_FILE: &str = "admin_addresses.json";

/// Maximum number of remembered addresses.
pub const MAX_REMEMBERED: usize = 10;

/// Recently used admin recipients, most recent first, plus an optional
/// device-local default. Purely an autocomplete/default source; never used
/// to validate what the user types. Loaded once at startup and saved with
/// append-and-cap semantics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressBook {
    #[serde(default)]
    pub entries: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
}

impl AddressBook {
    /// Load from `path`, falling back to an empty book when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Self::default();
        }
        match serde_json::from_str(&content) {
            Ok(book) => book,
            Err(err) => {
                tracing::error!("failed to parse address book {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create address book folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("write address book {}", path.display()))
    }

    /// Move `email` to the front (deduplicated), drop anything past the
    /// cap, and optionally mark it as the device default. Blank input is
    /// ignored.
    pub fn remember(&mut self, email: &str, set_default: bool) {
        let email = email.trim();
        if email.is_empty() {
            return;
        }
        self.entries.retain(|e| e != email);
        self.entries.insert(0, email.to_string());
        self.entries.truncate(MAX_REMEMBERED);
        if set_default {
            self.default = Some(email.to_string());
        }
    }

    pub fn default_address(&self) -> Option<&str> {
        self.default.as_deref()
    }
}
