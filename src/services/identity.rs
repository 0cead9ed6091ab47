use cookie::Cookie;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::models::ANONYMOUS;

/// Key holding the display name in the identity store
pub const USERNAME_KEY: &str = "username";

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Identity store I/O error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Durable key/value store scoped to this client.
pub trait IdentityStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Stores pairs as a single percent-encoded cookie string in a file.
#[derive(Debug, Clone)]
pub struct CookieFileStore {
    path: PathBuf,
}

impl CookieFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_pairs(&self) -> Result<Vec<(String, String)>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut pairs = Vec::new();
        for cookie in Cookie::split_parse_encoded(content.trim().to_string()) {
            match cookie {
                Ok(c) => pairs.push((c.name().to_string(), c.value().to_string())),
                Err(e) => debug!("Skipping unreadable identity entry: {}", e),
            }
        }
        Ok(pairs)
    }
}

impl IdentityStore for CookieFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .read_pairs()?
            .into_iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut pairs = self.read_pairs()?;
        match pairs.iter_mut().find(|(name, _)| name == key) {
            Some(pair) => pair.1 = value.to_string(),
            None => pairs.push((key.to_string(), value.to_string())),
        }

        let line = pairs
            .iter()
            .map(|(name, value)| Cookie::new(name.as_str(), value.as_str()).encoded().to_string())
            .collect::<Vec<_>>()
            .join("; ");
        std::fs::write(&self.path, line)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl IdentityStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The local user's display name, as typed into the identity field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIdentity {
    value: String,
}

impl LocalIdentity {
    /// Read the stored name once at startup.
    pub fn load(store: &dyn IdentityStore) -> Self {
        let value = match store.get(USERNAME_KEY) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to read stored identity: {}", e);
                String::new()
            }
        };
        Self { value }
    }

    /// Field contents, possibly empty
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn display_name(&self) -> &str {
        if self.value.is_empty() {
            ANONYMOUS
        } else {
            &self.value
        }
    }

    /// Apply an edit of the identity field and persist it.
    pub fn edit(&mut self, value: impl Into<String>, store: &mut dyn IdentityStore) -> Result<(), StoreError> {
        self.value = value.into();
        store.set(USERNAME_KEY, &self.value)
    }
}
