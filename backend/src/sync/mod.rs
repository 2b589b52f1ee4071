//! Remote synchronization of the persisted document.
//!
//! The local store is always authoritative: a failed push is reported but
//! never undoes or blocks the mutation that triggered it.

use crate::models::Store;

/// A push to the remote copy failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncError(pub String);

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SyncError {}

/// Destination receiving the whole document after each mutation.
pub trait RemoteSync: Send + Sync {
    fn push(&mut self, store: &Store) -> Result<(), SyncError>;
}

/// No remote copy; every push succeeds without doing anything.
#[derive(Debug, Default)]
pub struct Disabled;

impl RemoteSync for Disabled {
    fn push(&mut self, _store: &Store) -> Result<(), SyncError> {
        Ok(())
    }
}

/// A remote that can never be reached, as when the client runs offline.
#[derive(Debug, Default)]
pub struct Unreachable;

impl RemoteSync for Unreachable {
    fn push(&mut self, _store: &Store) -> Result<(), SyncError> {
        Err(SyncError("Failed to fetch".to_string()))
    }
}

/// Sync behaviour selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    #[default]
    Off,
    Unreachable,
}

impl SyncMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "" => Some(SyncMode::Off),
            "unreachable" | "offline" => Some(SyncMode::Unreachable),
            _ => None,
        }
    }

    pub fn build(self) -> Box<dyn RemoteSync> {
        match self {
            SyncMode::Off => Box::new(Disabled),
            SyncMode::Unreachable => Box::new(Unreachable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!(SyncMode::parse("off"), Some(SyncMode::Off));
        assert_eq!(SyncMode::parse("Unreachable"), Some(SyncMode::Unreachable));
        assert_eq!(SyncMode::parse("github"), None);
    }

    #[test]
    fn test_built_remotes() {
        let store = Store::default();
        assert!(SyncMode::Off.build().push(&store).is_ok());
        assert_eq!(
            SyncMode::Unreachable.build().push(&store).unwrap_err(),
            SyncError("Failed to fetch".to_string())
        );
    }
}
