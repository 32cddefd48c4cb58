//! Deny-list of logged-out credentials.

use dashmap::DashMap;
use folio_common_core::Timestamp;

/// Credential IDs rejected until their natural expiry.
#[derive(Debug, Default)]
pub struct RevocationList {
    entries: DashMap<String, i64>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `jti` until `expires_at` (unix seconds). Lapsed entries are
    /// dropped on the way.
    pub fn revoke(&self, jti: &str, expires_at: i64) {
        let now = Timestamp::now().unix();
        self.entries.retain(|_, exp| *exp > now);
        if expires_at > now {
            self.entries.insert(jti.to_string(), expires_at);
        }
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.entries.contains_key(jti)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_and_purge() {
        let list = RevocationList::new();
        let now = Timestamp::now().unix();

        list.revoke("live", now + 3600);
        assert!(list.is_revoked("live"));

        list.revoke("lapsed", now - 1);
        assert!(!list.is_revoked("lapsed"));
        assert_eq!(list.len(), 1);
    }
}
