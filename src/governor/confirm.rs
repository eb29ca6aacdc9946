use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::database::models::OperationType;

/// Key for the token map: the exact (operation, target) pair a token was
/// issued for. A token for one tenant can never confirm a reset of another
/// tenant or of the whole system.
type ScopeKey = (OperationType, Option<Uuid>);

#[derive(Debug)]
struct StoredToken {
    /// SHA-256 of the issued code; plaintext is never kept server-side.
    code_hash: String,
    expires_at: DateTime<Utc>,
    consumed: bool,
}

/// What the operator receives when requesting confirmation. The code is
/// shown exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedConfirmation {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    /// Lower-security typed fallback, when enabled by configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_phrase: Option<String>,
}

/// Verification failure. `expected_phrase` is populated only when the
/// typed fallback is enabled, so the UI can show the operator exactly what
/// to type; nothing about a stale one-time code is ever revealed.
#[derive(Debug, Clone)]
pub struct ConfirmationFailure {
    pub message: String,
    pub expected_phrase: Option<String>,
}

/// One-time confirmation token store keyed by (operation, target), with
/// TTL expiry. All checks and the consume bit happen under a single lock
/// so two concurrent verifications can never both observe an unconsumed
/// token.
pub struct ConfirmationStore {
    entries: Mutex<HashMap<ScopeKey, StoredToken>>,
    ttl: Duration,
    allow_typed: bool,
}

/// Deterministic typed-confirmation phrase for a target scope.
pub fn expected_phrase(operation: OperationType, target_id: Option<Uuid>) -> String {
    match (operation, target_id) {
        (OperationType::TenantReset, Some(id)) => format!("RESET TENANT {}", id),
        (OperationType::TenantReset, None) => "RESET TENANT".to_string(),
        (OperationType::SystemReset, _) => "RESET ALL TENANT DATA".to_string(),
    }
}

fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl ConfirmationStore {
    pub fn new(ttl_secs: u64, allow_typed: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs as i64),
            allow_typed,
        }
    }

    /// Issues a fresh one-time code for the scope, replacing any prior
    /// token for the same scope.
    pub fn issue(&self, operation: OperationType, target_id: Option<Uuid>) -> IssuedConfirmation {
        let code = Uuid::new_v4().simple().to_string()[..12].to_uppercase();
        let expires_at = Utc::now() + self.ttl;

        let mut entries = self.entries.lock().expect("confirmation store lock poisoned");
        entries.retain(|_, t| t.expires_at > Utc::now());
        entries.insert(
            (operation, target_id),
            StoredToken { code_hash: hash_code(&code), expires_at, consumed: false },
        );

        IssuedConfirmation {
            code,
            expires_at,
            typed_phrase: self.allow_typed.then(|| expected_phrase(operation, target_id)),
        }
    }

    /// Verifies the supplied proof for the scope and, for a one-time code,
    /// consumes it atomically with the check.
    ///
    /// Two proof forms are accepted: a previously issued code (matched
    /// against its stored hash), or the deterministic typed phrase when
    /// the fallback is enabled. The typed phrase must match byte-for-byte.
    pub fn verify_and_consume(
        &self,
        operation: OperationType,
        target_id: Option<Uuid>,
        supplied: &str,
    ) -> Result<(), ConfirmationFailure> {
        let now = Utc::now();
        let supplied_hash = hash_code(supplied);

        let mut entries = self.entries.lock().expect("confirmation store lock poisoned");
        if let Some(token) = entries.get_mut(&(operation, target_id)) {
            if !token.consumed && token.expires_at > now && token.code_hash == supplied_hash {
                token.consumed = true;
                return Ok(());
            }
        }
        drop(entries);

        if self.allow_typed && supplied == expected_phrase(operation, target_id) {
            return Ok(());
        }

        Err(ConfirmationFailure {
            message: "confirmation code is invalid, expired, or already used".to_string(),
            expected_phrase: self.allow_typed.then(|| expected_phrase(operation, target_id)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_code_succeeds_exactly_once() {
        let store = ConfirmationStore::new(300, false);
        let tenant = Some(Uuid::new_v4());
        let issued = store.issue(OperationType::TenantReset, tenant);

        assert!(store.verify_and_consume(OperationType::TenantReset, tenant, &issued.code).is_ok());
        let second = store.verify_and_consume(OperationType::TenantReset, tenant, &issued.code);
        assert!(second.is_err());
        // no typed fallback -> expected phrase withheld
        assert!(second.unwrap_err().expected_phrase.is_none());
    }

    #[test]
    fn token_is_scoped_to_its_target() {
        let store = ConfirmationStore::new(300, false);
        let tenant_a = Some(Uuid::new_v4());
        let tenant_b = Some(Uuid::new_v4());
        let issued = store.issue(OperationType::TenantReset, tenant_a);

        assert!(store.verify_and_consume(OperationType::TenantReset, tenant_b, &issued.code).is_err());
        assert!(store.verify_and_consume(OperationType::SystemReset, None, &issued.code).is_err());
        // still usable for the scope it was issued for
        assert!(store.verify_and_consume(OperationType::TenantReset, tenant_a, &issued.code).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let store = ConfirmationStore::new(0, false);
        let tenant = Some(Uuid::new_v4());
        let issued = store.issue(OperationType::TenantReset, tenant);
        assert!(store.verify_and_consume(OperationType::TenantReset, tenant, &issued.code).is_err());
    }

    #[test]
    fn typed_phrase_must_match_exactly() {
        let store = ConfirmationStore::new(300, true);
        let id = Uuid::new_v4();
        let phrase = expected_phrase(OperationType::TenantReset, Some(id));

        assert!(store.verify_and_consume(OperationType::TenantReset, Some(id), &phrase).is_ok());
        // trailing space and case variants are rejected
        assert!(store.verify_and_consume(OperationType::TenantReset, Some(id), &format!("{} ", phrase)).is_err());
        assert!(store.verify_and_consume(OperationType::TenantReset, Some(id), &phrase.to_lowercase()).is_err());
    }

    #[test]
    fn failure_echoes_typed_phrase_when_enabled() {
        let store = ConfirmationStore::new(300, true);
        let id = Uuid::new_v4();
        let err = store
            .verify_and_consume(OperationType::TenantReset, Some(id), "nope")
            .unwrap_err();
        assert_eq!(err.expected_phrase, Some(format!("RESET TENANT {}", id)));
    }

    #[test]
    fn reissue_replaces_prior_token() {
        let store = ConfirmationStore::new(300, false);
        let tenant = Some(Uuid::new_v4());
        let first = store.issue(OperationType::TenantReset, tenant);
        let second = store.issue(OperationType::TenantReset, tenant);

        assert!(store.verify_and_consume(OperationType::TenantReset, tenant, &first.code).is_err());
        assert!(store.verify_and_consume(OperationType::TenantReset, tenant, &second.code).is_ok());
    }
}
