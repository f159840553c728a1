// src/auth/token_store.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::{
    common::error::AppError,
    models::auth::{StoredToken, TokenClaims, UserIdentity},
};

/// Async capability consumed by the Dataverse client: every remote call asks
/// for a fresh token string.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<String, AppError>;
}

/// Key-value persistence behind the token store. The binary uses the file
/// implementation; tests use the in-memory one.
pub trait TokenStorage: Send + Sync {
    fn read(&self) -> Result<Option<StoredToken>, AppError>;
    fn write(&self, token: &StoredToken) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}

#[derive(Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<StoredToken>>,
}

impl TokenStorage for MemoryTokenStorage {
    fn read(&self) -> Result<Option<StoredToken>, AppError> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn write(&self, token: &StoredToken) -> Result<(), AppError> {
        *self.slot.lock().unwrap() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

/// JSON file next to the user's config, in the spirit of CLI token caches.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStorage for FileTokenStorage {
    fn read(&self) -> Result<Option<StoredToken>, AppError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, token: &StoredToken) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(token)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Holds the bearer token obtained by the external implicit-flow login:
/// raw token, expiry derived from its `exp` claim, and the decoded identity.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Decode the claims of a freshly acquired token and persist it.
    ///
    /// The signature is NOT verified here: the token is minted and signed by
    /// the identity provider and only ever presented back to Dataverse, which
    /// does the real verification. We only read exp/name/oid out of it.
    pub fn store_raw(&self, access_token: &str) -> Result<StoredToken, AppError> {
        let mut validation = Validation::new(Algorithm::RS256);
        // The IdP signs with RS256; HS256 is accepted so tests can mint
        // tokens without an RSA key pair.
        validation.algorithms = vec![Algorithm::RS256, Algorithm::HS256];
        validation.insecure_disable_signature_validation();
        validation.validate_aud = false;
        // Expiry is checked against the stored timestamp on every read
        // instead, so an already-expired token still decodes.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(access_token, &DecodingKey::from_secret(&[]), &validation)?;
        let claims = data.claims;

        let expires_at = Utc
            .timestamp_opt(claims.exp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);

        let stored = StoredToken {
            access_token: access_token.to_string(),
            expires_at,
            identity: UserIdentity {
                id: claims.oid,
                name: claims.name.unwrap_or_else(|| "Unknown".to_string()),
                username: claims.preferred_username,
            },
        };

        self.storage.write(&stored)?;
        tracing::info!(user = %stored.identity.name, "token stored");
        Ok(stored)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.storage.read(), Ok(Some(t)) if t.expires_at > Utc::now())
    }

    /// The raw bearer token, or why there is none.
    pub fn token(&self) -> Result<String, AppError> {
        let stored = self.storage.read()?.ok_or(AppError::TokenMissing)?;
        if stored.expires_at <= Utc::now() {
            return Err(AppError::TokenExpired);
        }
        Ok(stored.access_token)
    }

    pub fn identity(&self) -> Result<UserIdentity, AppError> {
        Ok(self.storage.read()?.ok_or(AppError::TokenMissing)?.identity)
    }

    /// Logout: drop the persisted token.
    pub fn clear(&self) -> Result<(), AppError> {
        self.storage.clear()
    }
}

#[async_trait]
impl TokenProvider for TokenStore {
    async fn get_token(&self) -> Result<String, AppError> {
        self.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn fake_token(exp: i64, name: &str) -> String {
        // HS256-signed only because encoding needs a key; the store never
        // checks the signature.
        let claims = TokenClaims {
            exp: exp as usize,
            iat: None,
            name: Some(name.to_string()),
            preferred_username: Some("user@company.vn".to_string()),
            oid: Some("b7f8d3e1-0000-0000-0000-000000000001".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-only"),
        )
        .unwrap()
    }

    fn store() -> TokenStore {
        TokenStore::new(Arc::new(MemoryTokenStorage::default()))
    }

    #[test]
    fn stores_and_reads_back_identity() {
        let store = store();
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        store.store_raw(&fake_token(exp, "Nguyễn Văn A")).unwrap();

        assert!(store.is_valid());
        assert_eq!(store.identity().unwrap().name, "Nguyễn Văn A");
        assert!(store.token().is_ok());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let store = store();
        let exp = (Utc::now() - chrono::Duration::hours(1)).timestamp();
        store.store_raw(&fake_token(exp, "Nguyễn Văn A")).unwrap();

        assert!(!store.is_valid());
        assert!(matches!(store.token(), Err(AppError::TokenExpired)));
    }

    #[test]
    fn missing_token_and_logout() {
        let store = store();
        assert!(matches!(store.token(), Err(AppError::TokenMissing)));

        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        store.store_raw(&fake_token(exp, "A")).unwrap();
        store.clear().unwrap();
        assert!(matches!(store.token(), Err(AppError::TokenMissing)));
    }

    #[test]
    fn garbage_token_is_a_decode_error() {
        let store = store();
        assert!(matches!(
            store.store_raw("not-a-jwt"),
            Err(AppError::InvalidToken(_))
        ));
    }
}
