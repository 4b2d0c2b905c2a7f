use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// File name of the persisted bearer token slot inside the config directory.
/// Absence of the file means unauthenticated.
const TOKEN_FILE: &str = "access_token";

/// Claims this client expects in every token issued by the catalog API.
///
/// All fields are required: a token missing any of them fails decoding and is
/// treated as invalid.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Standard JWT subject — set to the user's email.
    pub sub: String,
    pub role: String,
    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// An active authenticated session derived from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
    pub role: String,
    /// Raw token, retained for authenticated gateway calls.
    pub token: String,
    /// Expiry instant, Unix seconds.
    pub expires_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed or missing required claims: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
    #[error("token is expired")]
    Expired,
}

/// Decode the claims of a bearer token without verifying its signature.
///
/// The client never holds the server's signing secret; the server re-validates
/// the signature on every request. Expiry is checked here manually so the
/// boundary is inclusive: a token whose `exp` is the current instant is
/// already expired.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;

    if data.claims.exp * 1000 <= Utc::now().timestamp_millis() {
        return Err(TokenError::Expired);
    }

    Ok(data.claims)
}

/// Holds the current session and the persisted token slot.
///
/// Token-validity failures never surface to the caller as errors: they empty
/// the session, clear the slot and log a warning. Filesystem errors do
/// propagate.
#[derive(Debug)]
pub struct SessionStore {
    dir: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    /// Store backed by the default config directory.
    pub fn open() -> anyhow::Result<Self> {
        Ok(Self::new(config::get_config_dir()?))
    }

    /// Store backed by an explicit directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, current: None }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn persist_token(&self, token: &str) -> anyhow::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        fs::write(self.token_path(), token)?;
        Ok(())
    }

    fn clear_token(&self) -> anyhow::Result<()> {
        let path = self.token_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn read_token(&self) -> anyhow::Result<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let token = fs::read_to_string(path)?.trim().to_string();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// Rebuild the session from the persisted token, evicting it when it is
    /// missing, undecodable or expired.
    pub fn restore(&mut self) -> anyhow::Result<Option<&Session>> {
        self.current = None;

        let Some(token) = self.read_token()? else {
            return Ok(None);
        };

        match decode_claims(&token) {
            Ok(claims) => {
                self.current = Some(Session {
                    subject: claims.sub,
                    role: claims.role,
                    token,
                    expires_at: claims.exp,
                });
            }
            Err(e) => {
                tracing::warn!("discarding persisted token: {}", e);
                self.clear_token()?;
            }
        }

        Ok(self.current.as_ref())
    }

    /// Validate a freshly issued token; on success persist it and open a
    /// session, on failure leave the session empty and clear the slot.
    pub fn login(&mut self, token: &str) -> anyhow::Result<Option<&Session>> {
        self.current = None;

        match decode_claims(token) {
            Ok(claims) => {
                self.persist_token(token)?;
                self.current = Some(Session {
                    subject: claims.sub,
                    role: claims.role,
                    token: token.to_string(),
                    expires_at: claims.exp,
                });
            }
            Err(e) => {
                tracing::warn!("rejecting login token: {}", e);
                self.clear_token()?;
            }
        }

        Ok(self.current.as_ref())
    }

    /// Clear the persisted token and empty the session. Performs no other
    /// side effects; what to do next is the caller's business.
    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.clear_token()?;
        self.current = None;
        Ok(())
    }

    pub fn current_user(&self) -> Option<&Session> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir() -> PathBuf {
        let seq = DIR_SEQ.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "biblio-session-test-{}-{}",
            std::process::id(),
            seq
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn forge_token(sub: &str, role: &str, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp,
        };
        // The secret is irrelevant: the store decodes without verifying it.
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test")).unwrap()
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[test]
    fn restore_without_persisted_token_is_empty() {
        let mut store = SessionStore::new(scratch_dir());
        assert!(store.restore().unwrap().is_none());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn login_with_valid_token_persists_and_retains_raw_token() {
        let dir = scratch_dir();
        let token = forge_token("anna@example.com", "admin", future_exp());

        let mut store = SessionStore::new(dir.clone());
        let session = store.login(&token).unwrap().cloned().unwrap();
        assert_eq!(session.subject, "anna@example.com");
        assert_eq!(session.role, "admin");
        assert_eq!(session.token, token);

        // A fresh store sees the persisted slot.
        let mut reopened = SessionStore::new(dir);
        let restored = reopened.restore().unwrap().cloned().unwrap();
        assert_eq!(restored.token, token);
        assert_eq!(restored.subject, "anna@example.com");
    }

    #[test]
    fn login_with_expired_token_empties_session_and_clears_slot() {
        let dir = scratch_dir();
        let mut store = SessionStore::new(dir.clone());

        // Seed a slot first so we can observe it being cleared.
        store
            .login(&forge_token("anna@example.com", "admin", future_exp()))
            .unwrap();
        assert!(dir.join(TOKEN_FILE).exists());

        let stale = forge_token("anna@example.com", "admin", Utc::now().timestamp() - 10);
        assert!(store.login(&stale).unwrap().is_none());
        assert!(store.current_user().is_none());
        assert!(!dir.join(TOKEN_FILE).exists());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        // exp equal to the current second is already past in milliseconds.
        let now = Utc::now().timestamp();
        let err = decode_claims(&forge_token("a@b.c", "user", now)).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn token_missing_role_claim_fails_closed() {
        #[derive(Serialize)]
        struct Partial {
            sub: String,
            exp: i64,
        }
        let partial = Partial {
            sub: "a@b.c".to_string(),
            exp: future_exp(),
        };
        let token =
            encode(&Header::default(), &partial, &EncodingKey::from_secret(b"test")).unwrap();
        assert!(matches!(
            decode_claims(&token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn restore_evicts_garbage_token() {
        let dir = scratch_dir();
        fs::write(dir.join(TOKEN_FILE), "not-a-jwt").unwrap();

        let mut store = SessionStore::new(dir.clone());
        assert!(store.restore().unwrap().is_none());
        assert!(!dir.join(TOKEN_FILE).exists());
    }

    #[test]
    fn logout_clears_slot_and_session() {
        let dir = scratch_dir();
        let mut store = SessionStore::new(dir.clone());
        store
            .login(&forge_token("anna@example.com", "user", future_exp()))
            .unwrap();

        store.logout().unwrap();
        assert!(store.current_user().is_none());
        assert!(!dir.join(TOKEN_FILE).exists());
    }
}
