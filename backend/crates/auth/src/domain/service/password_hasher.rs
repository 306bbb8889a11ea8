//! Password Hasher
//!
//! Async front for Argon2id hashing. The hashing itself is CPU-bound and
//! memory-hard, so every call runs on tokio's blocking pool.

use std::sync::{Arc, OnceLock};

use zeroize::Zeroizing;

use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct PasswordHasher {
    pepper: Option<Arc<Zeroizing<Vec<u8>>>>,
    /// Hash of an unguessable password, verified against when the user is unknown
    dummy: Arc<OnceLock<UserPassword>>,
}

impl PasswordHasher {
    /// Create a hasher with an optional application-wide pepper
    pub fn new(pepper: Option<Vec<u8>>) -> Self {
        Self {
            pepper: pepper.map(|p| Arc::new(Zeroizing::new(p))),
            dummy: Arc::new(OnceLock::new()),
        }
    }

    /// Hash with a fresh random salt
    pub async fn hash(&self, raw: RawPassword) -> AuthResult<UserPassword> {
        let pepper = self.pepper.clone();
        run_blocking(move || UserPassword::from_raw(&raw, pepper.as_ref().map(|p| p.as_slice())))
            .await?
    }

    /// Verify `raw` against `hash`; a mismatch is `Ok(false)`, never an error
    pub async fn verify(&self, raw: RawPassword, hash: UserPassword) -> AuthResult<bool> {
        let pepper = self.pepper.clone();
        run_blocking(move || hash.verify(&raw, pepper.as_ref().map(|p| p.as_slice()))).await
    }

    /// Build the dummy hash ahead of the first unknown-user login.
    ///
    /// Without this the first such login pays for a hash and a verify.
    pub async fn warm_up(&self) -> AuthResult<()> {
        let pepper = self.pepper.clone();
        let dummy = self.dummy.clone();
        run_blocking(move || -> AuthResult<()> {
            dummy_hash(&dummy, pepper.as_ref().map(|p| p.as_slice()))?;
            Ok(())
        })
        .await?
    }

    /// Spend the same work as [`Self::verify`] without a real hash.
    ///
    /// Keeps the "unknown user" path as slow as the "wrong password" path.
    pub async fn verify_dummy(&self, raw: RawPassword) -> AuthResult<()> {
        let pepper = self.pepper.clone();
        let dummy = self.dummy.clone();
        run_blocking(move || -> AuthResult<()> {
            let pepper = pepper.as_ref().map(|p| p.as_slice());
            let hash = dummy_hash(&dummy, pepper)?;
            let _ = hash.verify(&raw, pepper);
            Ok(())
        })
        .await?
    }
}

/// Cached hash of a random password; created on first use
fn dummy_hash(dummy: &OnceLock<UserPassword>, pepper: Option<&[u8]>) -> AuthResult<UserPassword> {
    if let Some(hash) = dummy.get() {
        return Ok(hash.clone());
    }
    let hash = UserPassword::from_raw(&RawPassword::random(), pepper)?;
    // A concurrent initializer may win; either hash is equally unguessable
    Ok(dummy.get_or_init(|| hash).clone())
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

async fn run_blocking<F, T>(f: F) -> AuthResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Internal(format!("Password worker failed: {e}")))
}
