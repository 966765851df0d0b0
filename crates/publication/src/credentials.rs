//! Storage credential lookup.
//!
//! Credentials come from an [`EnvSource`] passed in by the caller, so
//! publications can be tested without touching the process environment.

use std::collections::HashMap;
use std::fmt;
use std::sync::Once;

use crate::error::{PublishError, Result};

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Read-only key/value configuration source.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment, after loading `.env` once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

static DOTENV: Once = Once::new();

fn load_dotenv() {
    DOTENV.call_once(|| {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
    });
}

impl ProcessEnv {
    pub fn new() -> Self {
        load_dotenv();
        Self
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        load_dotenv();
        std::env::var(key).ok()
    }
}

/// In-memory source for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Access/secret key pair; either half may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl Credentials {
    /// Both keys, or [`PublishError::MissingCredentials`] naming what is absent.
    pub fn require(&self) -> Result<(String, String)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Ok((key.clone(), secret.clone())),
            (key, secret) => {
                let mut missing = Vec::new();
                if key.is_none() {
                    missing.push(ACCESS_KEY_VAR);
                }
                if secret.is_none() {
                    missing.push(SECRET_KEY_VAR);
                }
                Err(PublishError::MissingCredentials { missing })
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

/// Look up the AWS key pair. Empty values count as absent.
pub fn resolve_credentials(env: &dyn EnvSource) -> Credentials {
    let lookup = |key: &str| env.var(key).filter(|v| !v.is_empty());
    Credentials {
        access_key_id: lookup(ACCESS_KEY_VAR),
        secret_access_key: lookup(SECRET_KEY_VAR),
    }
}
