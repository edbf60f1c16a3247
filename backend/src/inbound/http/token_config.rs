//! Token signing configuration parsing and validation.
//!
//! The signing key and cookie toggles come from the environment so they can
//! be mounted as secrets. Release builds are strict; debug builds fall back to
//! defaults with a warning.

use std::path::PathBuf;

use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

const TOKEN_KEY_DEFAULT_PATH: &str = "/var/run/secrets/token_key";
/// Minimum signing key length accepted in release builds.
pub const TOKEN_KEY_MIN_LEN: usize = 32;
const KEY_FILE_ENV: &str = "TOKEN_KEY_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
const COOKIE_SECURE_ENV: &str = "TOKEN_COOKIE_SECURE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for token configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Where the signing key comes from.
pub enum TokenKey {
    /// Key bytes read from the key file.
    Loaded(Zeroizing<Vec<u8>>),
    /// Generate a random key at startup; tokens die with the process.
    Ephemeral,
}

impl std::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded(bytes) => write!(f, "Loaded(<{} bytes>)", bytes.len()),
            Self::Ephemeral => f.write_str("Ephemeral"),
        }
    }
}

/// Token settings derived from the environment.
#[derive(Debug)]
pub struct TokenSettings {
    pub key: TokenKey,
    /// Whether the `authToken` cookie is marked `Secure`.
    pub cookie_secure: bool,
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read token key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("TOKEN_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use feedback_board::inbound::http::token_config::{
///     BuildMode, TokenKey, token_settings_from_env,
/// };
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "TOKEN_KEY_FILE" => Some("/nonexistent/token_key".to_owned()),
///     "TOKEN_ALLOW_EPHEMERAL" => Some("1".to_owned()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Debug).expect("debug settings");
/// assert!(matches!(settings.key, TokenKey::Ephemeral));
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let cookie_secure = bool_from_env(env, mode, COOKIE_SECURE_ENV, true)?;
    let allow_ephemeral = bool_from_env(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(TokenConfigError::EphemeralNotAllowed);
    }
    let key = token_key_from_env(env, mode, allow_ephemeral)?;
    Ok(TokenSettings { key, cookie_secure })
}

fn bool_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default_value: bool,
) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(name) else {
        return Ok(default_value);
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid {name}; defaulting to {default_value}");
            Ok(default_value)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn token_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<TokenKey, TokenConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| TOKEN_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let length = bytes.len();
            let min_len = if mode.is_debug() { 1 } else { TOKEN_KEY_MIN_LEN };
            if length < min_len {
                return Err(TokenConfigError::KeyTooShort {
                    path,
                    length,
                    min_len,
                });
            }
            Ok(TokenKey::Loaded(bytes))
        }
        Err(error) if allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary token key (dev only)"
            );
            Ok(TokenKey::Ephemeral)
        }
        Err(source) => Err(TokenConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
