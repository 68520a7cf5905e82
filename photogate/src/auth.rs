//! Static login credentials loaded once at startup.
//!
//! ## Credentials file format
//!
//! **JSON** (default, any extension other than `.toml`):
//! ```json
//! { "users": [ { "username": "alice", "password": "pw1" } ] }
//! ```
//!
//! **TOML** (`.toml` extension):
//! ```toml
//! [[users]]
//! username = "alice"
//! password = "pw1"
//! ```
//!
//! Entries are kept exactly as written and in file order. Passwords are stored and
//! compared in plain text; use `chmod 600` on the file. The server warns if it is
//! world-readable (Unix).

use std::path::Path;

use serde::Deserialize;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    users: Vec<Credential>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_users(users: Vec<Credential>) -> Self {
        Self { users }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// True when any entry equals both `username` and `password` exactly.
    pub fn is_valid(&self, username: &str, password: &str) -> bool {
        self.users.iter().any(|user| {
            let name_matches: bool = user.username.as_bytes().ct_eq(username.as_bytes()).into();
            let password_matches: bool =
                user.password.as_bytes().ct_eq(password.as_bytes()).into();
            name_matches && password_matches
        })
    }
}

#[derive(Debug, Error)]
pub enum CredentialsFileError {
    #[error("failed to read credentials file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON credentials in {path}: {source}")]
    ParseJson {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid TOML credentials in {path}: {source}")]
    ParseToml {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    users: Vec<Credential>,
}

/// Load the credential list from `path`. Warns if the file is world-readable (Unix only)
/// or defines no users.
pub fn load_credentials(path: &Path) -> Result<Credentials, CredentialsFileError> {
    check_file_permissions(path);

    let raw = std::fs::read_to_string(path).map_err(|source| CredentialsFileError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let parsed = parse_credentials(path, &raw)?;
    if parsed.users.is_empty() {
        warn!(
            path = %path.display(),
            "credentials file defines no users; every login will be rejected"
        );
    }

    Ok(Credentials::from_users(parsed.users))
}

fn parse_credentials(path: &Path, raw: &str) -> Result<CredentialsFile, CredentialsFileError> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(raw).map_err(|source| CredentialsFileError::ParseToml {
            path: path.display().to_string(),
            source,
        })
    } else {
        serde_json::from_str(raw).map_err(|source| CredentialsFileError::ParseJson {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(unix)]
fn check_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = std::fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o004 != 0 {
            warn!(
                path = %path.display(),
                "credentials file is world-readable; consider chmod 600"
            );
        }
    }
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &Path) {}
