//! In-memory `UserRepository`, optionally seeded from a JSON file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    CredentialHash, DisplayName, EmailAddress, User, UserId, UserParts, UserValidationError,
};

/// Errors raised while loading a user seed file.
#[derive(Debug, thiserror::Error)]
pub enum UserSeedError {
    #[error("failed to read user seed {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse user seed {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid user seed entry {index}: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: UserValidationError,
    },
    #[error("duplicate user seed entry {index}: {source}")]
    Duplicate {
        index: usize,
        #[source]
        source: UserPersistenceError,
    },
}

/// One entry in a user seed file.
///
/// ```json
/// [{"id": "…", "displayName": "Ada", "email": "ada@example.com",
///   "credentialHash": "sha256$…$…", "isAdmin": true}]
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UserSeed {
    id: String,
    display_name: String,
    email: String,
    credential_hash: String,
    #[serde(default)]
    is_admin: bool,
}

impl TryFrom<UserSeed> for User {
    type Error = UserValidationError;

    fn try_from(seed: UserSeed) -> Result<Self, Self::Error> {
        Ok(Self::new(UserParts {
            id: UserId::new(seed.id)?,
            display_name: DisplayName::new(seed.display_name)?,
            email: EmailAddress::new(seed.email)?,
            credential_hash: CredentialHash::new(seed.credential_hash)?,
            is_admin: seed.is_admin,
        }))
    }
}

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<EmailAddress, UserId>,
}

/// Process-local user store keyed by id with a unique email index.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Users>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON array of user entries.
    ///
    /// # Errors
    ///
    /// Fails when the file is unreadable, malformed, holds an invalid
    /// entry, or repeats an email address.
    pub fn from_seed_file(path: &Path) -> Result<Self, UserSeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| UserSeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let seeds: Vec<UserSeed> =
            serde_json::from_str(&raw).map_err(|source| UserSeedError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let repo = Self::new();
        for (index, seed) in seeds.into_iter().enumerate() {
            let user =
                User::try_from(seed).map_err(|source| UserSeedError::Invalid { index, source })?;
            repo.insert(user)
                .map_err(|source| UserSeedError::Duplicate { index, source })?;
        }
        Ok(repo)
    }

    /// Insert or replace a user, enforcing email uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`UserPersistenceError::DuplicateEmail`] when another user
    /// holds the email.
    pub fn insert(&self, user: User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(holder) = users.by_email.get(user.email())
            && holder != user.id()
        {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }

        if let Some(previous) = users.by_id.get(user.id()).map(|prev| prev.email().clone()) {
            users.by_email.remove(&previous);
        }
        users.by_email.insert(user.email().clone(), user.id().clone());
        users.by_id.insert(user.id().clone(), user);
        Ok(())
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.insert(user.clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.by_id.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(ids.iter().filter_map(|id| users.by_id.get(id).cloned()).collect())
    }
}
