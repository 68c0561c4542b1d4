//! User accounts and credentials

use crate::errors::{DomainError, DomainResult};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use std::fmt;

/// Minimum accepted plaintext password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A stored, salted password hash
///
/// The hash itself is produced by the backend's password hasher; this type
/// only carries it and enforces the plaintext policy before hashing.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    hash: String,
}

impl Credential {
    /// Check a plaintext password against the length policy
    pub fn check_plaintext(plaintext: &str) -> DomainResult<()> {
        if plaintext.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooShort);
        }
        Ok(())
    }

    /// Wrap an existing hash. Returns `None` for an empty hash, which
    /// stands for "no password set".
    pub fn from_hash(hash: impl Into<String>) -> Option<Self> {
        let hash = hash.into();
        if hash.is_empty() {
            None
        } else {
            Some(Self { hash })
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([redacted])")
    }
}

/// A user account
///
/// A user can exist without a credential (an invited or migrated account);
/// such users must set a password before they can log in.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    credential: Option<Credential>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, name: &str, email: impl Into<String>) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }

        let now = Utc::now();
        Ok(Self {
            id,
            name: name.to_string(),
            email: email.into(),
            credential: None,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }


    /// Rebuild a stored user
    pub fn reconstruct(
        id: UserId,
        name: String,
        email: String,
        credential: Option<Credential>,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            credential,
            active,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn has_password(&self) -> bool {
        self.credential.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    pub fn update_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.updated_at = Utc::now();
    }

    /// Rename the user. Blank names are rejected and leave the name as is.
    pub fn update_name(&mut self, name: &str) -> DomainResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        self.name = name.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }
}
