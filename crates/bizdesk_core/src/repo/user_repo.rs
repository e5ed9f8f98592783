//! Single-record user profile repository.
//!
//! # Invariants
//! - The profile lives under one key; absence triggers the default seed.
//! - Writes are version-guarded like collection writes.

use crate::clock::Clock;
use crate::model::user::{User, UserPatch};
use crate::repo::{RepoError, RepoResult};
use crate::store::{read_version, CommitOutcome, KeyValueStore, WriteBatch};
use log::{info, warn};

pub const USER_KEY: &str = "user_profile";
pub const USER_VERSION_KEY: &str = "user_profile:version";

pub struct UserRepository<'s, S: ?Sized> {
    store: &'s S,
    clock: &'s dyn Clock,
}

impl<'s, S: KeyValueStore + ?Sized> UserRepository<'s, S> {
    pub fn new(store: &'s S, clock: &'s dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Writes the default profile when none is stored.
    pub fn initialize(&self) -> RepoResult<()> {
        let version = read_version(self.store, USER_VERSION_KEY)?;
        if self.store.get(USER_KEY)?.is_some() {
            return Ok(());
        }
        let profile = User::seed(self.clock.now());
        match self.write(version, &profile) {
            Ok(()) => {
                info!("event=user_seed module=repo collection=user_profile status=ok");
                Ok(())
            }
            Err(err) if err.is_conflict() => {
                if self.store.get(USER_KEY)?.is_some() {
                    return Ok(());
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Returns the stored profile, or `None` when it cannot be decoded.
    pub fn get(&self) -> RepoResult<Option<User>> {
        self.initialize()?;
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(
                    "event=user_read module=repo collection=user_profile status=degraded reason=decode_failed error={err}"
                );
                Ok(None)
            }
        }
    }

    /// Shallow-merges `patch` into the profile and refreshes `updated_at`.
    ///
    /// Returns `Ok(None)` when no profile is stored.
    pub fn update(&self, patch: UserPatch) -> RepoResult<Option<User>> {
        self.initialize()?;
        let version = read_version(self.store, USER_VERSION_KEY)?;
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        let mut user = decode_profile(&raw)?;

        user.apply_patch(patch);
        user.updated_at = self.clock.now().max(user.created_at);
        user.validate()?;
        self.write(version, &user)?;

        info!("event=user_update module=repo collection=user_profile status=ok");
        Ok(Some(user))
    }

    /// Replaces the whole profile, keeping the stored `id` and `created_at`
    /// when a profile already exists.
    ///
    /// Refuses to overwrite an unreadable stored profile; `clear` removes it.
    pub fn save(&self, mut user: User) -> RepoResult<User> {
        let version = read_version(self.store, USER_VERSION_KEY)?;
        if let Some(raw) = self.store.get(USER_KEY)? {
            let existing = decode_profile(&raw)?;
            user.id = existing.id;
            user.created_at = existing.created_at;
        }
        user.updated_at = self.clock.now().max(user.created_at);
        user.validate()?;
        self.write(version, &user)?;
        Ok(user)
    }

    /// Removes the profile and bumps its version. The next read writes the
    /// default seed again.
    pub fn clear(&self) -> RepoResult<()> {
        let version = read_version(self.store, USER_VERSION_KEY)?;
        let batch = WriteBatch::guarded(USER_VERSION_KEY, version).remove(USER_KEY);
        self.commit(batch)?;
        info!("event=user_clear module=repo collection=user_profile status=ok");
        Ok(())
    }

    fn write(&self, version: u64, user: &User) -> RepoResult<()> {
        let batch =
            WriteBatch::guarded(USER_VERSION_KEY, version).set(USER_KEY, encode_profile(user)?);
        self.commit(batch)
    }

    fn commit(&self, batch: WriteBatch) -> RepoResult<()> {
        match self.store.commit(&batch)? {
            CommitOutcome::Applied { .. } => Ok(()),
            CommitOutcome::Conflict { expected, found } => Err(RepoError::Conflict {
                collection: USER_KEY,
                expected,
                found,
            }),
        }
    }
}

fn encode_profile(user: &User) -> RepoResult<String> {
    serde_json::to_string(user).map_err(RepoError::Encode)
}

fn decode_profile(raw: &str) -> RepoResult<User> {
    serde_json::from_str::<User>(raw).map_err(|err| RepoError::CorruptCollection {
        collection: USER_KEY,
        message: err.to_string(),
    })
}
