//! Process-wide, in-memory slot holding the current bearer credential.

// self
use crate::{_prelude::*, auth::credential::Credential};

/// Thread-safe holder for at most one [`Credential`].
///
/// The cache never persists anything; it lives as long as the owning client. Readers clone
/// the credential out so no lock is held across request building or `.await` points.
#[derive(Debug, Default)]
pub struct CredentialCache(RwLock<Option<Credential>>);
impl CredentialCache {
	/// Returns a copy of the cached credential, if any.
	pub fn get(&self) -> Option<Credential> {
		self.0.read().clone()
	}

	/// Replaces the cached credential.
	pub fn set(&self, credential: Credential) {
		*self.0.write() = Some(credential);
	}

	/// Drops the cached credential, returning the cache to the no-token state.
	pub fn clear(&self) -> Option<Credential> {
		self.0.write().take()
	}

	/// `present AND now < expires_at`.
	pub fn is_valid(&self, now: OffsetDateTime) -> bool {
		self.0.read().as_ref().is_some_and(|credential| credential.is_valid_at(now))
	}

	/// Returns the credential only when it is still valid at `now`.
	pub fn valid_at(&self, now: OffsetDateTime) -> Option<Credential> {
		self.0.read().as_ref().filter(|credential| credential.is_valid_at(now)).cloned()
	}
}
