//! Scoped ownership of a variable lock.

use crate::core::Value;
use crate::variables::error::VariableError;
use crate::variables::lock::LockToken;
use crate::variables::manager::GlobalVariableManager;
use tracing::warn;

/// Holds a global variable's lock and releases it when dropped.
///
/// Created by [`GlobalVariableManager::lock_scoped`]. Reads and writes go
/// through the `*_locked_variable` operations with the guard's token, so a
/// read-modify-write through one guard is atomic with respect to every
/// other caller that locks the same key.
///
/// ```rust
/// use hierstate::core::Value;
/// use hierstate::variables::GlobalVariableManager;
///
/// let manager = GlobalVariableManager::new();
/// manager.set_variable("hits", 1);
/// {
///     let guard = manager.lock_scoped("hits").unwrap();
///     if let Value::Int(n) = guard.get().unwrap() {
///         guard.set(n + 1).unwrap();
///     }
/// }
/// assert_eq!(manager.get_variable("hits").unwrap(), Value::Int(2));
/// assert!(!manager.is_locked("hits"));
/// ```
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct VariableGuard<'a> {
    manager: &'a GlobalVariableManager,
    key: String,
    token: LockToken,
    released: bool,
}

impl<'a> VariableGuard<'a> {
    pub(crate) fn new(manager: &'a GlobalVariableManager, key: String, token: LockToken) -> Self {
        Self {
            manager,
            key,
            token,
            released: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> LockToken {
        self.token
    }

    pub fn get(&self) -> Result<Value, VariableError> {
        self.manager.get_locked_variable(&self.key, self.token)
    }

    pub fn set(&self, value: impl Into<Value>) -> Result<(), VariableError> {
        self.manager
            .set_locked_variable(&self.key, self.token, value)
    }

    /// Release the lock now and report failures that a drop would only log.
    pub fn unlock(mut self) -> Result<(), VariableError> {
        self.released = true;
        self.manager.unlock_variable(&self.key, self.token)
    }
}

impl Drop for VariableGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(error) = self.manager.unlock_variable(&self.key, self.token) {
            warn!(key = %self.key, %error, "Scoped variable lock was not released cleanly");
        }
    }
}
