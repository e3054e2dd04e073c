//! The global variable manager.

use crate::config::RuntimeConfig;
use crate::core::Value;
use crate::variables::error::VariableError;
use crate::variables::events::{VariableEvent, VariableOperation};
use crate::variables::guard::VariableGuard;
use crate::variables::lock::{KeyLock, LockToken};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Thread-safe store of global variables shared by concurrently running
/// branches of a state machine.
///
/// Every key owns its own lock. Plain reads and writes take the lock
/// briefly; callers that need a read-modify-write sequence lock the key
/// explicitly and use the `*_locked_variable` operations with the issued
/// [`LockToken`].
///
/// Values cross a copy boundary in both directions: [`set_variable`]
/// takes ownership of the value and every read returns an owned clone.
///
/// # Example
///
/// ```rust
/// use hierstate::core::Value;
/// use hierstate::variables::GlobalVariableManager;
///
/// let manager = GlobalVariableManager::new();
/// manager.set_variable("speed", 3);
///
/// let token = manager.lock_variable("speed").unwrap();
/// let current = manager.get_locked_variable("speed", token).unwrap();
/// assert_eq!(current, Value::Int(3));
/// manager.set_locked_variable("speed", token, 4).unwrap();
/// manager.unlock_variable("speed", token).unwrap();
///
/// assert_eq!(manager.get_variable("speed").unwrap(), Value::Int(4));
/// ```
///
/// [`set_variable`]: GlobalVariableManager::set_variable
pub struct GlobalVariableManager {
    values: DashMap<String, Value>,
    locks: DashMap<String, Arc<KeyLock>>,
    /// Explicit acquisitions by token, so an unlock releases the exact
    /// lock instance its token came from.
    acquisitions: DashMap<LockToken, (String, Arc<KeyLock>)>,
    /// Serializes key registration and deletion against each other and
    /// against key-set iteration.
    structure: Mutex<()>,
    events: broadcast::Sender<VariableEvent>,
    config: RuntimeConfig,
}

/// A per-key lock taken internally for the duration of one operation.
struct Held {
    lock: Arc<KeyLock>,
    token: LockToken,
}

impl Drop for Held {
    fn drop(&mut self) {
        self.lock.release(self.token);
    }
}

impl GlobalVariableManager {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let (events, _) = broadcast::channel(config.channel_capacity());
        Self {
            values: DashMap::new(),
            locks: DashMap::new(),
            acquisitions: DashMap::new(),
            structure: Mutex::new(()),
            events,
            config,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<VariableEvent> {
        self.events.subscribe()
    }

    /// Set a global variable, creating it if necessary.
    ///
    /// A fresh lock is registered for the key on every call and replaces
    /// the previous one. A holder of the previous lock is therefore not
    /// waited for, and its token stops matching. Use
    /// [`lock_variable`](Self::lock_variable) with
    /// [`set_locked_variable`](Self::set_locked_variable) when writes must
    /// be mutually exclusive.
    pub fn set_variable(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();

        let structure = self.structure.lock();
        let lock = Arc::new(KeyLock::default());
        let token = lock.acquire();
        self.locks.insert(key.clone(), Arc::clone(&lock));
        let held = Held { lock, token };
        if self.config.log_values {
            debug!(key = %key, value = %value, "Global variable set");
        } else {
            debug!(key = %key, "Global variable set");
        }
        self.values.insert(key.clone(), value);
        drop(held);
        drop(structure);

        self.publish(VariableOperation::Set, &key);
    }

    /// Fetch a copy of a global variable.
    pub fn get_variable(&self, key: &str) -> Result<Value, VariableError> {
        if !self.values.contains_key(key) {
            return Err(VariableError::not_found(key));
        }
        let _held = self.hold_current(key)?;
        self.read(key)
    }

    /// Delete a global variable together with its lock.
    ///
    /// Waits for the key's current holder without blocking registration
    /// or deletion of other keys.
    pub fn delete_global_variable(&self, key: &str) -> Result<(), VariableError> {
        loop {
            if !self.values.contains_key(key) {
                return Err(VariableError::not_found(key));
            }
            let held = self.hold_current(key)?;
            let structure = self.structure.lock();
            // A set may have replaced the lock while we waited for it.
            let current = self
                .locks
                .get(key)
                .is_some_and(|entry| Arc::ptr_eq(entry.value(), &held.lock));
            if !current {
                continue;
            }
            self.values.remove(key);
            self.locks.remove(key);
            drop(structure);
            drop(held);

            debug!(key = %key, "Global variable deleted");
            self.publish(VariableOperation::Delete, key);
            return Ok(());
        }
    }

    /// Lock a global variable, blocking until it is available.
    ///
    /// Returns `None` when the key has no registered lock, or when it is
    /// deleted while waiting. This is the only operation of the manager
    /// that may block indefinitely: it waits for the current holder to
    /// unlock.
    pub fn lock_variable(&self, key: &str) -> Option<LockToken> {
        let (lock, token) = self.acquire_current(key).ok()?;
        self.acquisitions.insert(token, (key.to_string(), lock));

        trace!(key = %key, token = %token, "Global variable locked");
        self.publish(VariableOperation::Lock, key);
        Some(token)
    }

    /// Release a lock taken with [`lock_variable`](Self::lock_variable).
    ///
    /// A mismatching token leaves the lock held. A token whose lock was
    /// replaced by [`set_variable`](Self::set_variable) or deleted since
    /// it was taken fails as well, but still frees that old lock for the
    /// callers waiting on it.
    pub fn unlock_variable(&self, key: &str, token: LockToken) -> Result<(), VariableError> {
        let current = self.locks.get(key).map(|entry| Arc::clone(entry.value()));
        let acquired = self
            .acquisitions
            .remove_if(&token, |_, (locked_key, _)| locked_key == key)
            .map(|(_, (_, lock))| lock);

        match (current, acquired) {
            (Some(current), Some(acquired)) if Arc::ptr_eq(&current, &acquired) => {
                acquired.release(token);
            }
            (current, acquired) => {
                if let Some(stale) = acquired {
                    stale.release(token);
                }
                return Err(match current {
                    Some(_) => VariableError::wrong_key(key),
                    None => VariableError::not_found(key),
                });
            }
        }

        trace!(key = %key, token = %token, "Global variable unlocked");
        self.publish(VariableOperation::Unlock, key);
        Ok(())
    }

    /// Set a variable whose lock the caller already holds.
    pub fn set_locked_variable(
        &self,
        key: &str,
        token: LockToken,
        value: impl Into<Value>,
    ) -> Result<(), VariableError> {
        self.check_token(key, token)?;
        let value = value.into();
        if self.config.log_values {
            debug!(key = %key, value = %value, "Locked global variable set");
        } else {
            debug!(key = %key, "Locked global variable set");
        }
        self.values.insert(key.to_string(), value);

        self.publish(VariableOperation::SetLocked, key);
        Ok(())
    }

    /// Read a variable whose lock the caller already holds.
    pub fn get_locked_variable(&self, key: &str, token: LockToken) -> Result<Value, VariableError> {
        self.check_token(key, token)?;
        self.read(key)
    }

    /// Lock a variable for the lifetime of the returned guard.
    ///
    /// Returns `None` when the key has no registered lock.
    pub fn lock_scoped(&self, key: &str) -> Option<VariableGuard<'_>> {
        let token = self.lock_variable(key)?;
        Some(VariableGuard::new(self, key.to_string(), token))
    }

    pub fn variable_exist(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Whether the key's lock is currently held, read from the lock state.
    pub fn locked_status_for_variable(&self, key: &str) -> bool {
        self.locks
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .is_some_and(|lock| lock.is_held())
    }

    /// Whether the key's lock is currently held, probed with a
    /// non-blocking acquire that is released immediately on success.
    pub fn is_locked(&self, key: &str) -> bool {
        let Ok(lock) = self.lock_for(key) else {
            return false;
        };
        match lock.try_acquire() {
            Some(token) => {
                lock.release(token);
                false
            }
            None => true,
        }
    }

    /// Keys of all variables, sorted.
    pub fn keys(&self) -> Vec<String> {
        let _structure = self.structure.lock();
        let mut keys: Vec<String> = self.values.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Copy of every variable.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        let _structure = self.structure.lock();
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lock_for(&self, key: &str) -> Result<Arc<KeyLock>, VariableError> {
        self.locks
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| VariableError::not_found(key))
    }

    /// Acquire the lock currently registered for `key`, retrying when a
    /// set replaced it during the wait.
    fn acquire_current(&self, key: &str) -> Result<(Arc<KeyLock>, LockToken), VariableError> {
        loop {
            let lock = self.lock_for(key)?;
            let token = lock.acquire();
            let current = self
                .locks
                .get(key)
                .is_some_and(|entry| Arc::ptr_eq(entry.value(), &lock));
            if current {
                return Ok((lock, token));
            }
            lock.release(token);
        }
    }

    fn hold_current(&self, key: &str) -> Result<Held, VariableError> {
        let (lock, token) = self.acquire_current(key)?;
        Ok(Held { lock, token })
    }

    fn read(&self, key: &str) -> Result<Value, VariableError> {
        self.values
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| VariableError::not_found(key))
    }

    fn check_token(&self, key: &str, token: LockToken) -> Result<(), VariableError> {
        if self.lock_for(key)?.holds(token) {
            Ok(())
        } else {
            Err(VariableError::wrong_key(key))
        }
    }

    fn publish(&self, operation: VariableOperation, key: &str) {
        // No subscribers is not an error.
        let _ = self.events.send(VariableEvent::new(operation, key));
    }
}

impl Default for GlobalVariableManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GlobalVariableManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalVariableManager")
            .field("variables", &self.values.len())
            .field("config", &self.config)
            .finish()
    }
}
