//! Per-key locks and the tokens that prove ownership of them.

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Credential proving that the caller holds a variable's lock.
///
/// Each acquisition issues a new token; tokens are unique for the
/// lifetime of the process, so a token from an earlier acquisition or
/// from another key never matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct LockToken(u64);

impl LockToken {
    pub(crate) fn issue() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token-{}", self.0)
    }
}

/// Binary lock that is not tied to a guard's scope.
///
/// A lock taken by `lock_variable` is released by a later
/// `unlock_variable` call, so the holder's token lives behind a mutex and
/// waiters park on a condition variable. Only the token issued by an
/// acquisition can release it.
#[derive(Debug, Default)]
pub(crate) struct KeyLock {
    holder: Mutex<Option<LockToken>>,
    released: Condvar,
}

impl KeyLock {
    /// Block until the lock is free, then take it.
    pub(crate) fn acquire(&self) -> LockToken {
        let mut holder = self.holder.lock();
        while holder.is_some() {
            self.released.wait(&mut holder);
        }
        let token = LockToken::issue();
        *holder = Some(token);
        token
    }

    /// Take the lock if it is free. Never blocks.
    pub(crate) fn try_acquire(&self) -> Option<LockToken> {
        let mut holder = self.holder.lock();
        if holder.is_some() {
            return None;
        }
        let token = LockToken::issue();
        *holder = Some(token);
        Some(token)
    }

    /// Release the lock if `token` belongs to the current acquisition.
    pub(crate) fn release(&self, token: LockToken) -> bool {
        let mut holder = self.holder.lock();
        if *holder != Some(token) {
            return false;
        }
        *holder = None;
        drop(holder);
        self.released.notify_one();
        true
    }

    pub(crate) fn holds(&self, token: LockToken) -> bool {
        *self.holder.lock() == Some(token)
    }

    pub(crate) fn is_held(&self) -> bool {
        self.holder.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn tokens_are_unique() {
        let a = LockToken::issue();
        let b = LockToken::issue();
        assert_ne!(a, b);
    }

    #[test]
    fn try_acquire_fails_while_held() {
        let lock = KeyLock::default();
        let token = lock.try_acquire().unwrap();
        assert!(lock.is_held());
        assert!(lock.holds(token));
        assert!(lock.try_acquire().is_none());
        assert!(lock.release(token));
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn only_the_issued_token_releases() {
        let lock = KeyLock::default();
        let token = lock.acquire();
        assert!(!lock.release(LockToken::issue()));
        assert!(lock.is_held());
        assert!(lock.release(token));
        assert!(!lock.release(token));
    }

    #[test]
    fn waiter_wakes_on_release() {
        let lock = Arc::new(KeyLock::default());
        let token = lock.acquire();

        let waiter = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                let token = lock.acquire();
                lock.release(token);
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        lock.release(token);
        waiter.join().unwrap();
        assert!(!lock.is_held());
    }

    #[test]
    fn release_from_another_thread() {
        let lock = Arc::new(KeyLock::default());
        let token = lock.acquire();
        let other = Arc::clone(&lock);
        assert!(thread::spawn(move || other.release(token)).join().unwrap());
        assert!(lock.try_acquire().is_some());
    }
}
