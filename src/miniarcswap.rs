use std::sync::{Mutex, Arc, MutexGuard};

/// Holds an `Arc<T>` that readers can take copies of and keep for as
/// long as they like, while a writer replaces it at any time. Readers
/// that took a copy before the replacement keep seeing the old value.
pub struct MiniArcSwap<T> {
    payload: Mutex<Arc<T>>
}

impl<T> MiniArcSwap<T> {
    pub fn new(payload: Arc<T>) -> MiniArcSwap<T> {
        MiniArcSwap { payload: Mutex::new(payload) }
    }

    // The lock is only held for the Arc clone or assignment, which
    // can't panic, thus a poisoned lock still holds a valid Arc.
    fn lock(&self) -> MutexGuard<'_, Arc<T>> {
        self.payload.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.lock())
    }

    /// Replace the payload if `f` returns a new one given the current
    /// one; returns whether it did. Holds the lock while `f` runs, so
    /// concurrent updaters don't overwrite each other.
    pub fn update_with<F>(&self, f: F) -> bool
    where F: FnOnce(&Arc<T>) -> Option<Arc<T>>
    {
        let mut guard = self.lock();
        match f(&guard) {
            Some(new) => {
                *guard = new;
                true
            }
            None => false
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_get_keeps_old_copy() {
        let s = MiniArcSwap::new(Arc::new(1));
        let old = s.get();
        assert!(s.update_with(|_| Some(Arc::new(2))));
        assert_eq!(*old, 1);
        assert_eq!(*s.get(), 2);
    }

    #[test]
    fn t_update_with() {
        let s = MiniArcSwap::new(Arc::new(1));
        assert!(!s.update_with(|_| None));
        assert!(s.update_with(|cur| Some(Arc::new(**cur + 10))));
        assert_eq!(*s.get(), 11);
    }
}
