//! Index cache keyed by the identity of the current input set.

use std::future::Future;

use crate::input::InputSetKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No index, or the input set changed since it was built.
    Stale,
    /// The index matches the current input set.
    Fresh,
}

/// Holds at most one built value `T` together with the key it was built for.
#[derive(Debug)]
pub struct SessionCache<T> {
    entry: Option<(InputSetKey, T)>,
}

impl<T> Default for SessionCache<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> SessionCache<T> {
    #[must_use]
    pub fn state(&self, current: &InputSetKey) -> CacheState {
        match &self.entry {
            Some((key, _)) if key == current => CacheState::Fresh,
            _ => CacheState::Stale,
        }
    }

    /// The cached value, only if it was built for `current`.
    #[must_use]
    pub fn get(&self, current: &InputSetKey) -> Option<&T> {
        self.entry
            .as_ref()
            .filter(|(key, _)| key == current)
            .map(|(_, value)| value)
    }

    /// Return the value for `key`, running `build` first when the cache is stale.
    ///
    /// A failed build leaves the cache empty and returns the error.
    ///
    /// # Errors
    ///
    /// Propagates the error from `build`.
    pub async fn get_or_build<F, Fut, E>(&mut self, key: &InputSetKey, build: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let entry = match self.entry.take() {
            Some((cached, value)) if cached == *key => (cached, value),
            previous => {
                if previous.is_some() {
                    tracing::debug!(key = %key, "input set changed, rebuilding index");
                }
                let value = build().await?;
                (key.clone(), value)
            }
        };
        Ok(&self.entry.insert(entry).1)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
