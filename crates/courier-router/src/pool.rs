//! Reuse pool for per-dispatch resources.
//!
//! Every dispatch needs a fresh [`Context`](crate::Context) and, in debug
//! mode, a scratch buffer for the raw request body. Both are taken from a
//! [`Pool`] so their allocations (handler list, error list, buffer capacity)
//! survive across events.
//!
//! An item leaves the pool wrapped in a [`Pooled`] guard. Dropping the guard
//! recycles the item and returns it to the free list, which makes release
//! unconditional: early returns and unwinding panics release too.
//!
//! Every idle item has been recycled, so [`Pool::acquire`] always hands out
//! a reset item.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

/// Resets an item to its pristine state, keeping allocated capacity.
pub trait Recycle {
    fn recycle(&mut self);
}

impl Recycle for Vec<u8> {
    fn recycle(&mut self) {
        self.clear();
    }
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

struct PoolInner<T> {
    items: Mutex<Vec<Box<T>>>,
    factory: Factory<T>,
    max_idle: usize,
}

/// A concurrency-safe free list of recyclable items.
///
/// Cloning a pool is cheap; clones share the same free list.
pub struct Pool<T: Recycle> {
    inner: Arc<PoolInner<T>>,
}

impl<T: Recycle> Pool<T> {
    /// Creates an empty pool keeping at most `max_idle` idle items.
    pub fn new<F>(max_idle: usize, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(PoolInner {
                items: Mutex::new(Vec::with_capacity(max_idle)),
                factory: Box::new(factory),
                max_idle,
            }),
        }
    }

    /// Takes an idle item, or creates one if the pool is empty.
    pub fn acquire(&self) -> Pooled<T> {
        let item = self
            .inner
            .items
            .lock()
            .pop()
            .unwrap_or_else(|| Box::new((self.inner.factory)()));

        Pooled {
            item: Some(item),
            pool: Arc::clone(&self.inner),
        }
    }

    /// Pre-allocates idle items up to `count` (capped at the idle limit).
    pub fn warmup(&self, count: usize) {
        let count = count.min(self.inner.max_idle);
        let mut items = self.inner.items.lock();
        while items.len() < count {
            items.push(Box::new((self.inner.factory)()));
        }
    }

    /// Number of idle items.
    pub fn idle(&self) -> usize {
        self.inner.items.lock().len()
    }

    /// Maximum number of idle items kept.
    pub fn max_idle(&self) -> usize {
        self.inner.max_idle
    }
}

impl<T: Recycle> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Recycle> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .field("max_idle", &self.inner.max_idle)
            .finish()
    }
}

/// An item borrowed from a [`Pool`]. Returned to the pool on drop.
pub struct Pooled<T: Recycle> {
    // Always `Some` until `drop` takes it.
    item: Option<Box<T>>,
    pool: Arc<PoolInner<T>>,
}

impl<T: Recycle> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_deref().expect("pooled item is present until drop")
    }
}

impl<T: Recycle> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item
            .as_deref_mut()
            .expect("pooled item is present until drop")
    }
}

impl<T: Recycle> Drop for Pooled<T> {
    fn drop(&mut self) {
        let Some(mut item) = self.item.take() else {
            return;
        };

        item.recycle();

        let mut items = self.pool.items.lock();
        if items.len() < self.pool.max_idle {
            items.push(item);
        }
    }
}

impl<T: Recycle + fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&**self).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn buffers(max_idle: usize) -> Pool<Vec<u8>> {
        Pool::new(max_idle, || Vec::with_capacity(16))
    }

    #[test]
    fn test_release_recycles_and_keeps_capacity() {
        let pool = buffers(4);

        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[1u8; 64]);
        }
        assert_eq!(pool.idle(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 64);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_idle_cap() {
        let pool = buffers(2);
        let items: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        drop(items);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_warmup_is_capped() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let pool: Pool<Vec<u8>> = Pool::new(3, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        });

        pool.warmup(10);
        assert_eq!(pool.idle(), 3);
        assert_eq!(created.load(Ordering::SeqCst), 3);

        let _a = pool.acquire();
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_release_on_unwind() {
        let pool = buffers(4);

        let result: std::thread::Result<()> = catch_unwind(AssertUnwindSafe(|| {
            let mut buf = pool.acquire();
            buf.push(1);
            panic!("boom");
        }));

        assert!(result.is_err());
        assert_eq!(pool.idle(), 1);
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn test_concurrent_acquire() {
        let pool = buffers(8);

        std::thread::scope(|scope| {
            for i in 0..8u8 {
                let pool = pool.clone();
                scope.spawn(move || {
                    for _ in 0..100 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        buf.push(i);
                    }
                });
            }
        });

        assert!(pool.idle() <= pool.max_idle());
    }
}
