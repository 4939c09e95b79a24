use once_cell::sync::OnceCell;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

type Slot = Arc<dyn Any + Send + Sync>;

/// Values built at most once per key type, counting successful builds only.
///
/// Concurrent first users of the same key block on the single in-flight
/// build and then share its result. Errors are not cached: a failed build
/// leaves the slot empty and the next caller runs `build` again. Entries are
/// never evicted.
#[derive(Default)]
pub struct TypeCache {
    slots: Mutex<HashMap<(TypeId, TypeId), Slot>>,
    builds: AtomicUsize,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value cached for `K`, running `build` if there is none yet.
    ///
    /// When `build` fails its error is returned to this caller alone.
    pub fn get_or_try_insert_with<K, V, E, F>(&self, build: F) -> Result<Arc<V>, E>
    where
        K: ?Sized + 'static,
        V: Send + Sync + 'static,
        F: FnOnce() -> Result<V, E>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots
                .entry((TypeId::of::<K>(), TypeId::of::<V>()))
                .or_insert_with(|| Arc::new(OnceCell::<Arc<V>>::new()) as Slot)
                .clone()
        };

        // The map lock is released here; only callers of this key wait below.
        let counted_build = || {
            self.builds.fetch_add(1, Ordering::SeqCst);
            build().map(Arc::new)
        };

        match slot.downcast::<OnceCell<Arc<V>>>() {
            Ok(cell) => cell.get_or_try_init(counted_build).cloned(),
            // Unreachable while the slot key includes `V`.
            Err(_) => counted_build(),
        }
    }

    /// Returns the cached value for `K` without building it.
    pub fn get<K, V>(&self) -> Option<Arc<V>>
    where
        K: ?Sized + 'static,
        V: Send + Sync + 'static,
    {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(TypeId::of::<K>(), TypeId::of::<V>()))
            .cloned()?;
        slot.downcast::<OnceCell<Arc<V>>>().ok()?.get().cloned()
    }

    /// Number of builds that have run, successful or not.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TypeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCache")
            .field("len", &self.len())
            .field("builds", &self.build_count())
            .finish()
    }
}
