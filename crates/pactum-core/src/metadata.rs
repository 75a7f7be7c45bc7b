//! Memoized type descriptors.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::reflect::{Reflect, TypeInfo};

fn cache() -> &'static DashMap<TypeId, Arc<TypeInfo>> {
    static CACHE: OnceLock<DashMap<TypeId, Arc<TypeInfo>>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Returns the descriptor of `T`, building it on first use.
///
/// Descriptors are immutable for the lifetime of the process, so one copy
/// per type is shared by every caller.
///
/// ```
/// use pactum_core::{describe, TypeKind};
///
/// let info = describe::<Vec<String>>();
/// assert!(matches!(info.kind(), TypeKind::Sequence(_)));
/// ```
pub fn describe<T: Reflect>() -> Arc<TypeInfo> {
    let id = TypeId::of::<T>();
    if let Some(info) = cache().get(&id) {
        return Arc::clone(info.value());
    }

    // Built outside the map lock; a racing thread may build the same
    // descriptor, and the first insert wins.
    let info = Arc::new(T::type_info());
    tracing::debug!(
        type_name = info.rust_name(),
        fields = info.fields().len(),
        "described type"
    );
    Arc::clone(cache().entry(id).or_insert(info).value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_is_memoized() {
        let first = describe::<Option<u32>>();
        let second = describe::<Option<u32>>();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_describe_concurrently() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(describe::<Vec<i64>>))
            .collect();
        let infos: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(infos.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
