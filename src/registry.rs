//! The process-wide registry of types exported to the adapter layer.
//!
//! Synthesized adapters marshal values through a type-erased boundary, so
//! handlers only ever see a closed universe of types the host has declared
//! usable there. Primitive types are seeded on first access; everything
//! else must be exported explicitly with [`export_type`]. The registry is
//! initialized empty at process start (plus the seed), grows
//! monotonically, and is never cleared.

use std::any::TypeId;

use dashmap::DashSet;
use once_cell::sync::Lazy;

use crate::types::TypeInfo;

static EXPORTED: Lazy<DashSet<TypeId>> = Lazy::new(|| {
    let set = DashSet::new();
    macro_rules! seed {
        ($($ty:ty),* $(,)?) => {
            $( set.insert(TypeId::of::<$ty>()); )*
        };
    }
    seed!(
        i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
        String, &'static str,
    );
    set
});

/// Exports `T` to the adapter layer, making it usable in signatures.
///
/// Exporting is idempotent and cannot be undone.
pub fn export_type<T: Send + 'static>() {
    if EXPORTED.insert(TypeId::of::<T>()) {
        tracing::debug!(ty = std::any::type_name::<T>(), "type exported to adapter layer");
    }
}

pub(crate) fn is_exported(info: &TypeInfo) -> bool {
    EXPORTED.contains(&info.id())
}
