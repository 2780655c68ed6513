//! The type-erased value crossing the marshaling boundary.

use std::any::Any;
use std::fmt;

use crate::error::RuntimeError;
use crate::types::TypeInfo;

/// A boxed value of some exported type.
///
/// `Value` is the uniform representation arguments and results take while
/// passing through a generic handler. Boxing and unboxing happen exactly
/// at the marshaling boundary; unboxing to the wrong type fails with
/// [`RuntimeError::Downcast`], never coerces.
pub struct Value {
    inner: Box<dyn Any + Send>,
    ty: TypeInfo,
}

impl Value {
    /// Boxes `value`.
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            ty: TypeInfo::of::<T>(),
        }
    }

    /// Returns the unit value. Handlers bound to void-shaped signatures
    /// conventionally return this; the adapter discards it either way.
    pub fn unit() -> Self {
        Self::new(())
    }

    /// The [`TypeInfo`] this value was boxed from.
    pub fn ty(&self) -> TypeInfo {
        self.ty
    }

    /// Whether the boxed value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Unboxes into a `T`, consuming the value.
    pub fn downcast<T: 'static>(self) -> Result<T, RuntimeError> {
        match self.inner.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(_) => Err(RuntimeError::Downcast {
                expected: TypeInfo::of::<T>().name(),
                got: self.ty.name(),
            }),
        }
    }

    /// Borrows the boxed value as a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Result<&T, RuntimeError> {
        self.inner
            .downcast_ref::<T>()
            .ok_or_else(|| RuntimeError::Downcast {
                expected: TypeInfo::of::<T>().name(),
                got: self.ty.name(),
            })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("ty", &self.ty.name()).finish()
    }
}
