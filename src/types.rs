//! Runtime descriptions of adapter signatures.

use std::any::{type_name, TypeId};
use std::fmt;

/// A runtime descriptor for a single Rust type: its [`TypeId`] paired with
/// the fully-qualified name it is reported under in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Captures the descriptor for `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The `TypeId` of the described type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully-qualified name of the described type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The shape of an adapter: its parameter types in declaration order and
/// its result type, where `None` describes a void-shaped signature.
///
/// A `Signature` is immutable once captured. Two adapters with the same
/// signature are interchangeable with respect to marshaling; they differ
/// only in the handler they forward to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Box<[TypeInfo]>,
    result: Option<TypeInfo>,
}

impl Signature {
    /// Creates a new signature with the given parameter and result types.
    pub fn new<P>(params: P, result: Option<TypeInfo>) -> Self
    where
        P: Into<Box<[TypeInfo]>>,
    {
        Self {
            params: params.into(),
            result,
        }
    }

    /// Parameter types, in declaration order.
    pub fn params(&self) -> &[TypeInfo] {
        &self.params
    }

    /// Result type. `None` for void-shaped signatures.
    pub fn result(&self) -> Option<&TypeInfo> {
        self.result.as_ref()
    }

    /// Number of parameters this signature takes.
    pub fn param_arity(&self) -> usize {
        self.params.len()
    }

    /// Every type referenced by this signature, parameters first.
    pub(crate) fn referenced_types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.params.iter().chain(self.result.as_ref())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|p| p.name().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let result = match &self.result {
            Some(r) => r.name(),
            None => "",
        };
        write!(f, "[{params}] -> [{result}]")
    }
}
