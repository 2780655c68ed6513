//! Typed adapters and the arity trampolines behind them.
//!
//! There is no runtime type emission in Rust, so the "one marshaling
//! method per signature" requirement is met with a finite family of
//! trampolines: one tuple impl per parameter arity (0 through 8), each
//! monomorphized per concrete signature. The monomorphized
//! [`TypedAdapter`] instantiation plays the role of the per-signature
//! bridge type: one field holding the bound handler, one method
//! (`call`) whose shape matches the target signature.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::types::{Signature, TypeInfo};
use crate::value::Value;

/// The generic handler every adapter forwards to: an ordered sequence of
/// boxed arguments in, one boxed result out.
pub type Handler = Arc<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static>;

/// A tuple of parameter types usable in an adapter signature.
///
/// Implemented for tuples of 0 through 8 elements. Each impl knows how to
/// describe its element types and how to box a concrete argument tuple
/// into `Value`s in declaration order.
pub trait ArgList: Send + 'static {
    /// Descriptors for the parameter types, in declaration order.
    fn type_infos() -> Vec<TypeInfo>;

    /// Boxes the arguments into an ordered container. A zero-parameter
    /// list produces an empty container.
    fn into_values(self) -> Vec<Value>;
}

/// A type usable as an adapter's declared return type.
///
/// `()` describes a void-shaped signature: the handler's boxed result is
/// discarded. Every other type is unboxed from the handler's result and
/// fails the call with [`RuntimeError::Downcast`] on mismatch.
pub trait RetValue: Send + Sized + 'static {
    /// Descriptor for the return type, or `None` for the void shape.
    fn type_info() -> Option<TypeInfo>;

    /// Recovers the typed result from the handler's boxed result.
    fn from_value(value: Value) -> Result<Self, RuntimeError>;
}

impl<T: Send + 'static> RetValue for T {
    fn type_info() -> Option<TypeInfo> {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            None
        } else {
            Some(TypeInfo::of::<T>())
        }
    }

    fn from_value(value: Value) -> Result<T, RuntimeError> {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            // Void shape: whatever the handler produced is discarded.
            drop(value);
            return Value::unit().downcast::<T>();
        }
        value.downcast::<T>()
    }
}

/// Captures the [`Signature`] of the adapter shape `(Args) -> Rets`.
pub fn signature_of<Args, Rets>() -> Signature
where
    Args: ArgList,
    Rets: RetValue,
{
    Signature::new(Args::type_infos(), Rets::type_info())
}

/// A bound adapter with a native call surface matching its signature.
///
/// A `TypedAdapter` is a closure of one specific handler over the
/// marshaling shape of one signature: `call` boxes its arguments in
/// declaration order, invokes the handler exactly once, and unboxes the
/// result as `Rets`. Cloning is cheap and shares the bound handler.
pub struct TypedAdapter<Args, Rets> {
    handler: Handler,
    signature: Signature,
    _marker: PhantomData<fn(Args) -> Rets>,
}

impl<Args, Rets> TypedAdapter<Args, Rets>
where
    Args: ArgList,
    Rets: RetValue,
{
    pub(crate) fn new(handler: Handler, signature: Signature) -> Self {
        Self {
            handler,
            signature,
            _marker: PhantomData,
        }
    }

    /// The signature this adapter was synthesized for.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl<Args, Rets> Clone for TypedAdapter<Args, Rets> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            signature: self.signature.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Args, Rets> fmt::Debug for TypedAdapter<Args, Rets> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedAdapter")
            .field("signature", &self.signature)
            .finish()
    }
}

/// A bound adapter with its static shape erased.
///
/// This is what the non-generic factory surface hands back: it can be
/// invoked dynamically with boxed arguments, or recovered into its
/// [`TypedAdapter`] form with [`Adapter::downcast`].
pub struct Adapter {
    signature: Signature,
    handler: Handler,
    typed: Arc<dyn Any + Send + Sync>,
}

impl Adapter {
    pub(crate) fn new(
        signature: Signature,
        handler: Handler,
        typed: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            signature,
            handler,
            typed,
        }
    }

    /// The signature this adapter was synthesized for.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Number of parameters this adapter takes.
    pub fn param_arity(&self) -> usize {
        self.signature.param_arity()
    }

    /// Invokes the adapter dynamically.
    ///
    /// Arguments are type-checked against the signature before the
    /// handler runs; the handler's result is type-checked after. For a
    /// void-shaped signature the result is discarded and `Ok(None)` is
    /// returned.
    pub fn call(&self, params: &[Value]) -> Result<Option<Value>, RuntimeError> {
        if params.len() != self.signature.param_arity() {
            return Err(RuntimeError::ArityMismatch {
                signature: self.signature.clone(),
                expected: self.signature.param_arity(),
                got: params.len(),
            });
        }
        for (index, (value, expected)) in
            params.iter().zip(self.signature.params()).enumerate()
        {
            if value.ty().id() != expected.id() {
                return Err(RuntimeError::ArgumentType {
                    signature: self.signature.clone(),
                    index,
                    expected: expected.name(),
                    got: value.ty().name(),
                });
            }
        }

        let result = (self.handler)(params)?;
        match self.signature.result() {
            None => Ok(None),
            Some(expected) if result.ty().id() == expected.id() => Ok(Some(result)),
            Some(expected) => Err(RuntimeError::ResultType {
                expected: expected.name(),
                got: result.ty().name(),
            }),
        }
    }

    /// Recovers the statically-typed adapter, or `None` if `(Args, Rets)`
    /// is not the shape this adapter was synthesized for.
    pub fn downcast<Args, Rets>(&self) -> Option<TypedAdapter<Args, Rets>>
    where
        Args: ArgList,
        Rets: RetValue,
    {
        self.typed
            .downcast_ref::<TypedAdapter<Args, Rets>>()
            .cloned()
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("signature", &self.signature)
            .finish()
    }
}

macro_rules! impl_arity {
    ( $( $x:ident ),* ) => {
        #[allow(unused_parens)]
        impl< $( $x: Send + 'static ),* > ArgList for ( $( $x, )* ) {
            fn type_infos() -> Vec<TypeInfo> {
                vec![ $( TypeInfo::of::<$x>() ),* ]
            }

            #[allow(non_snake_case)]
            fn into_values(self) -> Vec<Value> {
                let ( $( $x, )* ) = self;
                vec![ $( Value::new($x) ),* ]
            }
        }

        impl< $( $x: Send + 'static, )* Rets: RetValue> TypedAdapter<( $( $x, )* ), Rets> {
            /// Boxes the arguments in declaration order, invokes the
            /// bound handler once, and unboxes its result.
            #[allow(non_snake_case, clippy::too_many_arguments)]
            pub fn call(&self, $( $x: $x ),* ) -> Result<Rets, RuntimeError> {
                let values = <( $( $x, )* ) as ArgList>::into_values(( $( $x, )* ));
                let result = (self.handler)(&values)?;
                Rets::from_value(result)
            }
        }
    };
}

impl_arity!();
impl_arity!(A);
impl_arity!(A, B);
impl_arity!(A, B, C);
impl_arity!(A, B, C, D);
impl_arity!(A, B, C, D, E);
impl_arity!(A, B, C, D, E, F);
impl_arity!(A, B, C, D, E, F, G);
impl_arity!(A, B, C, D, E, F, G, H);
