//! Error types surfaced by synthesis and by bound-adapter calls.

use thiserror::Error;

use crate::types::Signature;

/// A requested signature references one or more types that have not been
/// exported to the adapter layer.
///
/// Synthesized adapters may only traffic in exported types, so this is a
/// structural failure: it is raised synchronously before any cache write,
/// carries the complete list of offending type names, and cannot be
/// retried until the host exports the missing types (see
/// [`export_type`](crate::export_type)).
#[derive(Debug, Clone, Error)]
#[error(
    "cannot synthesize an adapter for `{signature}`: the following types \
     are not exported to the adapter layer: {}",
    .hidden.join(", ")
)]
pub struct VisibilityError {
    signature: Signature,
    hidden: Vec<&'static str>,
}

impl VisibilityError {
    pub(crate) fn new(signature: Signature, hidden: Vec<&'static str>) -> Self {
        Self { signature, hidden }
    }

    /// The signature that failed validation.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Fully-qualified names of every type that blocked synthesis.
    pub fn hidden_types(&self) -> &[&'static str] {
        &self.hidden
    }
}

/// An error raised while invoking a bound adapter.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The dynamic call path received the wrong number of arguments.
    #[error("signature `{signature}` expects {expected} arguments, got {got}")]
    ArityMismatch {
        /// The signature that was called.
        signature: Signature,
        /// Arity declared by the signature.
        expected: usize,
        /// Arity the caller supplied.
        got: usize,
    },

    /// An argument's boxed type did not match the signature.
    #[error("argument {index} has type `{got}`, signature `{signature}` expects `{expected}`")]
    ArgumentType {
        /// The signature that was called.
        signature: Signature,
        /// Zero-based position of the offending argument.
        index: usize,
        /// Type declared by the signature.
        expected: &'static str,
        /// Type the caller supplied.
        got: &'static str,
    },

    /// The handler produced a result whose type does not match the
    /// signature's declared return type.
    #[error("handler returned `{got}`, signature declares `{expected}`")]
    ResultType {
        /// Type declared by the signature.
        expected: &'static str,
        /// Type the handler produced.
        got: &'static str,
    },

    /// A boxed value could not be unboxed as the requested type.
    #[error("value of type `{got}` cannot be downcast to `{expected}`")]
    Downcast {
        /// The requested type.
        expected: &'static str,
        /// The value's actual type.
        got: &'static str,
    },

    /// An error reported by the handler itself.
    #[error("{0}")]
    Handler(String),
}

impl RuntimeError {
    /// Creates a handler-raised error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}
