//! Signature validation, factory synthesis, and the process-wide cache.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::adapter::{signature_of, Adapter, ArgList, Handler, RetValue, TypedAdapter};
use crate::error::{RuntimeError, VisibilityError};
use crate::registry;
use crate::types::Signature;
use crate::value::Value;

/// Signature -> factory cache, keyed by the concrete `TypedAdapter`
/// instantiation the caller requested. Initialized empty at process
/// start, grows monotonically, never cleared; the key space is bounded by
/// the number of distinct signatures a program actually uses.
static FACTORIES: Lazy<DashMap<TypeId, AdapterFactory>> = Lazy::new(DashMap::new);

/// Synthesis runs per signature key, observed by the caching tests.
static SYNTHESIS_RUNS: Lazy<DashMap<TypeId, usize>> = Lazy::new(DashMap::new);

#[cfg(test)]
pub(crate) fn synthesis_runs<Args, Rets>() -> usize
where
    Args: ArgList,
    Rets: RetValue,
{
    SYNTHESIS_RUNS
        .get(&TypeId::of::<TypedAdapter<Args, Rets>>())
        .map(|count| *count)
        .unwrap_or(0)
}

/// A reusable adapter factory for one signature.
///
/// The factory pairs the validated [`Signature`] with a binding
/// trampoline built once per signature: a monomorphized function that
/// closes a given handler over the signature's marshaling shape. Binding
/// is pure; calling it twice with different handlers yields two
/// independent, correctly-behaving adapters.
#[derive(Clone, Debug)]
pub struct AdapterFactory {
    signature: Signature,
    bind: fn(Handler) -> Adapter,
}

impl AdapterFactory {
    /// The signature this factory produces adapters for.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Binds `handler`, returning the erased bound adapter.
    pub fn bind<F>(&self, handler: F) -> Adapter
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        (self.bind)(Arc::new(handler))
    }

    /// Binds an already-shared handler.
    pub fn bind_handler(&self, handler: Handler) -> Adapter {
        (self.bind)(handler)
    }
}

/// The binding trampoline. Monomorphized once per signature and stored in
/// the cached factory as a plain function pointer, then reused for every
/// handler bound against that signature.
fn bind_adapter<Args, Rets>(handler: Handler) -> Adapter
where
    Args: ArgList,
    Rets: RetValue,
{
    let signature = signature_of::<Args, Rets>();
    let typed = TypedAdapter::<Args, Rets>::new(handler.clone(), signature.clone());
    Adapter::new(signature, handler, Arc::new(typed))
}

/// Validates the signature and builds its factory.
///
/// Validation runs before anything else: every parameter type and the
/// return type must be exported to the adapter layer, and a failure names
/// all offending types at once. Nothing is published to the cache on
/// failure.
fn synthesize<Args, Rets>() -> Result<AdapterFactory, VisibilityError>
where
    Args: ArgList,
    Rets: RetValue,
{
    let signature = signature_of::<Args, Rets>();
    let hidden: Vec<&'static str> = signature
        .referenced_types()
        .filter(|ty| !registry::is_exported(ty))
        .map(|ty| ty.name())
        .collect();
    if !hidden.is_empty() {
        return Err(VisibilityError::new(signature, hidden));
    }

    *SYNTHESIS_RUNS
        .entry(TypeId::of::<TypedAdapter<Args, Rets>>())
        .or_insert(0) += 1;
    tracing::debug!(signature = %signature, "adapter factory synthesized");
    Ok(AdapterFactory {
        signature,
        bind: bind_adapter::<Args, Rets>,
    })
}

/// Returns the cached factory for the signature `(Args) -> Rets`,
/// synthesizing it on first use.
///
/// Thread safe. Two threads racing on a cold signature may each
/// synthesize an equivalent factory; no lock is held across synthesis,
/// the last insert wins, and the loser is discarded. Synthesis is pure,
/// so every published entry is independently valid.
pub fn adapter_factory<Args, Rets>() -> Result<AdapterFactory, VisibilityError>
where
    Args: ArgList,
    Rets: RetValue,
{
    let key = TypeId::of::<TypedAdapter<Args, Rets>>();
    if let Some(factory) = FACTORIES.get(&key) {
        tracing::trace!(signature = %factory.signature, "adapter factory cache hit");
        return Ok(factory.clone());
    }

    let factory = synthesize::<Args, Rets>()?;
    FACTORIES.insert(key, factory.clone());
    Ok(factory)
}

/// Synthesizes (or reuses) the factory for `(Args) -> Rets` and binds
/// `handler` to it. Primary entry point.
pub fn create_adapter<Args, Rets, F>(handler: F) -> Result<Adapter, VisibilityError>
where
    Args: ArgList,
    Rets: RetValue,
    F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    Ok(adapter_factory::<Args, Rets>()?.bind(handler))
}

/// Statically-typed form of [`create_adapter`]: performs the same
/// lookup-or-synthesize and recovers the typed adapter.
///
/// The inner `Option` is the cast surface: `None` means the produced
/// adapter does not have the requested static shape. This cannot occur
/// for well-formed signatures and is kept as a defensive check.
pub fn create_typed<Args, Rets, F>(
    handler: F,
) -> Result<Option<TypedAdapter<Args, Rets>>, VisibilityError>
where
    Args: ArgList,
    Rets: RetValue,
    F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    Ok(create_adapter::<Args, Rets, F>(handler)?.downcast::<Args, Rets>())
}
