#![deny(
    missing_docs,
    trivial_numeric_casts,
    unused_extern_crates,
    rustdoc::broken_intra_doc_links
)]
#![warn(unused_import_braces)]

//! `dyn-adapter` synthesizes, at runtime, a strongly-typed callable
//! matching a caller-chosen function signature, whose behavior is
//! supplied as a single generic handler receiving an ordered sequence of
//! boxed arguments and returning a boxed result. Generic infrastructure
//! (serializers, proxies, event dispatchers) can thereby expose
//! natively-typed call sites without hand-writing one adapter per
//! signature.
//!
//! Synthesis is lazy and cached: the first request for a signature builds
//! an [`AdapterFactory`] (validating that every referenced type is
//! exported to the adapter layer, see [`export_type`]); subsequent
//! requests for the same signature reuse it, however many distinct
//! handlers are bound.
//!
//! # Usage
//!
//! ```rust
//! use dyn_adapter::{create_typed, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let add = create_typed::<(i32, i32), i32, _>(|args| {
//!     let a = *args[0].downcast_ref::<i32>()?;
//!     let b = *args[1].downcast_ref::<i32>()?;
//!     Ok(Value::new(a + b))
//! })?
//! .expect("adapter has the requested shape");
//!
//! assert_eq!(add.call(2, 3)?, 5);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod error;
mod factory;
mod registry;
mod types;
mod value;

pub use crate::adapter::{signature_of, Adapter, ArgList, Handler, RetValue, TypedAdapter};
pub use crate::error::{RuntimeError, VisibilityError};
pub use crate::factory::{adapter_factory, create_adapter, create_typed, AdapterFactory};
pub use crate::registry::export_type;
pub use crate::types::{Signature, TypeInfo};
pub use crate::value::Value;
