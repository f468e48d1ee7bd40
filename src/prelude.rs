//! Traits which, typically, may be imported without concern: `use nodefflag::prelude::*`.

/// Needs to be imported in order to read or set a [`Flag`](crate::Flag)'s value, or to implement a custom flag.
pub use crate::api::Value;

/// Needs to be imported in order to render or parse the primitive flag types directly.
pub use crate::api::FlagType;
