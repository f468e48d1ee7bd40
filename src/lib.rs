//! `nodefflag` provides command line flags that know whether they were set.
//!
//! A typical flag binds to a plain value with a default, so once parsing is done there is no telling apart
//! `-count=0` from no `-count` at all.
//! `nodefflag` adds *optional* flags: each binds to an [`Option`] that stays `None` until the flag is parsed.
//! The example value passed at registration is only ever displayed in the usage; it is never the flag's value.
//!
//! The supported flag types are `string` ([`String`]), `bool`, `int` ([`i32`]), `int64` ([`i64`]),
//! `uint` ([`u32`]), `uint64` ([`u64`]), `float64` ([`f64`]) and `duration` ([`std::time::Duration`]).
//! Each is available in two styles:
//! * *optional*: [`FlagSet::optional_string`], [`FlagSet::optional_bool`], ... bind to `Option<T>`.
//! * *direct*: [`FlagSet::string`], [`FlagSet::bool`], ... bind to `T`, starting at its zero value.
//!
//! and each style comes in two forms: one returning a [`Handle`] to storage allocated by the [`FlagSet`],
//! the other (`_var`) binding to a variable of your own.
//!
//! # Usage
//! ```
//! use nodefflag::{ErrorHandling, FlagSet};
//! use std::time::Duration;
//!
//! let mut flags = FlagSet::new("server", ErrorHandling::ContinueOnError);
//! let host = flags.optional_string("host", "localhost", "the `address` to bind");
//! let timeout = flags.optional_duration("timeout", Duration::from_secs(30), "request timeout");
//! let verbose = flags.bool("v", false, "log every request");
//!
//! flags.parse(&["-timeout=1h30m", "-v"]).unwrap();
//!
//! assert_eq!(host.get(), None);
//! assert_eq!(timeout.get(), Some(Duration::from_secs(90 * 60)));
//! assert!(verbose.get());
//! ```
//!
//! The usage (written to standard error by default, see [`FlagSet::set_output`]) shows each flag's example:
//! ```console
//! Usage of server:
//!   -host address
//!     	the address to bind (example "localhost")
//!   -timeout duration
//!     	request timeout (example 30s)
//!   -v	log every request (example false)
//! ```
//!
//! # Grammar
//! Flags are written `-name`, `-name=value` or `-name value`, with `--` accepted in place of `-`.
//! A boolean flag on its own means `true`, so turning one off requires `-name=false`.
//! Parsing stops before the first token that isn't a flag, or just after a `--`.
//!
//! # Errors
//! A malformed value fails with [`InvalidValue::Syntax`], and a well formed value that doesn't fit its type
//! (ex: `-count=4294967296` for a `uint`) fails with [`InvalidValue::Range`].
//! Either way the flag's storage is left as it was.
//! What happens next is up to the [`ErrorHandling`] given to [`FlagSet::new`].
#![deny(missing_docs)]
mod api;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;

pub use api::*;
pub use model::*;
pub use parser::{ConfigError, Flag, FlagError};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {
            assert!(
                $base.contains($sub),
                "'{b}' does not contain '{s}'",
                b = $base,
                s = $sub,
            );
        };
    }

    pub(crate) use assert_contains;
}
