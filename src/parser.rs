mod base;
mod interface;
mod printer;

pub use base::{ConfigError, Flag, FlagError};
pub(crate) use base::Registry;
pub(crate) use interface::Output;
pub(crate) use printer::Printer;

#[cfg(test)]
pub(crate) use base::test;
#[cfg(test)]
pub(crate) use interface::util;
