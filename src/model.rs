use std::time::Duration;

/// What a [`FlagSet`](crate::FlagSet) does once parsing fails.
///
/// In every case the error (and, except for a help request, the usage) has already been written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHandling {
    /// Return the error to the caller.
    ContinueOnError,
    /// Exit the process: status `0` for a help request, `2` otherwise.
    ExitOnError,
    /// Panic with the error message.
    PanicOnError,
}

impl std::fmt::Display for ErrorHandling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A snapshot of the value held by a flag's cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// `string`
    Str(String),
    /// `bool`
    Bool(bool),
    /// `int`
    Int(i32),
    /// `int64`
    Int64(i64),
    /// `uint`
    Uint(u32),
    /// `uint64`
    Uint64(u64),
    /// `float64`
    Float64(f64),
    /// `duration`
    Duration(Duration),
}
