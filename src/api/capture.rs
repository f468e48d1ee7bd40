use thiserror::Error;

use crate::model::Primitive;

/// The capability set a [`FlagSet`](crate::FlagSet) needs from the storage behind a flag.
///
/// The flag set holds every registered flag as a `dyn Value`, so flags of different types live in one table.
/// The typed adapters ([`Optional`](crate::Optional), [`Scalar`](crate::Scalar)) implement this for the
/// supported primitive types.
/// Implement it yourself to register a custom flag via [`FlagSet::var`](crate::FlagSet::var).
pub trait Value {
    /// The example/default text, exactly as captured at registration.
    fn render(&self) -> String;

    /// Parse `token` and store the result.
    /// On error the stored value must be left untouched.
    fn set(&mut self, token: &str) -> Result<(), InvalidValue>;

    /// The value currently stored, or `None` if nothing has been stored (yet).
    fn get(&self) -> Option<Primitive>;

    /// Whether the flag may appear without a value (a bare `-flag` means `-flag=true`).
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// The value placeholder printed in the usage, when the usage text does not back-quote one.
    fn type_hint(&self) -> &'static str {
        "value"
    }

    /// Whether the usage should quote the example text.
    fn quote_example(&self) -> bool {
        false
    }
}

/// A token that could not be converted to a flag's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidValue {
    /// The token does not follow the type's grammar.
    #[error("cannot convert '{token}' to {type_name}")]
    Syntax {
        /// The offending token.
        token: String,
        /// The type the token was meant for.
        type_name: &'static str,
    },
    /// The token is well formed, but does not fit the type.
    #[error("'{token}' is out of range for {type_name}")]
    Range {
        /// The offending token.
        token: String,
        /// The type the token was meant for.
        type_name: &'static str,
    },
}

impl InvalidValue {
    pub(crate) fn syntax(token: &str, type_name: &'static str) -> Self {
        InvalidValue::Syntax {
            token: token.to_string(),
            type_name,
        }
    }

    pub(crate) fn range(token: &str, type_name: &'static str) -> Self {
        InvalidValue::Range {
            token: token.to_string(),
            type_name,
        }
    }
}
