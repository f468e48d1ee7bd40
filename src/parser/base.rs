use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::{InvalidValue, Value};

/// A problem with how the flags were defined, ex: the same name registered twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

/// Why parsing the command line failed.
#[derive(Debug, Error)]
pub enum FlagError {
    /// A token looked like a flag, but its name was malformed (ex: `---x`, `-=x`).
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
    /// No flag is registered under this name.
    #[error("flag provided but not defined: -{0}")]
    NotDefined(String),
    /// A non-boolean flag was the final token and had no `=value`.
    #[error("flag needs an argument: -{0}")]
    MissingArgument(String),
    /// The value could not be converted to the flag's type.
    #[error("invalid value {token:?} for flag -{name}: {source}")]
    InvalidValue {
        /// The flag's name.
        name: String,
        /// The value as written on the command line.
        token: String,
        /// The conversion failure.
        source: InvalidValue,
    },
    /// `-h` or `-help` was supplied without being registered.
    #[error("help requested")]
    Help,
    /// The flag set was misconfigured before parsing began.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A registered flag.
pub struct Flag<'a> {
    name: String,
    usage: String,
    value: Box<dyn Value + 'a>,
}

impl<'a> Flag<'a> {
    /// The name, as written after the `-` on the command line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The usage text, as registered.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// The example/default text shown in the usage.
    pub fn example(&self) -> String {
        self.value.render()
    }

    /// The storage behind the flag.
    pub fn value(&self) -> &dyn Value {
        self.value.as_ref()
    }
}

impl<'a> std::fmt::Debug for Flag<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("example", &self.value.render())
            .finish()
    }
}

pub(crate) struct Registry<'a> {
    flags: BTreeMap<String, Flag<'a>>,
    actual: BTreeSet<String>,
    args: Vec<String>,
    parsed: bool,
    deferred_error: Option<ConfigError>,
}

impl<'a> std::fmt::Debug for Registry<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry{..}").finish()
    }
}

impl<'a> Default for Registry<'a> {
    fn default() -> Self {
        Self {
            flags: BTreeMap::default(),
            actual: BTreeSet::default(),
            args: Vec::default(),
            parsed: false,
            deferred_error: None,
        }
    }
}

impl<'a> Registry<'a> {
    /// Register a flag.
    /// A repeated name keeps the first flag; the error is deferred until `parse`.
    pub(crate) fn register(&mut self, name: String, usage: String, value: Box<dyn Value + 'a>) {
        if self.flags.contains_key(&name) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Flag '{name}' redefined; keeping the first one.");
            }

            if self.deferred_error.is_none() {
                self.deferred_error
                    .replace(ConfigError(format!("flag redefined: {name}")));
            }

            return;
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Registered flag '{name}'.");
        }

        let flag = Flag {
            name: name.clone(),
            usage,
            value,
        };
        self.flags.insert(name, flag);
    }

    pub(crate) fn parse(&mut self, tokens: &[&str]) -> Result<(), FlagError> {
        self.parsed = true;

        if let Some(error) = &self.deferred_error {
            return Err(FlagError::Config(error.clone()));
        }

        let mut remaining: VecDeque<String> = tokens.iter().map(|t| t.to_string()).collect();
        let result = loop {
            match self.parse_one(&mut remaining) {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(error) => break Err(error),
            }
        };
        self.args = remaining.into_iter().collect();
        result
    }

    // Ok(true) when a flag was consumed, Ok(false) once flag parsing is over.
    fn parse_one(&mut self, remaining: &mut VecDeque<String>) -> Result<bool, FlagError> {
        let token = match remaining.front() {
            Some(token) => token.clone(),
            None => return Ok(false),
        };

        if token.len() < 2 || !token.starts_with('-') {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Token '{token}' is not a flag; stopping.");
            }

            return Ok(false);
        }

        let mut minuses = 1;

        if token.starts_with("--") {
            minuses += 1;

            if token.len() == 2 {
                // "--" terminates the flags.
                remaining.pop_front();
                return Ok(false);
            }
        }

        let name = &token[minuses..];

        if name.is_empty() || name.starts_with('-') || name.starts_with('=') {
            return Err(FlagError::BadSyntax(token.clone()));
        }

        remaining.pop_front();
        let (name, value) = match name.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (name, None),
        };

        let flag = match self.flags.get_mut(name) {
            Some(flag) => flag,
            None if name == "help" || name == "h" => return Err(FlagError::Help),
            None => return Err(FlagError::NotDefined(name.to_string())),
        };

        let value = match value {
            Some(value) => value,
            None if flag.value.is_bool_flag() => "true".to_string(),
            None => match remaining.pop_front() {
                Some(value) => value,
                None => return Err(FlagError::MissingArgument(name.to_string())),
            },
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Setting flag '{name}' from '{value}'.");
        }

        flag.value
            .set(&value)
            .map_err(|source| FlagError::InvalidValue {
                name: name.to_string(),
                token: value.clone(),
                source,
            })?;
        self.actual.insert(name.to_string());
        Ok(true)
    }

    pub(crate) fn set(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        let flag = self
            .flags
            .get_mut(name)
            .ok_or_else(|| FlagError::NotDefined(name.to_string()))?;
        flag.value
            .set(value)
            .map_err(|source| FlagError::InvalidValue {
                name: name.to_string(),
                token: value.to_string(),
                source,
            })?;
        self.actual.insert(name.to_string());
        Ok(())
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&Flag<'a>> {
        self.flags.get(name)
    }

    /// All flags, in name order.
    pub(crate) fn flags(&self) -> impl Iterator<Item = &Flag<'a>> {
        self.flags.values()
    }

    /// The flags that have been set, in name order.
    pub(crate) fn actual(&self) -> impl Iterator<Item = &Flag<'a>> {
        self.actual.iter().filter_map(|name| self.flags.get(name))
    }

    pub(crate) fn is_set(&self, name: &str) -> bool {
        self.actual.contains(name)
    }

    pub(crate) fn args(&self) -> &[String] {
        &self.args
    }

    pub(crate) fn parsed(&self) -> bool {
        self.parsed
    }

    pub(crate) fn config_error(&self) -> Option<&ConfigError> {
        self.deferred_error.as_ref()
    }
}
