use std::env;
use std::io::Write;
use std::time::Duration;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::{FlagType, Handle, Optional, Scalar, Value};
use crate::model::ErrorHandling;
use crate::parser::{ConfigError, Flag, FlagError, Output, Printer, Registry};

/// A named set of command line flags.
///
/// Flags come in two styles:
/// * *optional* flags bind to an [`Option`], which stays `None` unless the flag is supplied.
/// * *direct* flags bind to a plain value, which starts at the type's zero value.
///
/// Each style is available per type as an allocating method (returning a [`Handle`]) and as a `_var` method binding
/// to a variable of your own.
///
/// ### Example
/// ```
/// # use nodefflag::{ErrorHandling, FlagSet};
/// let mut port: Option<u32> = None;
/// let mut flags = FlagSet::new("program", ErrorHandling::ContinueOnError);
/// let verbose = flags.optional_bool("verbose", false, "log more");
/// flags.optional_uint_var(&mut port, "port", 8080, "port to listen on");
///
/// flags.parse(&["-port", "0"]).unwrap();
///
/// assert_eq!(verbose.get(), None);
/// drop(flags);
/// assert_eq!(port, Some(0));
/// ```
pub struct FlagSet<'a> {
    name: String,
    error_handling: ErrorHandling,
    registry: Registry<'a>,
    output: Output<'a>,
}

impl<'a> std::fmt::Debug for FlagSet<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagSet")
            .field("name", &self.name)
            .field("error_handling", &self.error_handling)
            .finish()
    }
}

impl<'a> FlagSet<'a> {
    /// Create an empty flag set.
    ///
    /// The `name` titles the usage (`"Usage of <name>:"`); leave it empty for a plain `"Usage:"`.
    /// Usage and error messages go to standard error until [`FlagSet::set_output`] says otherwise.
    pub fn new(name: impl Into<String>, error_handling: ErrorHandling) -> Self {
        Self {
            name: name.into(),
            error_handling,
            registry: Registry::default(),
            output: Output::console(),
        }
    }

    /// The name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The error handling policy given at construction.
    pub fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    /// Redirect usage and error messages.
    pub fn set_output(&mut self, output: impl Write + 'a) {
        self.output = Output::new(output);
    }

    /// Register a flag backed by any [`Value`].
    ///
    /// Flag names must be unique.
    /// Registering a name twice keeps the first flag, and the following [`FlagSet::parse`] fails with
    /// [`FlagError::Config`]; [`FlagSet::config_error`] reports it right away.
    pub fn var(&mut self, value: impl Value + 'a, name: impl Into<String>, usage: impl Into<String>) {
        self.registry
            .register(name.into(), usage.into(), Box::new(value));
    }

    /// Register an optional flag of type `T`, returning its storage.
    pub fn optional<T: FlagType + 'a>(
        &mut self,
        name: impl Into<String>,
        example: T,
        usage: impl Into<String>,
    ) -> Handle<Option<T>> {
        let (optional, handle) = Optional::shared(example.render());
        self.var(optional, name, usage);
        handle
    }

    /// Register an optional flag of type `T` over `variable`.
    /// The variable is reset to `None`.
    pub fn optional_var<T: FlagType + 'a>(
        &mut self,
        variable: &'a mut Option<T>,
        name: impl Into<String>,
        example: T,
        usage: impl Into<String>,
    ) {
        self.var(Optional::new(variable, example.render()), name, usage);
    }

    /// Register a direct flag of type `T`, returning its storage.
    pub fn scalar<T: FlagType + Default + 'a>(
        &mut self,
        name: impl Into<String>,
        example: T,
        usage: impl Into<String>,
    ) -> Handle<T> {
        let (scalar, handle) = Scalar::shared(example.render());
        self.var(scalar, name, usage);
        handle
    }

    /// Register a direct flag of type `T` over `variable`.
    /// The variable is reset to `T::default()`.
    pub fn scalar_var<T: FlagType + Default + 'a>(
        &mut self,
        variable: &'a mut T,
        name: impl Into<String>,
        example: T,
        usage: impl Into<String>,
    ) {
        self.var(Scalar::new(variable, example.render()), name, usage);
    }

    /// Parse the `tokens` (not including the program name) against the registered flags.
    ///
    /// Flags are written `-name`, `-name=value` or `-name value` (`--` works just as well as `-`).
    /// Boolean flags accept a bare `-name`, meaning `-name=true`; to turn one off write `-name=false`.
    /// Parsing stops before the first non-flag token, or just after `--`; whatever remains is available
    /// via [`FlagSet::args`].
    ///
    /// On failure the error and the usage are written to the output, after which the [`ErrorHandling`] policy
    /// applies.
    /// A `-h`/`-help` that isn't registered as a flag prints the usage and fails with [`FlagError::Help`].
    pub fn parse(&mut self, tokens: &[&str]) -> Result<(), FlagError> {
        match self.registry.parse(tokens) {
            Ok(()) => Ok(()),
            Err(error) => {
                if !matches!(error, FlagError::Help) {
                    self.output.print(&error.to_string());
                }

                self.usage();
                self.handle(error)
            }
        }
    }

    /// Parse the Cli [`env::args`], skipping the program name.
    /// See [`FlagSet::parse`].
    pub fn parse_env(&mut self) -> Result<(), FlagError> {
        let command_input: Vec<String> = env::args().skip(1).collect();
        self.parse(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        )
    }

    fn handle(&self, error: FlagError) -> Result<(), FlagError> {
        match self.error_handling {
            ErrorHandling::ContinueOnError => Err(error),
            ErrorHandling::ExitOnError => {
                let code = if matches!(error, FlagError::Help) { 0 } else { 2 };

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Exiting with {code} after: {error}.");
                }

                std::process::exit(code);
            }
            ErrorHandling::PanicOnError => panic!("{error}"),
        }
    }

    /// Write the usage to the output.
    ///
    /// The usage lists every flag in name order, along with its usage text and example:
    /// ```text
    /// Usage of program:
    ///   -name string
    ///     	who to greet (example "bob")
    ///   -v	be verbose (example false)
    /// ```
    /// The placeholder after the name is the first back-quoted word of the usage text (here none), falling back
    /// to the flag's type: `string`, `int`, `uint`, `float` or `duration`, and nothing for `bool`.
    /// Custom [`Value`]s print their [`Value::type_hint`], which defaults to `value`.
    pub fn usage(&mut self) {
        Printer::new(self.name.clone()).print_usage(self.registry.flags(), &mut self.output);
    }

    /// Set a flag as if `-name=value` had been parsed.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        self.registry.set(name, value)
    }

    /// The first registration problem (ex: a name registered twice), if any.
    /// While this is `Some`, every [`FlagSet::parse`] fails with it.
    pub fn config_error(&self) -> Option<&ConfigError> {
        self.registry.config_error()
    }

    /// Whether [`FlagSet::parse`] has been called.
    pub fn parsed(&self) -> bool {
        self.registry.parsed()
    }

    /// The tokens remaining after the flags were parsed.
    pub fn args(&self) -> &[String] {
        self.registry.args()
    }

    /// The number of tokens remaining after the flags were parsed.
    pub fn n_arg(&self) -> usize {
        self.registry.args().len()
    }

    /// The `i`'th token remaining after the flags were parsed.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.registry.args().get(i).map(String::as_str)
    }

    /// The number of flags that have been set.
    pub fn n_flag(&self) -> usize {
        self.registry.actual().count()
    }

    /// Whether the flag `name` has been set.
    pub fn is_set(&self, name: &str) -> bool {
        self.registry.is_set(name)
    }

    /// Find the flag registered as `name`.
    pub fn lookup(&self, name: &str) -> Option<&Flag<'a>> {
        self.registry.lookup(name)
    }

    /// Visit the flags that have been set, in name order.
    pub fn visit(&self, f: impl FnMut(&Flag<'a>)) {
        self.registry.actual().for_each(f);
    }

    /// Visit every flag, in name order.
    pub fn visit_all(&self, f: impl FnMut(&Flag<'a>)) {
        self.registry.flags().for_each(f);
    }
}

// One registration method per (type, style, storage) combination, each a thin front for the generic methods.
macro_rules! typed_flags {
    ($(($label:literal, $t:ty, $example:ty, $optional:ident, $optional_var:ident, $direct:ident, $direct_var:ident)),* $(,)?) => {
        impl<'a> FlagSet<'a> {
            $(
                #[doc = concat!("Register an optional `", $label, "` flag, returning a handle that stays `None` unless the flag is supplied.")]
                pub fn $optional(&mut self, name: &str, example: $example, usage: &str) -> Handle<Option<$t>> {
                    self.optional::<$t>(name, example.into(), usage)
                }

                #[doc = concat!("Register an optional `", $label, "` flag over `variable`, which stays `None` unless the flag is supplied.")]
                pub fn $optional_var(&mut self, variable: &'a mut Option<$t>, name: &str, example: $example, usage: &str) {
                    self.optional_var::<$t>(variable, name, example.into(), usage);
                }

                #[doc = concat!("Register a `", $label, "` flag, returning a handle that holds the zero value unless the flag is supplied.")]
                pub fn $direct(&mut self, name: &str, example: $example, usage: &str) -> Handle<$t> {
                    self.scalar::<$t>(name, example.into(), usage)
                }

                #[doc = concat!("Register a `", $label, "` flag over `variable`, which holds the zero value unless the flag is supplied.")]
                pub fn $direct_var(&mut self, variable: &'a mut $t, name: &str, example: $example, usage: &str) {
                    self.scalar_var::<$t>(variable, name, example.into(), usage);
                }
            )*
        }
    };
}

typed_flags!(
    ("string", String, &str, optional_string, optional_string_var, string, string_var),
    ("bool", bool, bool, optional_bool, optional_bool_var, bool, bool_var),
    ("int", i32, i32, optional_int, optional_int_var, int, int_var),
    ("int64", i64, i64, optional_int64, optional_int64_var, int64, int64_var),
    ("uint", u32, u32, optional_uint, optional_uint_var, uint, uint_var),
    ("uint64", u64, u64, optional_uint64, optional_uint64_var, uint64, uint64_var),
    ("float64", f64, f64, optional_float64, optional_float64_var, float64, float64_var),
    ("duration", Duration, Duration, optional_duration, optional_duration_var, duration, duration_var),
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Primitive;
    use crate::parser::test::BlackHole;
    use crate::parser::util::InMemoryInterface;
    use crate::test::assert_contains;
    use rstest::rstest;

    fn flag_set<'a>(name: &str) -> (FlagSet<'a>, InMemoryInterface) {
        let interface = InMemoryInterface::default();
        let mut flags = FlagSet::new(name, ErrorHandling::ContinueOnError);
        flags.set_output(interface.clone());
        (flags, interface)
    }

    #[test]
    fn unset_optionals_stay_none() {
        let (mut flags, interface) = flag_set("program");
        let s = flags.optional_string("s", "example", "");
        let b = flags.optional_bool("b", true, "");
        let i = flags.optional_int("i", 1, "");
        let long = flags.optional_int64("i64", 1, "");
        let u = flags.optional_uint("u", 1, "");
        let ulong = flags.optional_uint64("u64", 1, "");
        let f = flags.optional_float64("f", 1.0, "");
        let d = flags.optional_duration("d", Duration::from_secs(1), "");

        flags.parse(empty::slice()).unwrap();

        assert_eq!(s.get(), None);
        assert_eq!(b.get(), None);
        assert_eq!(i.get(), None);
        assert_eq!(long.get(), None);
        assert_eq!(u.get(), None);
        assert_eq!(ulong.get(), None);
        assert_eq!(f.get(), None);
        assert_eq!(d.get(), None);
        assert_eq!(flags.n_flag(), 0);
        assert_eq!(interface.consume(), "");
    }

    #[test]
    fn optionals_set() {
        let (mut flags, _) = flag_set("program");
        let s = flags.optional_string("s", "example", "");
        let b = flags.optional_bool("b", true, "");
        let i = flags.optional_int("i", 1, "");
        let long = flags.optional_int64("i64", 1, "");
        let u = flags.optional_uint("u", 1, "");
        let ulong = flags.optional_uint64("u64", 1, "");
        let f = flags.optional_float64("f", 1.0, "");
        let d = flags.optional_duration("d", Duration::from_secs(1), "");

        flags
            .parse(
                vec![
                    "-s=", "-b=false", "-i", "0", "-i64=-9", "-u=0", "-u64", "7", "-f=0", "-d=300ms",
                ]
                .as_slice(),
            )
            .unwrap();

        assert_eq!(s.get(), Some("".to_string()));
        assert_eq!(b.get(), Some(false));
        assert_eq!(i.get(), Some(0));
        assert_eq!(long.get(), Some(-9));
        assert_eq!(u.get(), Some(0));
        assert_eq!(ulong.get(), Some(7));
        assert_eq!(f.get(), Some(0.0));
        assert_eq!(d.get(), Some(Duration::from_millis(300)));
        assert_eq!(flags.n_flag(), 8);
    }

    #[test]
    fn optional_vars() {
        let mut s: Option<String> = None;
        let mut b: Option<bool> = None;
        let mut d: Option<Duration> = Some(Duration::from_secs(5));

        {
            let (mut flags, _) = flag_set("");
            flags.optional_string_var(&mut s, "s", "example", "");
            flags.optional_bool_var(&mut b, "b", false, "");
            flags.optional_duration_var(&mut d, "d", Duration::from_secs(30), "");
            flags.parse(vec!["-s", "hello", "-b"].as_slice()).unwrap();
        }

        assert_eq!(s, Some("hello".to_string()));
        assert_eq!(b, Some(true));
        assert_eq!(d, None);
    }

    #[rstest]
    #[case(vec![], "")]
    #[case(vec!["-name="], "")]
    #[case(vec!["-name=foo"], "foo")]
    fn direct_string(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        let (mut flags, _) = flag_set("program");
        let name = flags.string("name", "example", "a name");
        flags.parse(tokens.as_slice()).unwrap();
        assert_eq!(name.get(), expected);
    }

    #[test]
    fn direct_vars() {
        let mut s = "stale".to_string();
        let mut b = true;
        let mut i: i32 = 4;
        let mut long: i64 = 4;
        let mut u: u32 = 4;
        let mut ulong: u64 = 4;
        let mut f: f64 = 4.0;
        let mut d = Duration::from_secs(4);

        {
            let (mut flags, _) = flag_set("program");
            flags.string_var(&mut s, "s", "x", "");
            flags.bool_var(&mut b, "b", true, "");
            flags.int_var(&mut i, "i", 1, "");
            flags.int64_var(&mut long, "i64", 1, "");
            flags.uint_var(&mut u, "u", 1, "");
            flags.uint64_var(&mut ulong, "u64", 1, "");
            flags.float64_var(&mut f, "f", 1.0, "");
            flags.duration_var(&mut d, "d", Duration::from_secs(1), "");
            flags
                .parse(vec!["-i=-3", "-u64=18446744073709551615", "-d=1h30m"].as_slice())
                .unwrap();
        }

        assert_eq!(s, "");
        assert!(!b);
        assert_eq!(i, -3);
        assert_eq!(long, 0);
        assert_eq!(u, 0);
        assert_eq!(ulong, u64::MAX);
        assert_eq!(f, 0.0);
        assert_eq!(d, Duration::from_secs(90 * 60));
    }

    #[test]
    fn direct_handles() {
        let (mut flags, _) = flag_set("program");
        let b = flags.bool("b", false, "");
        let i = flags.int("i", 1, "");
        let long = flags.int64("i64", 1, "");
        let u = flags.uint("u", 1, "");
        let ulong = flags.uint64("u64", 1, "");
        let f = flags.float64("f", 1.0, "");
        let d = flags.duration("d", Duration::from_secs(1), "");

        flags
            .parse(vec!["-b", "-i=2", "-i64=3", "-u=4", "-u64=5", "-f=6.5", "-d=7s"].as_slice())
            .unwrap();

        assert!(b.get());
        assert_eq!(i.get(), 2);
        assert_eq!(long.get(), 3);
        assert_eq!(u.get(), 4);
        assert_eq!(ulong.get(), 5);
        assert_eq!(f.get(), 6.5);
        assert_eq!(d.get(), Duration::from_secs(7));
    }

    #[test]
    fn failure_keeps_previous_value() {
        let (mut flags, interface) = flag_set("program");
        let count = flags.optional_int("count", 0, "how many");

        flags.parse(vec!["-count=5"].as_slice()).unwrap();
        let error = flags.parse(vec!["-count=five"].as_slice()).unwrap_err();

        assert_matches!(error, FlagError::InvalidValue { .. });
        assert_eq!(count.get(), Some(5));
        let message = interface.consume();
        assert_contains!(message, "invalid value \"five\" for flag -count: cannot convert 'five' to i32\n");
        assert_contains!(message, "Usage of program:\n");
    }

    #[test]
    fn bare_bool_is_true() {
        let (mut flags, _) = flag_set("program");
        let bare = flags.optional_bool("bare", false, "");
        let explicit = flags.optional_bool("explicit", false, "");
        flags
            .parse(vec!["-bare", "-explicit=true"].as_slice())
            .unwrap();
        assert_eq!(bare.get(), explicit.get());
        assert_eq!(bare.get(), Some(true));
    }

    #[test]
    fn help() {
        let (mut flags, interface) = flag_set("program");
        flags.optional_string("name", "bob", "who to greet");

        let error = flags.parse(vec!["-help"].as_slice()).unwrap_err();

        assert_matches!(error, FlagError::Help);
        assert_eq!(
            interface.consume(),
            "Usage of program:\n  -name string\n    \twho to greet (example \"bob\")\n"
        );
    }

    #[test]
    fn not_defined() {
        let (mut flags, interface) = flag_set("");
        flags.optional_int("n", 3, "a `number`");

        let error = flags.parse(vec!["-m=1"].as_slice()).unwrap_err();

        assert_matches!(error, FlagError::NotDefined(_));
        assert_eq!(
            interface.consume(),
            "flag provided but not defined: -m\nUsage:\n  -n number\n    \ta number (example 3)\n"
        );
    }

    #[test]
    fn duplicate() {
        let (mut flags, interface) = flag_set("program");
        let first = flags.optional_int("n", 1, "first");
        assert_eq!(flags.config_error(), None);
        let second = flags.optional_string("n", "x", "second");
        assert_matches!(flags.config_error(), Some(error) if error.to_string() == "Config error: flag redefined: n");

        let error = flags.parse(vec!["-n=2"].as_slice()).unwrap_err();

        assert_matches!(error, FlagError::Config(_));
        assert_contains!(interface.consume(), "Config error: flag redefined: n\n");
        assert_eq!(flags.lookup("n").unwrap().usage(), "first");
        assert_eq!(first.get(), None);
        assert_eq!(second.get(), None);
        flags.set("n", "2").unwrap();
        assert_eq!(first.get(), Some(2));
    }

    #[test]
    #[should_panic]
    fn parse_while_borrowed() {
        let (mut flags, _) = flag_set("program");
        let name = flags.optional_string("name", "bob", "");
        let _held = name.borrow();
        let _ = flags.parse(vec!["-name=alice"].as_slice());
    }

    #[test]
    #[should_panic(expected = "flag provided but not defined: -x")]
    fn panic_on_error() {
        let mut flags = FlagSet::new("program", ErrorHandling::PanicOnError);
        flags.set_output(InMemoryInterface::default());
        let _ = flags.parse(vec!["-x"].as_slice());
    }

    #[test]
    fn args() {
        let (mut flags, _) = flag_set("program");
        flags.optional_bool("v", false, "");
        flags
            .parse(vec!["-v", "one", "-two"].as_slice())
            .unwrap();
        assert!(flags.parsed());
        assert_eq!(flags.n_arg(), 2);
        assert_eq!(flags.arg(0), Some("one"));
        assert_eq!(flags.arg(1), Some("-two"));
        assert_eq!(flags.arg(2), None);
    }

    #[test]
    fn introspection() {
        let (mut flags, _) = flag_set("program");
        flags.optional_uint64("count", 0, "how many");
        flags.string("name", "bob", "who");
        flags.var(BlackHole::default(), "other", "anything");
        assert!(!flags.parsed());

        flags.parse(vec!["-count=3"].as_slice()).unwrap();

        let count = flags.lookup("count").unwrap();
        assert_eq!(count.name(), "count");
        assert_eq!(count.example(), "0");
        assert_eq!(count.value().get(), Some(Primitive::Uint64(3)));
        assert_eq!(
            flags.lookup("name").unwrap().value().get(),
            Some(Primitive::Str("".to_string()))
        );
        assert_eq!(flags.lookup("other").unwrap().value().get(), None);
        assert!(flags.lookup("missing").is_none());
        assert!(flags.is_set("count"));
        assert!(!flags.is_set("name"));

        let mut set = Vec::default();
        flags.visit(|flag| set.push(flag.name().to_string()));
        assert_eq!(set, vec!["count"]);

        let mut all = Vec::default();
        flags.visit_all(|flag| all.push(flag.name().to_string()));
        assert_eq!(all, vec!["count", "name", "other"]);
    }

    #[test]
    fn examples_render_verbatim() {
        let (mut flags, _) = flag_set("program");
        flags.optional_string("s", " spaced ", "");
        flags.bool("b", true, "");
        flags.optional_int("i", -1, "");
        flags.int64("i64", i64::MIN, "");
        flags.optional_uint("u", u32::MAX, "");
        flags.uint64("u64", u64::MAX, "");
        flags.optional_float64("f", 0.125, "");
        flags.duration("d", Duration::from_secs(30), "");

        let mut examples = Vec::default();
        flags.visit_all(|flag| examples.push((flag.name().to_string(), flag.example())));

        assert_eq!(
            examples,
            vec![
                ("b".to_string(), "true".to_string()),
                ("d".to_string(), "30s".to_string()),
                ("f".to_string(), "0.125".to_string()),
                ("i".to_string(), "-1".to_string()),
                ("i64".to_string(), "-9223372036854775808".to_string()),
                ("s".to_string(), " spaced ".to_string()),
                ("u".to_string(), "4294967295".to_string()),
                ("u64".to_string(), "18446744073709551615".to_string()),
            ]
        );
    }

    #[test]
    fn accessors() {
        let flags = FlagSet::new("program", ErrorHandling::ExitOnError);
        assert_eq!(flags.name(), "program");
        assert_eq!(flags.error_handling(), ErrorHandling::ExitOnError);
    }
}
