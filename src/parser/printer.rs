use crate::api::Value;
use crate::parser::base::Flag;
use crate::parser::interface::Output;

// A flag line this short ("  -x") keeps its usage on the same line.
const INLINE_WIDTH: usize = 4;
const CONTINUATION: &str = "\n    \t";

pub(crate) struct Printer {
    program: String,
}

impl Printer {
    pub(crate) fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub(crate) fn print_usage<'f, 'a: 'f>(
        &self,
        flags: impl Iterator<Item = &'f Flag<'a>>,
        output: &mut Output,
    ) {
        output.print(&self.header());

        for flag in flags {
            output.print(&render_flag(flag));
        }
    }

    fn header(&self) -> String {
        if self.program.is_empty() {
            "Usage:".to_string()
        } else {
            format!("Usage of {}:", self.program)
        }
    }
}

/// Split a usage text into its value placeholder and the text to print.
///
/// The first back-quoted word is the placeholder (ex: "a `file` to read" gives `file`), and is printed without its quotes.
/// Without one, the placeholder comes from the flag's type.
pub(crate) fn unquote_usage(usage: &str, value: &dyn Value) -> (String, String) {
    if let Some(start) = usage.find('`') {
        if let Some(length) = usage[start + 1..].find('`') {
            let end = start + 1 + length;
            let hint = &usage[start + 1..end];
            let text = format!("{}{hint}{}", &usage[..start], &usage[end + 1..]);
            return (hint.to_string(), text);
        }
    }

    (value.type_hint().to_string(), usage.to_string())
}

fn render_flag(flag: &Flag) -> String {
    let (hint, usage) = unquote_usage(flag.usage(), flag.value());
    let mut line = format!("  -{}", flag.name());

    if !hint.is_empty() {
        line.push(' ');
        line.push_str(&hint);
    }

    if line.len() <= INLINE_WIDTH {
        line.push('\t');
    } else {
        line.push_str(CONTINUATION);
    }

    line.push_str(&usage.replace('\n', CONTINUATION));

    if flag.value().quote_example() {
        line.push_str(&format!(" (example {:?})", flag.example()));
    } else {
        line.push_str(&format!(" (example {})", flag.example()));
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Optional, Scalar};
    use crate::parser::base::Registry;
    use crate::parser::interface::util::InMemoryInterface;
    use std::time::Duration;

    #[test]
    fn unquote() {
        let (optional, _) = Optional::<String>::shared("");
        assert_eq!(
            unquote_usage("a `file` to read", &optional),
            ("file".to_string(), "a file to read".to_string())
        );
        assert_eq!(
            unquote_usage("a file to read", &optional),
            ("string".to_string(), "a file to read".to_string())
        );
        assert_eq!(
            unquote_usage("a `file to read", &optional),
            ("string".to_string(), "a `file to read".to_string())
        );
        assert_eq!(
            unquote_usage("``", &optional),
            ("".to_string(), "".to_string())
        );

        let (switch, _) = Scalar::<bool>::shared("false");
        assert_eq!(
            unquote_usage("be loud", &switch),
            ("".to_string(), "be loud".to_string())
        );
    }

    fn print(program: &str, registry: &Registry) -> String {
        let interface = InMemoryInterface::default();
        let mut output = Output::new(interface.clone());
        Printer::new(program).print_usage(registry.flags(), &mut output);
        interface.consume()
    }

    #[test]
    fn header() {
        let registry = Registry::default();
        assert_eq!(print("", &registry), "Usage:\n");
        assert_eq!(print("program", &registry), "Usage of program:\n");
    }

    #[test]
    fn lines() {
        let mut registry = Registry::default();
        let (name, _) = Optional::<String>::shared("bob");
        registry.register("name".to_string(), "who to greet".to_string(), Box::new(name));
        let (v, _) = Scalar::<bool>::shared("false");
        registry.register("v".to_string(), "be verbose".to_string(), Box::new(v));
        let (x, _) = Optional::<i64>::shared("0");
        registry.register("x".to_string(), "an offset".to_string(), Box::new(x));
        let (timeout, _) = Optional::<Duration>::shared("30s");
        registry.register(
            "timeout".to_string(),
            "how long to `wait`".to_string(),
            Box::new(timeout),
        );
        let (quiet, _) = Optional::<bool>::shared("true");
        registry.register("quiet".to_string(), "say less".to_string(), Box::new(quiet));

        assert_eq!(
            print("greeter", &registry),
            "Usage of greeter:\n\
             \x20 -name string\n    \twho to greet (example \"bob\")\n\
             \x20 -quiet\n    \tsay less (example true)\n\
             \x20 -timeout wait\n    \thow long to wait (example 30s)\n\
             \x20 -v\tbe verbose (example false)\n\
             \x20 -x int\n    \tan offset (example 0)\n"
        );
    }

    #[test]
    fn multi_line_usage() {
        let mut registry = Registry::default();
        let (count, _) = Optional::<u64>::shared("3");
        registry.register(
            "count".to_string(),
            "first line\nsecond line".to_string(),
            Box::new(count),
        );
        assert_eq!(
            print("", &registry),
            "Usage:\n  -count uint\n    \tfirst line\n    \tsecond line (example 3)\n"
        );
    }

    #[test]
    fn quoted_example_escapes() {
        let mut registry = Registry::default();
        let (s, _) = Scalar::<String>::shared("say \"hi\"");
        registry.register("s".to_string(), "greeting".to_string(), Box::new(s));
        assert_eq!(
            print("", &registry),
            "Usage:\n  -s string\n    \tgreeting (example \"say \\\"hi\\\"\")\n"
        );
    }
}
