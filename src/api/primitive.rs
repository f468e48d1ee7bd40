use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use std::time::Duration;

use crate::api::capture::InvalidValue;
use crate::model::Primitive;

/// The textual grammar of a type that can back a flag.
///
/// Implemented for the eight primitive flag types: [`String`], [`bool`], [`i32`], [`i64`], [`u32`], [`u64`],
/// [`f64`] and [`Duration`].
pub trait FlagType: Sized {
    /// Name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Value placeholder shown in the usage.
    const HINT: &'static str;

    /// Whether a bare `-flag` means `-flag=true`.
    const IS_BOOL: bool = false;

    /// Whether the usage quotes the example text.
    const QUOTED: bool = false;

    /// Convert a command line token.
    fn parse(token: &str) -> Result<Self, InvalidValue>;

    /// Render a value the way it would be written on the command line.
    fn render(&self) -> String;

    /// Snapshot the value.
    fn primitive(&self) -> Primitive;
}

impl FlagType for String {
    const TYPE_NAME: &'static str = "string";
    const HINT: &'static str = "string";
    const QUOTED: bool = true;

    fn parse(token: &str) -> Result<Self, InvalidValue> {
        Ok(token.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Str(self.clone())
    }
}

impl FlagType for bool {
    const TYPE_NAME: &'static str = "bool";
    const HINT: &'static str = "";
    const IS_BOOL: bool = true;

    fn parse(token: &str) -> Result<Self, InvalidValue> {
        match token {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(InvalidValue::syntax(token, Self::TYPE_NAME)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Bool(*self)
    }
}

fn parse_integer<T>(token: &str, type_name: &'static str) -> Result<T, InvalidValue>
where
    T: FromStr<Err = ParseIntError>,
{
    T::from_str(token).map_err(|error| match error.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            InvalidValue::range(token, type_name)
        }
        _ => InvalidValue::syntax(token, type_name),
    })
}

// Unsigned tokens never carry a sign, not even '+'.
fn parse_unsigned(token: &str, type_name: &'static str) -> Result<u64, InvalidValue> {
    if token.starts_with('+') {
        return Err(InvalidValue::syntax(token, type_name));
    }

    parse_integer::<u64>(token, type_name)
}

impl FlagType for i32 {
    const TYPE_NAME: &'static str = "i32";
    const HINT: &'static str = "int";

    fn parse(token: &str) -> Result<Self, InvalidValue> {
        parse_integer(token, Self::TYPE_NAME)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Int(*self)
    }
}

impl FlagType for i64 {
    const TYPE_NAME: &'static str = "i64";
    const HINT: &'static str = "int";

    fn parse(token: &str) -> Result<Self, InvalidValue> {
        parse_integer(token, Self::TYPE_NAME)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Int64(*self)
    }
}

impl FlagType for u32 {
    const TYPE_NAME: &'static str = "u32";
    const HINT: &'static str = "uint";

    fn parse(token: &str) -> Result<Self, InvalidValue> {
        // Parsed at full width first, the narrowing is range checked rather than truncated.
        let wide = parse_unsigned(token, Self::TYPE_NAME)?;
        u32::try_from(wide).map_err(|_| InvalidValue::range(token, Self::TYPE_NAME))
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Uint(*self)
    }
}

impl FlagType for u64 {
    const TYPE_NAME: &'static str = "u64";
    const HINT: &'static str = "uint";

    fn parse(token: &str) -> Result<Self, InvalidValue> {
        parse_unsigned(token, Self::TYPE_NAME)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Uint64(*self)
    }
}

impl FlagType for f64 {
    const TYPE_NAME: &'static str = "f64";
    const HINT: &'static str = "float";

    fn parse(token: &str) -> Result<Self, InvalidValue> {
        let value =
            f64::from_str(token).map_err(|_| InvalidValue::syntax(token, Self::TYPE_NAME))?;

        if value.is_infinite() && !is_infinity_literal(token) {
            return Err(InvalidValue::range(token, Self::TYPE_NAME));
        }

        Ok(value)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Float64(*self)
    }
}

fn is_infinity_literal(token: &str) -> bool {
    let unsigned = token
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(token);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

impl FlagType for Duration {
    const TYPE_NAME: &'static str = "duration";
    const HINT: &'static str = "duration";

    fn parse(token: &str) -> Result<Self, InvalidValue> {
        let (negative, literal) = canonical_duration(token)?;
        let duration = parse_duration::parse(&literal).map_err(|error| match error {
            parse_duration::parse::Error::OutOfBounds(_) => {
                InvalidValue::range(token, Self::TYPE_NAME)
            }
            _ => InvalidValue::syntax(token, Self::TYPE_NAME),
        })?;

        // Well formed, but a Duration cannot go below zero.
        if negative && !duration.is_zero() {
            return Err(InvalidValue::range(token, Self::TYPE_NAME));
        }

        Ok(duration)
    }

    fn render(&self) -> String {
        format_duration(self)
    }

    fn primitive(&self) -> Primitive {
        Primitive::Duration(*self)
    }
}

// Integer parts longer than this overflow a Duration in any unit.
const DURATION_WHOLE_DIGITS: usize = 30;
// Fraction digits past this are below a nanosecond, even in hours.
const DURATION_FRACTION_DIGITS: usize = 18;

/// Check `token` against the duration literal grammar and rewrite it for [`parse_duration::parse`].
///
/// A literal is an optional sign followed by one or more `<whole>[.<fraction>]<unit>` groups (ex: `1h30m`, `.5s`),
/// where the unit is one of `ns`, `us` (or `µs`), `ms`, `s`, `m` or `h`; a bare `0` is also allowed.
/// Everything else (unitless numbers, spaces, exponents, days) is a syntax error.
///
/// Returns whether the literal is negative, and the unsigned groups normalized to `<whole>[.<fraction>]<unit>`.
fn canonical_duration(token: &str) -> Result<(bool, String), InvalidValue> {
    let type_name = <Duration as FlagType>::TYPE_NAME;
    let syntax = || InvalidValue::syntax(token, type_name);
    let (negative, mut rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };

    if rest == "0" {
        return Ok((negative, "0s".to_string()));
    }

    if rest.is_empty() {
        return Err(syntax());
    }

    let mut literal = String::default();

    while !rest.is_empty() {
        let (whole, tail) = split_digits(rest);
        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(tail) => split_digits(tail),
            None => ("", tail),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(syntax());
        }

        let unit_length = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_length);
        let unit = match unit {
            "ns" => "ns",
            "us" | "\u{b5}s" | "\u{3bc}s" => "us",
            "ms" => "ms",
            "s" => "s",
            "m" => "m",
            "h" => "h",
            _ => return Err(syntax()),
        };

        let whole = whole.trim_start_matches('0');

        if whole.len() > DURATION_WHOLE_DIGITS {
            return Err(InvalidValue::range(token, type_name));
        }

        literal.push_str(if whole.is_empty() { "0" } else { whole });
        let fraction =
            fraction[..fraction.len().min(DURATION_FRACTION_DIGITS)].trim_end_matches('0');

        if !fraction.is_empty() {
            literal.push('.');
            literal.push_str(fraction);
        }

        literal.push_str(unit);
        rest = tail;
    }

    Ok((negative, literal))
}

fn split_digits(text: &str) -> (&str, &str) {
    let length = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text.split_at(length)
}

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Render a duration as hours, minutes and (fractional) seconds, ex: `1h30m0s`, `1.5s`.
/// Durations under a second use the largest fitting sub-second unit, ex: `300ms`, `1.5µs`, `7ns`.
pub(crate) fn format_duration(duration: &Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }

    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", decimal(nanos, NANOS_PER_MICRO, 3));
    }

    if nanos < NANOS_PER_SECOND {
        return format!("{}ms", decimal(nanos, NANOS_PER_MILLI, 6));
    }

    let seconds = duration.as_secs();
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remainder =
        u128::from(seconds % 60) * NANOS_PER_SECOND + u128::from(duration.subsec_nanos());
    let mut out = String::default();

    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }

    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }

    out.push_str(&format!("{}s", decimal(remainder, NANOS_PER_SECOND, 9)));
    out
}

fn decimal(value: u128, scale: u128, digits: usize) -> String {
    let whole = value / scale;
    let fraction = value % scale;

    if fraction == 0 {
        whole.to_string()
    } else {
        let fraction = format!("{fraction:0digits$}");
        format!("{whole}.{}", fraction.trim_end_matches('0'))
    }
}
