use nodefflag::{ErrorHandling, FlagSet};

fn main() {
    let mut bv: Option<bool> = None;
    let mut sv: Option<String> = None;
    let mut zv: String = String::default();

    let mut flags = FlagSet::new("zero_value", ErrorHandling::ExitOnError);
    flags.optional_bool_var(&mut bv, "bool", true, "this is a bool flag");
    flags.optional_string_var(&mut sv, "string", "Example", "this is a string flag");
    flags.string_var(&mut zv, "zero", "Example", "this string flag can't tell \"\" from not set");
    let _ = flags.parse_env();
    drop(flags);

    // -bool unset: None, -bool or -bool=true: Some(true), -bool=false: Some(false).
    println!("bool: {bv:?}");
    // -string unset: None, -string="": Some(""), -string=x: Some("x").
    println!("string: {sv:?}");
    // -zero unset or -zero="": "", -zero=x: "x".
    println!("zero: {zv:?}");
}
