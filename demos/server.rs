use nodefflag::{ErrorHandling, FlagSet};
use std::time::Duration;

fn main() {
    let mut flags = FlagSet::new("server", ErrorHandling::ExitOnError);
    let host = flags.optional_string("host", "localhost", "the `address` to bind");
    let port = flags.optional_uint("port", 8080, "port to listen on");
    let timeout = flags.optional_duration("timeout", Duration::from_secs(30), "request timeout");
    let verbose = flags.bool("v", false, "log every request");

    // ExitOnError: never returns an error.
    let _ = flags.parse_env();

    match host.get() {
        Some(host) => println!("host: {host}"),
        None => println!("host: not set, binding every interface"),
    }

    match port.get() {
        Some(port) => println!("port: {port}"),
        None => println!("port: not set, picking one"),
    }

    match timeout.get() {
        Some(timeout) => println!("timeout: {timeout:?}"),
        None => println!("timeout: none"),
    }

    println!("verbose: {}", verbose.get());
    println!("remaining: {:?}", flags.args());
}
