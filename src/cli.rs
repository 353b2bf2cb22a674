//! Utility module for command line interfaces.

use std::{error::Error, fmt, fmt::Display, str::FromStr};

/// An error struct to wrap simple static error messages.
#[derive(Debug)]
pub struct CliErr(pub &'static str);

impl Display for CliErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Error for CliErr {}

/// Parses an optional positional argument, falling back to a default.
pub fn parse_arg_or<T: FromStr>(arg: Option<String>, default: T) -> Result<T, CliErr>
where
    T::Err: std::fmt::Debug,
{
    match arg {
        Some(value) => value.parse().map_err(|_| CliErr("could not parse argument")),
        None => Ok(default),
    }
}

/// Parses a thread-count argument where `max` means all available cores.
pub fn parse_num_threads(arg: Option<String>) -> Result<usize, CliErr> {
    match arg.as_deref() {
        None | Some("max") => Ok(std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)),
        Some(value) => value.parse().map_err(|_| CliErr("could not parse thread count")),
    }
}
