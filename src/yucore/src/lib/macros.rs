// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Macros shared by all utilities.

/// Prints a diagnostic to standard error, prefixed with the utility name.
#[macro_export]
macro_rules! show_error {
    ($($args:tt)+) => ({
        eprint!("{}: ", $crate::util_name());
        eprintln!($($args)+);
    });
}

/// Generates the `main` function of a utility binary from its library
/// crate's `uumain` entry point.
#[macro_export]
macro_rules! bin {
    ($util:ident) => {
        pub fn main() {
            use std::io::Write;
            $crate::panic::mute_sigpipe_panic();
            let code = $util::uumain($crate::args_os());
            // stdout is line- or block-buffered; a close failure is a write failure
            if let Err(e) = std::io::stdout().flush() {
                eprintln!("{}: write error: {e}", $crate::util_name());
                std::process::exit(1);
            }
            std::process::exit(code);
        }
    };
}
