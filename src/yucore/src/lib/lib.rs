// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Shared runtime for the yutils binaries: entry-point plumbing, error
//! types, diagnostics, and the feature-gated helper modules the
//! individual utilities opt into.

pub use yucore_procs::main;

#[macro_use]
mod macros;

mod features;
mod mods;

pub use mods::clap_ext;
pub use mods::display;
pub use mods::error;
pub use mods::panic;

#[cfg(feature = "fast-inc")]
pub use features::fast_inc;
#[cfg(feature = "format")]
pub use features::format;

#[cfg(unix)]
pub use libc;

pub use clap::crate_version;

use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::error::UResult;

/// Iterator of command-line arguments handed to a utility entry point.
pub trait Args: Iterator<Item = OsString> + Sized {}

impl<T: Iterator<Item = OsString> + Sized> Args for T {}

/// The process arguments, with wildcard expansion where the platform
/// shell does not perform it (Windows).
pub fn args_os() -> impl Iterator<Item = OsString> {
    wild::args_os()
}

/// Name the utility was invoked as, used to prefix diagnostics.
pub fn util_name() -> String {
    std::env::args_os().next().map_or_else(
        || String::from("yutils"),
        |argv0| {
            Path::new(&argv0)
                .file_stem()
                .unwrap_or(argv0.as_os_str())
                .to_string_lossy()
                .into_owned()
        },
    )
}

/// The phrase to use when telling the user how the utility was invoked,
/// e.g. in `Try '<phrase> --help'` hints.
pub fn execution_phrase() -> String {
    util_name()
}

/// Expands `{}` in a usage template with the invocation phrase.
pub fn format_usage(s: &str) -> String {
    s.replace("{}", &execution_phrase())
}

/// Borrows the raw bytes of an [`OsStr`].
///
/// Infallible on unix; on other platforms non-UTF-8 arguments are
/// rejected because their byte representation is not portable.
pub fn os_str_as_bytes(os_string: &OsStr) -> UResult<&[u8]> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Ok(os_string.as_bytes())
    }
    #[cfg(not(unix))]
    {
        os_string
            .to_str()
            .map(str::as_bytes)
            .ok_or_else(|| {
                crate::error::USimpleError::new(1, "invalid (non-UTF-8) argument encountered")
            })
    }
}

/// Restores the default disposition of the signals the Rust runtime
/// overrides, so crashing utilities dump core like their C ancestors.
#[cfg(unix)]
pub fn disable_rust_signal_handlers() -> std::io::Result<()> {
    for sig in [libc::SIGSEGV, libc::SIGBUS] {
        // SAFETY: resetting a handler to SIG_DFL is async-signal-safe.
        if unsafe { libc::signal(sig, libc::SIG_DFL) } == libc::SIG_ERR {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}
