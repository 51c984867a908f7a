// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Procedural macros for yutils utilities.
#![deny(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;

/// Defines the entry point of a yutils utility.
///
/// Wraps a `yumain(args) -> UResult<()>` into a `uumain(args) -> i32`
/// suitable for `yucore::bin!`: the terminal error is printed through
/// `show_error!` and mapped to an exit code.
#[proc_macro_attribute]
pub fn main(_args: TokenStream, stream: TokenStream) -> TokenStream {
    let stream = proc_macro2::TokenStream::from(stream);

    let new = quote!(
        pub fn uumain(args: impl yucore::Args) -> i32 {
            #stream

            // disable rust signal handlers (otherwise processes don't dump core after e.g. one SIGSEGV)
            #[cfg(unix)]
            yucore::disable_rust_signal_handlers().expect("Disabling rust signal handlers failed");
            let result = yumain(args);
            match result {
                Ok(()) => yucore::error::get_exit_code(),
                Err(e) => {
                    let s = format!("{e}");
                    if s != "" {
                        yucore::show_error!("{s}");
                    }
                    if e.usage() {
                        eprintln!("Try '{} --help' for more information.", yucore::execution_phrase());
                    }
                    e.code()
                }
            }
        }
    );

    TokenStream::from(new)
}
