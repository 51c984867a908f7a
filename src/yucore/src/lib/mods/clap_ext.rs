// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Bridges clap's argument parsing into the [`UResult`] world.

use clap::error::ErrorKind;
use clap::{ArgMatches, Command};

use crate::error::{ExitCode, UResult};

/// Parses `args` with `app`, letting clap render its own output.
///
/// `--help` and `--version` print to stdout and exit 0; parse errors
/// print clap's diagnostic to stderr and exit 1, the status the GNU
/// tools use for bad usage.
pub fn handle_clap_result(app: Command, args: impl crate::Args) -> UResult<ArgMatches> {
    app.try_get_matches_from(args).map_err(|e| {
        let code = match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        };
        let _ = e.print();
        ExitCode::new(code)
    })
}
