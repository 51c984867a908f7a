// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use clap::builder::ValueParser;
use clap::{Arg, ArgAction, Command};
use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, StdoutLock, Write};
use yucore::error::UResult;
use yucore::format::{FormatChar, OctalParsing, parse_escape_only};
use yucore::{format_usage, os_str_as_bytes};

const ABOUT: &str = "Display a line of text";
const USAGE: &str = "{} [SHORT-OPTION]... [STRING]...";
const AFTER_HELP: &str = "\
If -e is in effect, the following sequences are recognized:

  \\\\      backslash
  \\a      alert (BEL)
  \\b      backspace
  \\c      produce no further output
  \\e      escape
  \\f      form feed
  \\n      new line
  \\r      carriage return
  \\t      horizontal tab
  \\v      vertical tab
  \\0NNN   byte with octal value NNN (1 to 3 digits)
  \\xHH    byte with hexadecimal value HH (1 to 2 digits)";

mod options {
    pub const STRING: &str = "STRING";
    pub const NO_NEWLINE: &str = "no_newline";
    pub const ENABLE_BACKSLASH_ESCAPE: &str = "enable_backslash_escape";
    pub const DISABLE_BACKSLASH_ESCAPE: &str = "disable_backslash_escape";
}

/// Options for the echo command.
#[derive(Debug, Clone, Copy)]
struct Options {
    /// Whether the output should have a trailing newline.
    ///
    /// True by default. `-n` disables it.
    trailing_newline: bool,

    /// Whether given string literals should be parsed for
    /// escape characters.
    ///
    /// Off by default unless the `xpg-echo` build flavor turned it on;
    /// `-e` enables it. Always true under `POSIXLY_CORRECT` (cannot be
    /// disabled with `-E`).
    escape: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            trailing_newline: true,
            escape: cfg!(feature = "xpg-echo"),
        }
    }
}

impl Options {
    fn posixly_correct_default() -> Self {
        Self {
            trailing_newline: true,
            escape: true,
        }
    }
}

/// Checks if an argument is a valid echo flag, and if
/// it is records the changes in [`Options`].
fn is_flag(arg: &OsStr, options: &mut Options) -> bool {
    let arg = arg.as_encoded_bytes();

    if arg.first() != Some(&b'-') || arg == b"-" {
        // Argument doesn't start with '-' or is '-' => not a flag.
        return false;
    }

    // We don't modify the given options until after
    // the loop because there is a chance the flag isn't
    // valid after all & shouldn't affect the options.
    let mut options_: Options = *options;

    // Skip the '-' when processing characters.
    for c in &arg[1..] {
        match c {
            b'e' => options_.escape = true,
            b'E' => options_.escape = false,
            b'n' => options_.trailing_newline = false,

            // If there is any character in an supposed flag
            // that is not a valid flag character, it is not
            // a flag.
            //
            // "-eeEnEe" => is a flag.
            // "-eeBne" => not a flag, short circuit at the B.
            _ => return false,
        }
    }

    // We are now sure that the argument is a
    // flag, and can apply the modified options.
    *options = options_;
    true
}

/// Processes command line arguments, separating flags from normal arguments.
///
/// # Returns
///
/// - Vector of non-flag arguments.
/// - [`Options`], describing how the arguments should be interpreted.
fn filter_flags(mut args: impl Iterator<Item = OsString>) -> (Vec<OsString>, Options) {
    let mut arguments = Vec::with_capacity(args.size_hint().0);
    let mut options = Options::default();

    // Process arguments until first non-flag is found.
    for arg in &mut args {
        // We parse flags and aggregate the options in `options`.
        // First call to `is_flag` to return false will break the loop.
        if !is_flag(&arg, &mut options) {
            // Not a flag. Can break out of flag-processing loop.
            // Don't forget to push it to the arguments too.
            arguments.push(arg);
            break;
        }
    }

    // Collect remaining non-flag arguments.
    arguments.extend(args);

    (arguments, options)
}

#[yucore::main]
pub fn yumain(args: impl yucore::Args) -> UResult<()> {
    // args[0] is the name of the binary.
    let args: Vec<OsString> = args.skip(1).collect();

    // From the GNU manual, on what POSIXLY_CORRECT should do:
    //
    // > If the POSIXLY_CORRECT environment variable is set, then when
    // > echo's first argument is not -n it outputs option-like arguments
    // > instead of treating them as options. For example, echo -ne hello
    // > outputs '-ne hello' instead of plain 'hello'. Also backslash
    // > escapes are always enabled.
    let is_posixly_correct = env::var_os("POSIXLY_CORRECT").is_some();

    let (args, options) = if is_posixly_correct {
        if !cfg!(feature = "xpg-echo") && args.first().is_some_and(|arg| arg == "-n") {
            // if POSIXLY_CORRECT is set and the first argument is the "-n" flag
            // we filter flags normally but 'escape' is activated nonetheless.
            let (args, _) = filter_flags(args.into_iter());
            (
                args,
                Options {
                    trailing_newline: false,
                    ..Options::posixly_correct_default()
                },
            )
        } else {
            // if POSIXLY_CORRECT is set and the first argument is not the "-n" flag
            // we just collect all arguments as no arguments are interpreted as flags.
            (args, Options::posixly_correct_default())
        }
    } else if args.len() == 1 && args[0] == "--help" {
        // If POSIXLY_CORRECT is not set and the only argument
        // is `--help`, print the help message; a later position
        // would make it ordinary text.
        uu_app().print_help()?;
        return Ok(());
    } else if args.len() == 1 && args[0] == "--version" {
        print!("{}", uu_app().render_version());
        return Ok(());
    } else {
        // if POSIXLY_CORRECT is not set we filter the flags normally
        filter_flags(args.into_iter())
    };

    execute(&mut io::stdout().lock(), args, options)?;

    Ok(())
}

pub fn uu_app() -> Command {
    // Note: echo is different from the other utils in that it should **not**
    // have `infer_long_args(true)`, because, for example, `--ver` should be
    // printed as `--ver` and not show the version text.
    Command::new(yucore::util_name())
        // TrailingVarArg specifies the final positional argument is a VarArg
        // and it doesn't attempt to parse any further args.
        .trailing_var_arg(true)
        .allow_hyphen_values(true)
        .version(yucore::crate_version!())
        .about(ABOUT)
        .after_help(AFTER_HELP)
        .override_usage(format_usage(USAGE))
        .arg(
            Arg::new(options::NO_NEWLINE)
                .short('n')
                .help("do not output the trailing newline")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::ENABLE_BACKSLASH_ESCAPE)
                .short('e')
                .help(if cfg!(feature = "xpg-echo") {
                    "enable interpretation of backslash escapes (default)"
                } else {
                    "enable interpretation of backslash escapes"
                })
                .action(ArgAction::SetTrue)
                .overrides_with(options::DISABLE_BACKSLASH_ESCAPE),
        )
        .arg(
            Arg::new(options::DISABLE_BACKSLASH_ESCAPE)
                .short('E')
                .help(if cfg!(feature = "xpg-echo") {
                    "disable interpretation of backslash escapes"
                } else {
                    "disable interpretation of backslash escapes (default)"
                })
                .action(ArgAction::SetTrue)
                .overrides_with(options::ENABLE_BACKSLASH_ESCAPE),
        )
        .arg(
            Arg::new(options::STRING)
                .action(ArgAction::Append)
                .value_parser(ValueParser::os_string()),
        )
}

fn execute(stdout: &mut StdoutLock, args: Vec<OsString>, options: Options) -> UResult<()> {
    for (i, arg) in args.into_iter().enumerate() {
        let bytes = os_str_as_bytes(&arg)?;

        // Don't print a space before the first argument
        if i > 0 {
            stdout.write_all(b" ")?;
        }

        if options.escape {
            for item in parse_escape_only(bytes, OctalParsing::ThreeDigits) {
                if item.write(&mut *stdout)?.is_break() {
                    // \c: no remaining arguments, no trailing newline
                    return Ok(());
                }
            }
        } else {
            stdout.write_all(bytes)?;
        }
    }

    if options.trailing_newline {
        stdout.write_all(b"\n")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Options, filter_flags, is_flag};
    use std::ffi::OsString;

    fn flags_of(args: &[&str]) -> (Vec<OsString>, Options) {
        filter_flags(args.iter().map(|s| OsString::from(*s)))
    }

    #[test]
    fn recognizes_flag_clusters() {
        let mut options = Options::default();
        assert!(is_flag("-neE".as_ref(), &mut options));
        assert!(!options.trailing_newline);
        assert!(!options.escape);
    }

    #[test]
    fn rejects_mixed_clusters() {
        let mut options = Options::default();
        assert!(!is_flag("-eeBne".as_ref(), &mut options));
        // a rejected cluster must leave the options untouched
        assert!(options.trailing_newline);
    }

    #[test]
    fn dash_alone_is_text() {
        let mut options = Options::default();
        assert!(!is_flag("-".as_ref(), &mut options));
    }

    #[test]
    fn flag_processing_stops_at_first_non_flag() {
        let (args, options) = flags_of(&["-n", "hello", "-e"]);
        assert_eq!(args, vec![OsString::from("hello"), OsString::from("-e")]);
        assert!(!options.trailing_newline);
        assert!(!options.escape);
    }

    #[test]
    fn last_escape_flag_wins() {
        let (_, options) = flags_of(&["-e", "-E"]);
        assert!(!options.escape);
        let (_, options) = flags_of(&["-E", "-e"]);
        assert!(options.escape);
    }
}
