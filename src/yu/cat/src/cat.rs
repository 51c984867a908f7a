// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.
// spell-checker:ignore nonblank nonprint nonprinting

mod platform;

use crate::platform::is_unsafe_overwrite;
use clap::{Arg, ArgAction, Command};
use memchr::{memchr, memchr2};
use std::ffi::OsString;
use std::fs::{File, metadata};
use std::io::{self, BufWriter, ErrorKind, IsTerminal, Read, Write};
#[cfg(unix)]
use std::os::fd::AsFd;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
use thiserror::Error;
use yucore::display::Quotable;
use yucore::error::{UResult, USimpleError};
use yucore::fast_inc::fast_inc_one;
use yucore::format_usage;

/// Linux splice support
#[cfg(target_os = "linux")]
mod splice;

const ABOUT: &str = "Concatenate FILE(s) to standard output";
const USAGE: &str = "{} [OPTION]... [FILE]...";
const AFTER_HELP: &str = "\
With no FILE, or when FILE is -, read standard input.

Examples:
  cat f - g  Output f's contents, then standard input, then g's contents.
  cat        Copy standard input to standard output.";

const LINE_NUMBER_BUF_SIZE: usize = 32;

/// The running line counter, kept as right-justified ASCII so it can be
/// copied into the output without formatting on every line.
///
/// `num_start..num_end` is the digit window, `print_start` the first
/// byte of the printed field (padding plus digits plus the trailing
/// tab). Both start cursors only ever move left; once the digits fill
/// the whole buffer the leftmost byte turns into a `>` overflow marker
/// and the width stops growing.
struct LineNumber {
    buf: [u8; LINE_NUMBER_BUF_SIZE],
    print_start: usize,
    num_start: usize,
    num_end: usize,
}

impl LineNumber {
    fn new() -> Self {
        let mut buf = [b' '; LINE_NUMBER_BUF_SIZE];

        let init_str = "     1\t";
        let print_start = buf.len() - init_str.len();
        let num_start = buf.len() - 2;
        let num_end = buf.len() - 1;

        buf[print_start..].copy_from_slice(init_str.as_bytes());

        Self {
            buf,
            print_start,
            num_start,
            num_end,
        }
    }

    fn increment(&mut self) {
        fast_inc_one(&mut self.buf, &mut self.num_start, self.num_end);
        self.print_start = self.print_start.min(self.num_start);
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.buf[self.print_start..]
    }

    fn write(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(self.as_bytes())
    }
}

#[derive(Error, Debug)]
enum CatError {
    /// Wrapper around `io::Error`
    #[error("{0}")]
    Io(#[from] io::Error),
    /// Wrapper around `nix::Error`
    #[cfg(target_os = "linux")]
    #[error("{0}")]
    Nix(#[from] nix::Error),
    /// A write to the shared sink failed. Unlike a read error this is
    /// fatal for the whole invocation, not just the current file.
    #[error("write error: {0}")]
    Write(io::Error),
    /// Unknown file type; it's not a regular file, directory, etc.
    #[error("unknown filetype: {ft_debug}")]
    UnknownFiletype {
        /// A debug print of the file type
        ft_debug: String,
    },
    #[error("Is a directory")]
    IsDirectory,
    #[error("input file is output file")]
    OutputIsInput,
}

type CatResult<T> = Result<T, CatError>;

#[derive(PartialEq)]
enum NumberingMode {
    None,
    NonEmpty,
    All,
}

struct OutputOptions {
    /// Line numbering mode
    number: NumberingMode,

    /// Suppress repeated empty output lines
    squeeze_blank: bool,

    /// Display TAB characters as `^I`
    show_tabs: bool,

    /// Show end of lines
    show_ends: bool,

    /// Use ^ and M- notation, except for LF (\\n) and TAB (\\t)
    show_nonprint: bool,
}

impl OutputOptions {
    fn tab(&self) -> &'static str {
        if self.show_tabs { "^I" } else { "\t" }
    }

    fn end_of_line(&self) -> &'static str {
        if self.show_ends { "$\n" } else { "\n" }
    }

    /// We can write fast if we can simply copy the contents of the file to
    /// stdout, without augmenting the output with e.g. line numbers.
    fn can_write_fast(&self) -> bool {
        !(self.show_tabs
            || self.show_nonprint
            || self.show_ends
            || self.squeeze_blank
            || self.number != NumberingMode::None)
    }
}

/// State that persists between the files of one invocation, so several
/// inputs number and squeeze like one continuous stream. Only used when
/// we can't write fast.
struct OutputState {
    /// The current line number
    line_number: LineNumber,

    /// Consecutive line-terminator events since the last content byte:
    /// -1 mid-line, 0 right after a newline, >= 1 inside a run of blank
    /// lines. Saturates at 2 so pathological all-blank input cannot
    /// overflow it; the squeeze decision only needs "2 or more".
    newlines: i8,
}

#[cfg(unix)]
trait FdReadable: Read + AsFd {}
#[cfg(not(unix))]
trait FdReadable: Read {}

#[cfg(unix)]
impl<T> FdReadable for T where T: Read + AsFd {}
#[cfg(not(unix))]
impl<T> FdReadable for T where T: Read {}

/// Represents an open file handle, stream, or other device
struct InputHandle<R: FdReadable> {
    reader: R,
    is_interactive: bool,
}

/// Concrete enum of recognized file types.
///
/// *Note*: `cat`-ing a directory should result in an
/// [`CatError::IsDirectory`]
enum InputType {
    Directory,
    File,
    StdIn,
    #[cfg(unix)]
    BlockDevice,
    #[cfg(unix)]
    CharacterDevice,
    #[cfg(unix)]
    Fifo,
}

mod options {
    pub static FILE: &str = "file";
    pub static SHOW_ALL: &str = "show-all";
    pub static NUMBER_NONBLANK: &str = "number-nonblank";
    pub static SHOW_NONPRINTING_ENDS: &str = "e";
    pub static SHOW_ENDS: &str = "show-ends";
    pub static NUMBER: &str = "number";
    pub static SQUEEZE_BLANK: &str = "squeeze-blank";
    pub static SHOW_NONPRINTING_TABS: &str = "t";
    pub static SHOW_TABS: &str = "show-tabs";
    pub static SHOW_NONPRINTING: &str = "show-nonprinting";
    pub static IGNORED_U: &str = "ignored-u";
}

#[yucore::main]
pub fn yumain(args: impl yucore::Args) -> UResult<()> {
    // die of SIGPIPE like the C tool instead of surfacing EPIPE errors
    #[cfg(unix)]
    unsafe {
        yucore::libc::signal(yucore::libc::SIGPIPE, yucore::libc::SIG_DFL);
    }

    let matches = yucore::clap_ext::handle_clap_result(uu_app(), args)?;

    let number_mode = if matches.get_flag(options::NUMBER_NONBLANK) {
        NumberingMode::NonEmpty
    } else if matches.get_flag(options::NUMBER) {
        NumberingMode::All
    } else {
        NumberingMode::None
    };

    let show_nonprint = matches.get_flag(options::SHOW_ALL)
        || matches.get_flag(options::SHOW_NONPRINTING_ENDS)
        || matches.get_flag(options::SHOW_NONPRINTING_TABS)
        || matches.get_flag(options::SHOW_NONPRINTING);

    let show_ends = matches.get_flag(options::SHOW_ALL)
        || matches.get_flag(options::SHOW_NONPRINTING_ENDS)
        || matches.get_flag(options::SHOW_ENDS);

    let show_tabs = matches.get_flag(options::SHOW_ALL)
        || matches.get_flag(options::SHOW_NONPRINTING_TABS)
        || matches.get_flag(options::SHOW_TABS);

    let squeeze_blank = matches.get_flag(options::SQUEEZE_BLANK);

    let files: Vec<OsString> = match matches.get_many::<OsString>(options::FILE) {
        Some(v) => v.cloned().collect(),
        None => vec![OsString::from("-")],
    };

    let options = OutputOptions {
        show_ends,
        number: number_mode,
        show_nonprint,
        show_tabs,
        squeeze_blank,
    };

    cat_files(&files, &options)
}

pub fn uu_app() -> Command {
    Command::new(yucore::util_name())
        .version(yucore::crate_version!())
        .override_usage(format_usage(USAGE))
        .about(ABOUT)
        .after_help(AFTER_HELP)
        .infer_long_args(true)
        .args_override_self(true)
        .arg(
            Arg::new(options::FILE)
                .hide(true)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(OsString))
                .value_hint(clap::ValueHint::FilePath),
        )
        .arg(
            Arg::new(options::SHOW_ALL)
                .short('A')
                .long(options::SHOW_ALL)
                .help("equivalent to -vET")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::NUMBER_NONBLANK)
                .short('b')
                .long(options::NUMBER_NONBLANK)
                .help("number nonempty output lines, overrides -n")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::SHOW_NONPRINTING_ENDS)
                .short('e')
                .help("equivalent to -vE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::SHOW_ENDS)
                .short('E')
                .long(options::SHOW_ENDS)
                .help("display $ at end of each line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::NUMBER)
                .short('n')
                .long(options::NUMBER)
                .help("number all output lines")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::SQUEEZE_BLANK)
                .short('s')
                .long(options::SQUEEZE_BLANK)
                .help("suppress repeated empty output lines")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::SHOW_NONPRINTING_TABS)
                .short('t')
                .help("equivalent to -vT")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::SHOW_TABS)
                .short('T')
                .long(options::SHOW_TABS)
                .help("display TAB characters as ^I")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::SHOW_NONPRINTING)
                .short('v')
                .long(options::SHOW_NONPRINTING)
                .help("use ^ and M- notation, except for LFD and TAB")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::IGNORED_U)
                .short('u')
                .help("(ignored)")
                .action(ArgAction::SetTrue),
        )
}

fn cat_handle<R: FdReadable>(
    handle: &mut InputHandle<R>,
    options: &OutputOptions,
    state: &mut OutputState,
) -> CatResult<()> {
    if options.can_write_fast() {
        write_fast(handle)
    } else {
        write_lines(handle, options, state)
    }
}

fn cat_path(path: &OsString, options: &OutputOptions, state: &mut OutputState) -> CatResult<()> {
    match get_input_type(path)? {
        InputType::StdIn => {
            let stdin = io::stdin();
            if is_unsafe_overwrite(&stdin, &io::stdout()) {
                return Err(CatError::OutputIsInput);
            }
            let mut handle = InputHandle {
                reader: stdin,
                is_interactive: io::stdin().is_terminal(),
            };
            cat_handle(&mut handle, options, state)
        }
        InputType::Directory => Err(CatError::IsDirectory),
        _ => {
            let file = File::open(path)?;
            if is_unsafe_overwrite(&file, &io::stdout()) {
                return Err(CatError::OutputIsInput);
            }
            let mut handle = InputHandle {
                reader: file,
                is_interactive: false,
            };
            cat_handle(&mut handle, options, state)
        }
    }
}

fn cat_files(files: &[OsString], options: &OutputOptions) -> UResult<()> {
    let mut state = OutputState {
        line_number: LineNumber::new(),
        newlines: 0,
    };
    let mut error_messages: Vec<String> = Vec::new();

    for path in files {
        if let Err(err) = cat_path(path, options, &mut state) {
            if let CatError::Write(_) = err {
                // the sink is shared by every input; after a failed write
                // there is no point in trying the remaining files
                return Err(USimpleError::new(1, err.to_string()));
            }
            error_messages.push(format!("{}: {err}", path.maybe_quote()));
        }
    }
    if error_messages.is_empty() {
        Ok(())
    } else {
        let line_joiner = format!("\n{}: ", yucore::util_name());

        Err(USimpleError::new(1, error_messages.join(&line_joiner)))
    }
}

/// Classifies the `InputType` of file at `path` if possible
///
/// # Arguments
///
/// * `path` - Path on a file system to classify metadata
fn get_input_type(path: &OsString) -> CatResult<InputType> {
    if path == "-" {
        return Ok(InputType::StdIn);
    }

    let ft = metadata(path)?.file_type();
    match ft {
        #[cfg(unix)]
        ft if ft.is_block_device() => Ok(InputType::BlockDevice),
        #[cfg(unix)]
        ft if ft.is_char_device() => Ok(InputType::CharacterDevice),
        #[cfg(unix)]
        ft if ft.is_fifo() => Ok(InputType::Fifo),
        ft if ft.is_dir() => Ok(InputType::Directory),
        ft if ft.is_file() => Ok(InputType::File),
        _ => Err(CatError::UnknownFiletype {
            ft_debug: format!("{ft:?}"),
        }),
    }
}

/// Writes handle to stdout with no configuration. This allows a
/// simple memory copy.
fn write_fast<R: FdReadable>(handle: &mut InputHandle<R>) -> CatResult<()> {
    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();
    #[cfg(target_os = "linux")]
    {
        if !splice::write_fast_using_splice(handle, &stdout_lock)? {
            return Ok(());
        }
    }
    let mut buf = [0; 1024 * 64];
    loop {
        match handle.reader.read(&mut buf) {
            Ok(n) => {
                if n == 0 {
                    break;
                }
                stdout_lock
                    .write_all(&buf[..n])
                    .inspect_err(handle_broken_pipe)
                    .map_err(CatError::Write)?;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    stdout_lock
        .flush()
        .inspect_err(handle_broken_pipe)
        .map_err(CatError::Write)?;
    Ok(())
}

/// Outputs file contents to stdout applying the line-oriented formats,
/// propagating any errors that might occur.
fn write_lines<R: FdReadable>(
    handle: &mut InputHandle<R>,
    options: &OutputOptions,
    state: &mut OutputState,
) -> CatResult<()> {
    let mut in_buf = [0; 1024 * 31];
    let stdout = io::stdout();
    let stdout = stdout.lock();
    let mut writer = BufWriter::with_capacity(32 * 1024, stdout);

    loop {
        let n = match handle.reader.read(&mut in_buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                // push out what was produced before failing this file
                writer
                    .flush()
                    .inspect_err(handle_broken_pipe)
                    .map_err(CatError::Write)?;
                return Err(e.into());
            }
        };
        scan_buffer(&in_buf[..n], &mut writer, options, state, handle.is_interactive)?;
        // pending output must not sit in the buffer across a blocking read
        writer
            .flush()
            .inspect_err(handle_broken_pipe)
            .map_err(CatError::Write)?;
    }

    Ok(())
}

/// One pass over a freshly read block of input.
///
/// Every `\n` is a line-terminator event feeding the blank-run state
/// machine: a blank line inside a run of two or more is dropped under
/// `-s`, a kept blank line is numbered under `-n`, then `$` and the
/// newline go out. When content starts on a fresh line it is numbered
/// under `-n`/`-b`, then transcoded up to the next newline or the end
/// of the block, whichever comes first.
fn scan_buffer<W: Write>(
    in_buf: &[u8],
    writer: &mut W,
    options: &OutputOptions,
    state: &mut OutputState,
    is_interactive: bool,
) -> CatResult<()> {
    let mut pos = 0;
    while pos < in_buf.len() {
        if in_buf[pos] == b'\n' {
            state.newlines = (state.newlines + 1).min(2);
            if state.newlines > 0 {
                if state.newlines >= 2 && options.squeeze_blank {
                    pos += 1;
                    continue;
                }
                if options.number == NumberingMode::All {
                    state
                        .line_number
                        .write(writer)
                        .map_err(CatError::Write)?;
                    state.line_number.increment();
                }
            }
            writer
                .write_all(options.end_of_line().as_bytes())
                .inspect_err(handle_broken_pipe)
                .map_err(CatError::Write)?;
            if is_interactive {
                writer
                    .flush()
                    .inspect_err(handle_broken_pipe)
                    .map_err(CatError::Write)?;
            }
            pos += 1;
            continue;
        }

        // content begins; number the fresh line, then leave the
        // blank-run state until the next terminator
        if state.newlines >= 0 && options.number != NumberingMode::None {
            state
                .line_number
                .write(writer)
                .map_err(CatError::Write)?;
            state.line_number.increment();
        }
        state.newlines = -1;

        pos += write_end(writer, &in_buf[pos..], options)?;
    }
    Ok(())
}

/// Transcodes content bytes up to (not including) the next newline or
/// the end of the buffer; returns how far the cursor advanced.
fn write_end<W: Write>(writer: &mut W, in_buf: &[u8], options: &OutputOptions) -> CatResult<usize> {
    if options.show_nonprint {
        write_nonprint_to_end(in_buf, writer, options.tab().as_bytes())
    } else if options.show_tabs {
        write_tab_to_end(in_buf, writer)
    } else {
        write_to_end(in_buf, writer)
    }
    .map_err(CatError::Write)
}

fn write_to_end<W: Write>(in_buf: &[u8], writer: &mut W) -> io::Result<usize> {
    match memchr(b'\n', in_buf) {
        Some(p) => {
            writer.write_all(&in_buf[..p])?;
            Ok(p)
        }
        None => {
            writer.write_all(in_buf)?;
            Ok(in_buf.len())
        }
    }
}

fn write_tab_to_end<W: Write>(mut in_buf: &[u8], writer: &mut W) -> io::Result<usize> {
    let mut count = 0;
    loop {
        match memchr2(b'\n', b'\t', in_buf) {
            Some(p) => {
                writer.write_all(&in_buf[..p])?;
                if in_buf[p] == b'\t' {
                    writer.write_all(b"^I")?;
                    in_buf = &in_buf[p + 1..];
                    count += p + 1;
                } else {
                    return Ok(count + p);
                }
            }
            None => {
                writer.write_all(in_buf)?;
                return Ok(in_buf.len() + count);
            }
        }
    }
}

/// The `^X` / `M-x` display mapping, one match per input byte:
/// printable ASCII is itself, DEL is `^?`, remaining control bytes are
/// `^` plus the byte shifted into the letter range, and high-bit bytes
/// repeat the scheme behind an `M-` prefix. The tab argument carries
/// the `-T` decision (raw tab or `^I`).
fn write_nonprint_to_end<W: Write>(in_buf: &[u8], writer: &mut W, tab: &[u8]) -> io::Result<usize> {
    let mut count = 0;

    for byte in in_buf.iter().copied() {
        if byte == b'\n' {
            break;
        }
        match byte {
            9 => writer.write_all(tab),
            0..=8 | 10..=31 => writer.write_all(&[b'^', byte + 64]),
            32..=126 => writer.write_all(&[byte]),
            127 => writer.write_all(b"^?"),
            128..=159 => writer.write_all(&[b'M', b'-', b'^', byte - 64]),
            160..=254 => writer.write_all(&[b'M', b'-', byte - 128]),
            _ => writer.write_all(b"M-^?"),
        }?;
        count += 1;
    }
    Ok(count)
}

fn handle_broken_pipe(error: &io::Error) {
    if error.kind() == ErrorKind::BrokenPipe {
        std::process::exit(13);
    }
}
