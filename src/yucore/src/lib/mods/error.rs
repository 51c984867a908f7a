// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! All utilities return a [`UResult`] from their entry point; the
//! wrapper generated by `#[yucore::main]` turns the error into a
//! diagnostic on stderr and an exit code.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicI32, Ordering};

static EXIT_CODE: AtomicI32 = AtomicI32::new(0);

/// Exit code the process will report when the utility returns `Ok(())`.
pub fn get_exit_code() -> i32 {
    EXIT_CODE.load(Ordering::SeqCst)
}

/// Records a nonzero exit code for an error that has already been
/// reported, without aborting the utility.
pub fn set_exit_code(code: i32) {
    EXIT_CODE.store(code, Ordering::SeqCst);
}

pub type UResult<T> = Result<T, Box<dyn UError>>;

/// An error a utility can return from its entry point.
///
/// The `Display` impl provides the message printed after the
/// `"<util>: "` prefix; an empty message suppresses the diagnostic.
pub trait UError: Error + Send {
    /// The process exit code for this error.
    fn code(&self) -> i32 {
        1
    }

    /// Whether a `Try '<util> --help'` hint should follow the message.
    fn usage(&self) -> bool {
        false
    }
}

impl<T> From<T> for Box<dyn UError>
where
    T: UError + 'static,
{
    fn from(t: T) -> Self {
        Box::new(t)
    }
}

/// A simple error with an exit code and a message.
#[derive(Debug)]
pub struct USimpleError {
    pub code: i32,
    pub message: String,
}

impl USimpleError {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<S: Into<String>>(code: i32, message: S) -> Box<dyn UError> {
        Box::new(Self {
            code,
            message: message.into(),
        })
    }
}

impl Display for USimpleError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl Error for USimpleError {}

impl UError for USimpleError {
    fn code(&self) -> i32 {
        self.code
    }
}

/// Like [`USimpleError`], but asks for the usage hint to be printed.
#[derive(Debug)]
pub struct UUsageError {
    pub code: i32,
    pub message: String,
}

impl UUsageError {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<S: Into<String>>(code: i32, message: S) -> Box<dyn UError> {
        Box::new(Self {
            code,
            message: message.into(),
        })
    }
}

impl Display for UUsageError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl Error for UUsageError {}

impl UError for UUsageError {
    fn code(&self) -> i32 {
        self.code
    }

    fn usage(&self) -> bool {
        true
    }
}

/// Wraps an [`std::io::Error`] so `?` works in functions returning
/// [`UResult`].
#[derive(Debug)]
pub struct UIoError {
    inner: std::io::Error,
}

impl UIoError {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(inner: std::io::Error) -> Box<dyn UError> {
        Box::new(Self { inner })
    }
}

impl Display for UIoError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl Error for UIoError {}

impl UError for UIoError {}

impl From<std::io::Error> for Box<dyn UError> {
    fn from(e: std::io::Error) -> Self {
        UIoError::new(e)
    }
}

/// An exit code with no message of its own, for errors whose diagnostic
/// has already been written (e.g. by clap).
#[derive(Debug)]
pub struct ExitCode {
    pub code: i32,
}

impl ExitCode {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(code: i32) -> Box<dyn UError> {
        Box::new(Self { code })
    }
}

impl Display for ExitCode {
    fn fmt(&self, _f: &mut Formatter) -> fmt::Result {
        Ok(())
    }
}

impl Error for ExitCode {}

impl UError for ExitCode {
    fn code(&self) -> i32 {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_error_reports_code_and_message() {
        let e: Box<dyn UError> = USimpleError::new(2, "no such file");
        assert_eq!(e.code(), 2);
        assert!(!e.usage());
        assert_eq!(format!("{e}"), "no such file");
    }

    #[test]
    fn usage_error_requests_hint() {
        let e: Box<dyn UError> = UUsageError::new(1, "invalid option");
        assert!(e.usage());
    }

    #[test]
    fn exit_code_is_silent() {
        let e: Box<dyn UError> = ExitCode::new(1);
        assert_eq!(format!("{e}"), "");
        assert_eq!(e.code(), 1);
    }

    #[test]
    fn io_error_converts() {
        fn fails() -> UResult<()> {
            Err(std::io::Error::other("boom"))?;
            Ok(())
        }
        assert_eq!(fails().unwrap_err().code(), 1);
    }
}
