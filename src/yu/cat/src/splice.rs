// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Zero-copy fast path for Linux.

use super::{CatResult, FdReadable, InputHandle};

use nix::fcntl::{SpliceFFlags, splice};
use nix::unistd;
use std::os::fd::{AsFd, OwnedFd};

const SPLICE_SIZE: usize = 1024 * 128;
const BUF_SIZE: usize = 1024 * 16;

/// Moves data from `handle` to `write_fd` through a pipe with
/// `splice(2)`, so the bytes never cross into user space.
///
/// Returns `Ok(false)` when the input was fully drained this way.
/// Returns `Ok(true)` when splicing is not supported for this pair of
/// descriptors and the caller must fall back to the read/write loop;
/// anything already sitting in the pipe has been forwarded.
pub(super) fn write_fast_using_splice<R: FdReadable, S: AsFd>(
    handle: &mut InputHandle<R>,
    write_fd: &S,
) -> CatResult<bool> {
    let (pipe_rd, pipe_wr) = unistd::pipe()?;

    loop {
        match splice(
            handle.reader.as_fd(),
            None,
            pipe_wr.as_fd(),
            None,
            SPLICE_SIZE,
            SpliceFFlags::empty(),
        ) {
            Ok(0) => return Ok(false),
            Ok(n) => {
                if splice_exact(&pipe_rd, write_fd, n).is_err() {
                    // the sink does not take splice; drain the pipe by
                    // hand and let the caller finish with plain writes
                    copy_exact(&pipe_rd, write_fd, n)?;
                    return Ok(true);
                }
            }
            Err(_) => return Ok(true),
        }
    }
}

/// Splices exactly `num_bytes` from the pipe into `write_fd`.
fn splice_exact<S: AsFd>(pipe_rd: &OwnedFd, write_fd: &S, num_bytes: usize) -> nix::Result<()> {
    let mut left = num_bytes;
    while left > 0 {
        let written = splice(
            pipe_rd.as_fd(),
            None,
            write_fd.as_fd(),
            None,
            left,
            SpliceFFlags::empty(),
        )?;
        left -= written;
    }
    Ok(())
}

/// Fallback for `splice_exact`: copies `num_bytes` through user space.
fn copy_exact<S: AsFd>(pipe_rd: &OwnedFd, write_fd: &S, num_bytes: usize) -> CatResult<()> {
    let mut buf = [0; BUF_SIZE];
    let mut left = num_bytes;
    while left > 0 {
        let read = unistd::read(pipe_rd.as_fd(), &mut buf)?;
        debug_assert!(read > 0, "the pipe holds the bytes we just spliced in");
        let mut written = 0;
        while written < read {
            written += unistd::write(write_fd.as_fd(), &buf[written..read])?;
        }
        left -= read;
    }
    Ok(())
}
