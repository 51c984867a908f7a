// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Detection of the "input file is output file" hazard.

#[cfg(unix)]
mod unix {
    use nix::sys::stat::{SFlag, fstat};
    use nix::unistd::{Whence, lseek};
    use std::os::fd::AsFd;

    /// Whether copying `input` to `output` would feed a regular file
    /// back into itself and grow it without bound.
    ///
    /// Mirrors the classic check: the sink must be a regular file with
    /// the same device and inode as the source, and the source's read
    /// position must lie before its end (an exhausted or empty file
    /// cannot self-amplify). Appending `>>` keeps the old content in
    /// place, which is exactly the dangerous case.
    pub fn is_unsafe_overwrite<I: AsFd, O: AsFd>(input: &I, output: &O) -> bool {
        let Ok(input_stat) = fstat(input.as_fd()) else {
            return false;
        };
        let Ok(output_stat) = fstat(output.as_fd()) else {
            return false;
        };
        if output_stat.st_mode & SFlag::S_IFMT.bits() != SFlag::S_IFREG.bits() {
            return false;
        }
        if input_stat.st_dev != output_stat.st_dev || input_stat.st_ino != output_stat.st_ino {
            return false;
        }
        // not seekable (e.g. a pipe named "-") means not a regular file anyway
        match lseek(input.as_fd(), 0, Whence::SeekCur) {
            Ok(position) => position < input_stat.st_size,
            Err(_) => false,
        }
    }
}

#[cfg(unix)]
pub use unix::is_unsafe_overwrite;

#[cfg(not(unix))]
pub fn is_unsafe_overwrite<I, O>(_input: &I, _output: &O) -> bool {
    false
}

#[cfg(all(test, unix))]
mod tests {
    use super::is_unsafe_overwrite;
    use std::fs::{File, OpenOptions};
    use std::io::Write;

    #[test]
    fn same_nonempty_file_is_unsafe() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"data").unwrap();
        let reader = File::open(file.path()).unwrap();
        let writer = OpenOptions::new().append(true).open(file.path()).unwrap();
        assert!(is_unsafe_overwrite(&reader, &writer));
    }

    #[test]
    fn empty_file_is_safe() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let reader = File::open(file.path()).unwrap();
        let writer = OpenOptions::new().append(true).open(file.path()).unwrap();
        assert!(!is_unsafe_overwrite(&reader, &writer));
    }

    #[test]
    fn distinct_files_are_safe() {
        let mut a = tempfile::NamedTempFile::new().unwrap();
        a.write_all(b"data").unwrap();
        let b = tempfile::NamedTempFile::new().unwrap();
        let reader = File::open(a.path()).unwrap();
        let writer = OpenOptions::new().append(true).open(b.path()).unwrap();
        assert!(!is_unsafe_overwrite(&reader, &writer));
    }
}
