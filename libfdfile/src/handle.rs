//! Descriptor-level text file handle.
//!
//! A [`FileHandle`] owns exactly one OS descriptor, opened read-write (and
//! created if absent) at construction. All I/O goes straight to the
//! descriptor through `open`/`read`/`write`/`lseek`/`close`; nothing is
//! buffered.
//!
//! Reads are not incremental: [`FileHandle::read`] seeks back to offset 0
//! on every call, and [`FileHandle::read_line`] re-reads and re-splits the
//! whole file, keeping only a line cursor between calls.

use std::fmt::Display;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::stat;
use nix::unistd::{self, Whence};

use crate::codec::TextCodec;
use crate::error::{FileError, Result};
use crate::mode::AccessMode;
use crate::options::HandleOptions;

const READ_CHUNK: usize = 8192;

#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    mode: AccessMode,
    codec: TextCodec,
    descriptor: Option<OwnedFd>,
    rewrite_pending: bool,
    truncate_on_rewrite: bool,
    line_cursor: usize,
}

impl FileHandle {
    /// Open `path` with `mode` and the default utf-8 codec.
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self> {
        HandleOptions::new().mode(mode).open(path)
    }

    pub fn with_encoding<P: AsRef<Path>>(path: P, mode: &str, encoding: &str) -> Result<Self> {
        HandleOptions::new().mode(mode).encoding(encoding).open(path)
    }

    pub(crate) fn from_options(path: &Path, opts: &HandleOptions) -> Result<Self> {
        // Every argument is checked before a descriptor exists.
        if path.to_str().is_none() {
            return Err(FileError::type_constraint(
                "path",
                path.to_string_lossy().into_owned(),
            ));
        }
        let mode = opts.access_mode();
        let codec = opts.codec()?;
        let creation_mode = opts.creation_mode()?;

        let raw = nix::fcntl::open(path, mode.oflag(), creation_mode).map_err(|source| {
            FileError::Io {
                op: "open",
                path: path.to_path_buf(),
                source,
            }
        })?;
        // SAFETY: `open` just returned this descriptor and nothing else owns it.
        let descriptor = unsafe { OwnedFd::from_raw_fd(raw) };
        debug!(
            "opened {} fd={} mode={:?} encoding={}",
            path.display(),
            raw,
            mode,
            codec.name()
        );

        Ok(Self {
            path: path.to_path_buf(),
            mode,
            codec,
            descriptor: Some(descriptor),
            rewrite_pending: !mode.is_append(),
            truncate_on_rewrite: opts.truncate_on_rewrite,
            line_cursor: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Canonical name of the codec, e.g. `UTF-8`.
    pub fn encoding(&self) -> &'static str {
        self.codec.name()
    }

    pub fn line_cursor(&self) -> usize {
        self.line_cursor
    }

    pub fn rewrite_pending(&self) -> bool {
        self.rewrite_pending
    }

    pub fn is_closed(&self) -> bool {
        self.descriptor.is_none()
    }

    /// Read up to `n` bytes from the start of the file.
    ///
    /// `None` (or `Some(0)`) reads the whole file, sized by a fresh `stat`
    /// of the path. A negative size is rejected before the descriptor is
    /// touched. An empty result is logged and returned as `""`.
    pub fn read(&mut self, n: Option<i64>) -> Result<String> {
        let requested = match n {
            Some(n) if n < 0 => return Err(FileError::type_constraint("size", n.to_string())),
            Some(n) if n > 0 => Some(
                usize::try_from(n)
                    .map_err(|_| FileError::type_constraint("size", n.to_string()))?,
            ),
            _ => None,
        };

        let fd = self.descriptor()?.as_raw_fd();
        let size = match requested {
            Some(size) => size,
            None => {
                let st = stat::stat(self.path.as_path()).map_err(|e| self.io_err("stat", e))?;
                st.st_size as usize
            }
        };

        unistd::lseek(fd, 0, Whence::SeekSet).map_err(|e| self.io_err("lseek", e))?;

        // `size` may be far larger than the file, so read in chunks.
        let mut buf = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        while buf.len() < size {
            let want = READ_CHUNK.min(size - buf.len());
            match unistd::read(fd, &mut chunk[..want]).map_err(|e| self.io_err("read", e))? {
                0 => break,
                read => buf.extend_from_slice(&chunk[..read]),
            }
        }

        if buf.is_empty() {
            info!("file is empty: {}", self.path.display());
            return Ok(String::new());
        }

        self.codec.decode(&buf).ok_or_else(|| FileError::Decode {
            encoding: self.codec.name(),
            path: self.path.clone(),
        })
    }

    /// Return the line under the cursor and advance it.
    ///
    /// Lines are split on `'\n'` only, so `"a\n"` holds two lines, the
    /// second one empty. Reading past the last line is `OutOfRange` and
    /// leaves the cursor where it was.
    pub fn read_line(&mut self) -> Result<String> {
        let text = self.read(None)?;
        let index = self.line_cursor;

        match text.split('\n').nth(index) {
            Some(line) => {
                self.line_cursor += 1;
                Ok(line.to_string())
            }
            None => Err(FileError::OutOfRange {
                index,
                available: text.split('\n').count(),
            }),
        }
    }

    /// Write the textual form of `s` and return the number of bytes the
    /// descriptor accepted.
    ///
    /// The first write of a non-append handle starts at offset 0 (and
    /// truncates, unless disabled in [`HandleOptions`]); later writes go
    /// wherever the descriptor position sits.
    pub fn write<S: Display>(&mut self, s: S) -> Result<usize> {
        let fd = self.descriptor.as_ref().ok_or_else(|| FileError::Closed {
            path: self.path.clone(),
        })?;
        let text = s.to_string();
        let bytes = self.codec.encode(&text).ok_or_else(|| FileError::Encode {
            encoding: self.codec.name(),
            path: self.path.clone(),
        })?;
        if self.rewrite_pending {
            unistd::lseek(fd.as_raw_fd(), 0, Whence::SeekSet)
                .map_err(|e| self.io_err("lseek", e))?;
            if self.truncate_on_rewrite {
                unistd::ftruncate(fd, 0).map_err(|e| self.io_err("ftruncate", e))?;
            }
            self.rewrite_pending = false;
            debug!("rewriting {} from offset 0", self.path.display());
        }

        unistd::write(fd, &bytes).map_err(|e| self.io_err("write", e))
    }

    /// `write("\n" + s)`.
    pub fn write_line<S: Display>(&mut self, s: S) -> Result<usize> {
        self.write(format_args!("\n{s}"))
    }

    /// Release the descriptor. A second call reports `Closed`.
    pub fn close(&mut self) -> Result<bool> {
        let fd = self.descriptor.take().ok_or_else(|| FileError::Closed {
            path: self.path.clone(),
        })?;
        let raw = fd.into_raw_fd();
        debug!("closing {} fd={}", self.path.display(), raw);
        // The descriptor is gone after close(2) even when it reports an error.
        unistd::close(raw).map_err(|e| self.io_err("close", e))?;
        Ok(true)
    }

    fn descriptor(&self) -> Result<&OwnedFd> {
        self.descriptor.as_ref().ok_or_else(|| FileError::Closed {
            path: self.path.clone(),
        })
    }

    fn io_err(&self, op: &'static str, source: Errno) -> FileError {
        FileError::Io {
            op,
            path: self.path.clone(),
            source,
        }
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if let Some(fd) = self.descriptor.take() {
            warn!(
                "{} dropped without close, releasing descriptor",
                self.path.display()
            );
            if let Err(e) = unistd::close(fd.into_raw_fd()) {
                debug!("ignoring close failure on drop: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_open_creates_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("new.txt");
        assert!(!path.exists());

        let mut file = FileHandle::open(&path, "rw")?;
        assert!(path.exists());
        assert!(file.rewrite_pending());
        assert_eq!(file.line_cursor(), 0);
        assert_eq!(file.encoding(), "UTF-8");
        assert!(file.close()?);
        assert!(file.is_closed());
        Ok(())
    }

    #[test]
    fn test_append_clears_rewrite_pending() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut file = FileHandle::open(dir.path().join("a.txt"), "a")?;
        assert!(!file.rewrite_pending());
        file.close()?;
        Ok(())
    }

    #[test]
    fn test_open_missing_parent_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileHandle::open(dir.path().join("no/such/dir.txt"), "rw").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(
            err,
            FileError::Io {
                op: "open",
                source: Errno::ENOENT,
                ..
            }
        ));
    }

    #[test]
    fn test_partial_read() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut file = FileHandle::open(dir.path().join("p.txt"), "rw")?;
        file.write("Hello World")?;
        assert_eq!(file.read(Some(5))?, "Hello");
        // each read starts over from offset 0
        assert_eq!(file.read(Some(5))?, "Hello");
        assert_eq!(file.read(Some(0))?, "Hello World");
        assert_eq!(file.read(Some(1024))?, "Hello World");
        file.close()?;
        Ok(())
    }

    #[test]
    fn test_out_of_range_keeps_cursor() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut file = FileHandle::open(dir.path().join("l.txt"), "rw")?;
        file.write("only")?;
        assert_eq!(file.read_line()?, "only");
        let err = file.read_line().unwrap_err();
        assert!(matches!(
            err,
            FileError::OutOfRange {
                index: 1,
                available: 1
            }
        ));
        assert_eq!(file.line_cursor(), 1);
        file.close()?;
        Ok(())
    }

    #[test]
    fn test_write_coerces_display() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut file = FileHandle::open(dir.path().join("n.txt"), "rw")?;
        assert_eq!(file.write(42)?, 2);
        assert_eq!(file.write_line(1.5)?, 4);
        assert_eq!(file.read(None)?, "42\n1.5");
        file.close()?;
        Ok(())
    }
}
