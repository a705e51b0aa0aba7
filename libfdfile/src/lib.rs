//! Descriptor-level text file access.
//!
//! [`FileHandle`] wraps one OS file descriptor and exposes whole-file reads,
//! line-by-line reads through a cursor, rewrite/append writes and an explicit
//! close. Failures are typed ([`FileError`]); call sites that prefer a
//! "value or nothing" contract opt into the [`Suppress`] boundary.
//!
//! ```no_run
//! use libfdfile::{FileHandle, Suppress};
//!
//! # fn main() -> libfdfile::Result<()> {
//! let mut file = FileHandle::open("file.txt", "rw")?;
//! file.write("Hello World")?;
//! file.write_line("second")?;
//! assert_eq!(file.read_line()?, "Hello World");
//! file.close()?;
//!
//! // released handles report `Closed`, which the boundary turns into `None`
//! assert_eq!(file.read(None).suppress()?, None);
//! # Ok(())
//! # }
//! ```
#[macro_use]
extern crate log;

mod codec;
mod error;
mod handle;
mod mode;
mod options;
mod scope;

pub use codec::TextCodec;
pub use error::{ACCESS_ERROR, ErrorKind, FileError, Result, Suppress};
pub use handle::FileHandle;
pub use mode::AccessMode;
pub use options::{DEFAULT_ENCODING, DEFAULT_MODE, DEFAULT_PERMISSIONS, HandleOptions};
pub use scope::Scope;
