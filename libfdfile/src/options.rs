use std::path::Path;

use nix::sys::stat::Mode;
use serde::{Deserialize, Serialize};

use crate::codec::TextCodec;
use crate::error::{FileError, Result};
use crate::handle::FileHandle;
use crate::mode::AccessMode;

pub const DEFAULT_MODE: &str = "rw";
pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_PERMISSIONS: u32 = 0o666;

/// How a [`FileHandle`] is opened.
///
/// Can be built in code or loaded from JSON:
///
/// ```json
/// { "mode": "a", "encoding": "latin1", "permissions": 384, "truncateOnRewrite": false }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HandleOptions {
    pub mode: String,

    pub encoding: String,

    /// Permission bits for a newly created file, masked by the umask.
    pub permissions: u32,

    /// Truncate the file on the first write of a non-append handle.
    #[serde(rename = "truncateOnRewrite")]
    pub truncate_on_rewrite: bool,
}

impl Default for HandleOptions {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            permissions: DEFAULT_PERMISSIONS,
            truncate_on_rewrite: true,
        }
    }
}

impl HandleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn truncate_on_rewrite(mut self, truncate: bool) -> Self {
        self.truncate_on_rewrite = truncate;
        self
    }

    /// Validate every field and open (creating if absent) `path`.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<FileHandle> {
        FileHandle::from_options(path.as_ref(), self)
    }

    pub(crate) fn access_mode(&self) -> AccessMode {
        AccessMode::parse(&self.mode)
    }

    pub(crate) fn codec(&self) -> Result<TextCodec> {
        TextCodec::for_label(&self.encoding)
            .ok_or_else(|| FileError::type_constraint("encoding", self.encoding.as_str()))
    }

    pub(crate) fn creation_mode(&self) -> Result<Mode> {
        if self.permissions > 0o7777 {
            return Err(FileError::type_constraint(
                "permissions",
                format!("{:o}", self.permissions),
            ));
        }
        Ok(Mode::from_bits_truncate(
            self.permissions as nix::libc::mode_t,
        ))
    }
}
