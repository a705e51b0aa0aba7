use bitflags::bitflags;
use nix::fcntl::OFlag;

bitflags! {
    /// Access flags requested through a mode string such as `"rw"` or `"a"`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessMode: u8 {
        /// `r`
        const READ = 1;
        /// `w`
        const WRITE = 1 << 1;
        /// `a`, writes land after existing content.
        const APPEND = 1 << 2;
    }
}

impl AccessMode {
    /// Parse a mode string. Any text is accepted; characters other than
    /// `r`, `w`, `a` and `+` are ignored.
    pub fn parse(mode: &str) -> Self {
        mode.chars().fold(AccessMode::empty(), |acc, c| match c {
            'r' => acc | AccessMode::READ,
            'w' => acc | AccessMode::WRITE,
            'a' => acc | AccessMode::APPEND | AccessMode::WRITE,
            '+' => acc | AccessMode::READ | AccessMode::WRITE,
            _ => acc,
        })
    }

    pub fn is_append(self) -> bool {
        self.contains(AccessMode::APPEND)
    }

    /// Every handle is a read-write, create-if-absent open.
    pub(crate) fn oflag(self) -> OFlag {
        let mut flags = OFlag::O_RDWR | OFlag::O_CREAT | OFlag::O_CLOEXEC;
        if self.is_append() {
            flags |= OFlag::O_APPEND;
        }
        flags
    }
}
