//! Mode string parsing for mapping requests.

/// Access selected by a mode string: read-only or read-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Pages may only be read.
    Read,
    /// Pages may be read and written.
    Write,
}

/// Upper bound on the number of mode-string bytes the parser inspects.
const MODE_SCAN_CAP: usize = 8;

/// Parsed mapping mode flags, immutable once constructed.
///
/// Built from a short textual mode such as `"r"`, `"we"`, or `"rpq"`:
///
/// | token | meaning                                            |
/// |-------|----------------------------------------------------|
/// | `r`   | read-only access                                   |
/// | `w`   | read-write access                                  |
/// | `e`   | extend to end of file (requested length ignored)   |
/// | `p`   | private (copy-on-write) mapping                    |
/// | `q`   | bequeath: child processes may inherit the handle   |
///
/// Token order is irrelevant except that the last `r`/`w` scanned wins.
/// Unrecognized bytes are ignored, never rejected, so parsing cannot fail;
/// a mode that selects no access is only rejected when a mapping is opened
/// with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeSpec {
    access: Option<Access>,
    extend_to_end: bool,
    private: bool,
    inheritable: bool,
}

impl ModeSpec {
    /// Parse a textual mode. Scans at most the first eight bytes.
    #[must_use]
    pub fn parse(mode: &str) -> Self {
        let mut out = Self::default();
        for &b in mode.as_bytes().iter().take(MODE_SCAN_CAP) {
            match b {
                0 => break,
                b'r' => out.access = Some(Access::Read),
                b'w' => out.access = Some(Access::Write),
                b'e' => out.extend_to_end = true,
                b'p' => out.private = true,
                b'q' => out.inheritable = true,
                _ => {}
            }
        }
        out
    }

    /// A plain read-only mode, equivalent to parsing `"r"`.
    #[must_use]
    pub fn read() -> Self {
        Self {
            access: Some(Access::Read),
            ..Self::default()
        }
    }

    /// A plain read-write mode, equivalent to parsing `"w"`.
    #[must_use]
    pub fn write() -> Self {
        Self {
            access: Some(Access::Write),
            ..Self::default()
        }
    }

    /// Request the mapping to span from the offset to the end of the file.
    #[must_use]
    pub fn extend(mut self) -> Self {
        self.extend_to_end = true;
        self
    }

    /// Request copy-on-write semantics: writes stay private to this mapping.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Allow child processes to inherit the underlying OS handle.
    #[must_use]
    pub fn inheritable(mut self) -> Self {
        self.inheritable = true;
        self
    }

    /// The selected access, if any access token was present.
    #[must_use]
    pub fn access(&self) -> Option<Access> {
        self.access
    }

    /// Whether the mapping should extend to the current end of file.
    #[must_use]
    pub fn extend_to_end(&self) -> bool {
        self.extend_to_end
    }

    /// Whether writes are copy-on-write rather than shared.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Whether child processes may inherit the underlying handle.
    #[must_use]
    pub fn is_inheritable(&self) -> bool {
        self.inheritable
    }
}

impl From<&str> for ModeSpec {
    fn from(mode: &str) -> Self {
        Self::parse(mode)
    }
}
