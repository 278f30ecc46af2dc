//! Container loading.
//!
//! [`ContainerHandle`] owns the bytes of the binary being scanned. Files are
//! memory-mapped read-only and the header is validated before the handle is
//! handed out, so every downstream component works over a buffer that is
//! known to start with a usable ELF64 header. Dropping the handle unmaps the
//! file on every exit path.

use crate::error::{RecoveryError, Result, SectionFault};
use crate::formats::elf::headers::parse_header;
use crate::formats::elf::ElfHeader;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default upper bound on the size of a file that will be mapped (100MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Resource limits for loading a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
    // memmap cannot map empty files
    Empty,
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            Backing::Mapped(map) => &map[..],
            Backing::Owned(buf) => buf.as_slice(),
            Backing::Empty => &[],
        }
    }
}

/// A read-only, validated view of one container.
pub struct ContainerHandle {
    path: Option<PathBuf>,
    backing: Backing,
    header: ElfHeader,
}

impl ContainerHandle {
    /// Opens a file, memory-maps it and validates its header.
    ///
    /// Fails with [`RecoveryError::Io`] when the file cannot be opened or
    /// mapped, [`RecoveryError::FileTooLarge`] past `limits.max_file_size`, and
    /// [`RecoveryError::Format`] when the header is not a usable ELF64 header.
    pub fn open<P: AsRef<Path>>(path: P, limits: &IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening container"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(RecoveryError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let backing = if file_size == 0 {
            Backing::Empty
        } else {
            // Safety: read-only private mapping of a regular file; the mapping
            // lives exactly as long as this handle.
            Backing::Mapped(unsafe { Mmap::map(&file)? })
        };

        Self::validate(Some(path.to_path_buf()), backing)
    }

    /// Wraps an in-memory image, validating its header.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let backing = if data.is_empty() {
            Backing::Empty
        } else {
            Backing::Owned(data)
        };
        Self::validate(None, backing)
    }

    fn validate(path: Option<PathBuf>, backing: Backing) -> Result<Self> {
        let header = match parse_header(backing.bytes()) {
            Ok(header) => header,
            Err(err) => {
                debug!(error = %err, "Header validation failed");
                return Err(err.into());
            }
        };
        Ok(Self {
            path,
            backing,
            header,
        })
    }

    /// Path the handle was opened from, if it came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The validated container header.
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    /// All bytes of the container.
    pub fn bytes(&self) -> &[u8] {
        self.backing.bytes()
    }

    /// Total length of the container in bytes.
    pub fn total_length(&self) -> u64 {
        self.bytes().len() as u64
    }

    /// Returns `[offset, offset + size)` if it lies entirely within the file.
    pub fn range(&self, offset: u64, size: u64) -> std::result::Result<&[u8], SectionFault> {
        let file_len = self.total_length();
        let fault = SectionFault::Bounds {
            offset,
            size,
            file_len,
        };
        let end = offset.checked_add(size).ok_or_else(|| fault.clone())?;
        if end > file_len {
            return Err(fault);
        }
        // Both bounds are <= file_len, which already fits in usize.
        Ok(&self.bytes()[offset as usize..end as usize])
    }
}
