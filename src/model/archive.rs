//! Archive abstraction.
//!
//! An archive is an opaque named byte container, the unit of input to an
//! analysis. The engine never looks inside; archives are handed to the
//! analyzer, which decides how to interpret their bytes.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// One unit of input: a name plus a byte stream.
pub trait Archive: Send + Sync {
    /// The archive name, used for provenance and messages.
    fn name(&self) -> &str;

    /// Open the archive content for reading.
    fn open(&self) -> Result<Box<dyn Read + '_>>;
}

impl fmt::Debug for dyn Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Archive({})", self.name())
    }
}

/// An archive backed by a file on disk.
pub struct FileArchive {
    name: String,
    path: PathBuf,
}

impl FileArchive {
    /// Create a file archive; the file name becomes the archive name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Archive for FileArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        let file = File::open(&self.path).map_err(|e| crate::error::ApiDriftError::io(&self.path, e))?;
        Ok(Box::new(file))
    }
}

/// An archive backed by an in-memory byte buffer.
pub struct BytesArchive {
    name: String,
    bytes: Vec<u8>,
}

impl BytesArchive {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl Archive for BytesArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.bytes.as_slice()))
    }
}
