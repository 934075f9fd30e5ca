use std::{
    io,
    path::{Path, PathBuf},
};

use log::debug;

/// An uploaded audio file as received from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl AudioUpload {
    pub fn new<S: Into<String>>(filename: S, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Local directory holding the narration files of all waypoints.
#[derive(Debug, Clone)]
pub struct UploadStore {
    directory: PathBuf,
}

impl UploadStore {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub async fn ensure_directory(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.directory).await
    }

    /// Writes the upload under its client supplied filename and returns that
    /// name. An existing file with the same name is replaced.
    ///
    /// The write is not atomic, a failure halfway leaves a partial file behind.
    pub async fn store(&self, upload: &AudioUpload) -> io::Result<String> {
        if !is_safe_filename(&upload.filename) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to store file named '{}'", upload.filename),
            ));
        }
        let path = self.directory.join(&upload.filename);
        tokio::fs::write(&path, &upload.bytes).await?;
        debug!("Stored {} bytes at {}.", upload.bytes.len(), path.display());
        Ok(upload.filename.clone())
    }
}

/// Only plain file names are accepted, anything that could point outside of
/// the upload directory is rejected.
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\', '\0'])
}
