//! Error types raised by the template designer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while editing a template. All variants are
/// recoverable: the user simply retries the action that triggered them.
#[derive(Debug, Error)]
pub enum DesignerError {
    #[error("`{0}` is not a valid color, expected #RRGGBB")]
    InvalidColor(String),

    #[error("no file was selected")]
    EmptyPath,

    #[error("{} is not a supported image file", path.display())]
    UnsupportedImage { path: PathBuf },

    #[error("{} is not a supported audio file", path.display())]
    UnsupportedAudio { path: PathBuf },

    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is empty", path.display())]
    EmptyFile { path: PathBuf },
}

impl DesignerError {
    /// Short message for the footer. Read failures append the OS reason.
    pub fn notice(&self) -> String {
        match self {
            DesignerError::Read { source, .. } => format!("{self}: {source}"),
            _ => self.to_string(),
        }
    }
}
