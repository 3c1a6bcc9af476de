//! Background conversion of uploaded images into embeddable `data:` URIs.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mime_guess::{mime, Mime};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::DesignerError;

/// Result of one conversion, tagged with the ticket it was started under.
#[derive(Debug)]
pub struct ImageConverted {
    pub ticket: u64,
    pub result: Result<String, DesignerError>,
}

/// An in-flight conversion. Dropping it aborts the task.
#[derive(Debug)]
pub struct ImageConversion {
    ticket: u64,
    task: JoinHandle<()>,
}

impl ImageConversion {
    /// Start converting `path` on `runtime`; the outcome is sent to `events`.
    pub fn spawn<E>(
        runtime: &Handle,
        ticket: u64,
        path: PathBuf,
        events: UnboundedSender<E>,
    ) -> Self
    where
        E: From<ImageConverted> + Send + 'static,
    {
        info!(ticket, "converting image {}", path.display());
        let task = runtime.spawn(async move {
            let result = convert_image(&path).await;
            if events.send(ImageConverted { ticket, result }.into()).is_err() {
                debug!(ticket, "image conversion finished after the UI went away");
            }
        });
        Self { ticket, task }
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Drop for ImageConversion {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!(ticket = self.ticket, "aborting image conversion");
            self.task.abort();
        }
    }
}

/// Read an image file and wrap it as `data:<mime>;base64,<payload>`.
pub async fn convert_image(path: &Path) -> Result<String, DesignerError> {
    if path.as_os_str().is_empty() {
        return Err(DesignerError::EmptyPath);
    }
    let mime = image_mime(path).ok_or_else(|| DesignerError::UnsupportedImage {
        path: path.to_path_buf(),
    })?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| DesignerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if bytes.is_empty() {
        return Err(DesignerError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    Ok(format!(
        "data:{};base64,{}",
        mime.essence_str(),
        STANDARD.encode(&bytes)
    ))
}

/// Guessed mime type for `path`, if it names any kind of image.
pub fn image_mime(path: &Path) -> Option<Mime> {
    mime_guess::from_path(path)
        .first()
        .filter(|guess| guess.type_() == mime::IMAGE)
}

/// Split a `data:` URI into its mime type and decoded payload length.
pub fn describe_data_uri(uri: &str) -> Option<(&str, usize)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    let decoded = ((payload.len() / 4) * 3).saturating_sub(padding.min(2));
    Some((mime, decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn converts_png_into_data_uri() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("cover.PNG");
        fs::write(&file, [0x89, b'P', b'N', b'G']).unwrap();

        let uri = convert_image(&file).await.unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
        assert_eq!(describe_data_uri(&uri), Some(("image/png", 4)));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = convert_image(&dir.path().join("gone.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, DesignerError::Read { .. }));
    }

    #[tokio::test]
    async fn rejects_unknown_types_and_empty_files() {
        let dir = tempdir().unwrap();
        let doc = dir.path().join("letter.pdf");
        fs::write(&doc, b"%PDF").unwrap();
        assert!(matches!(
            convert_image(&doc).await,
            Err(DesignerError::UnsupportedImage { .. })
        ));

        let empty = dir.path().join("blank.gif");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(
            convert_image(&empty).await,
            Err(DesignerError::EmptyFile { .. })
        ));
    }

    #[test]
    fn any_image_type_is_accepted() {
        for name in ["cover.jfif", "cover.tiff", "cover.webp", "cover.ico", "cover.svg"] {
            let guess = image_mime(Path::new(name));
            assert!(guess.is_some(), "{name} should count as an image");
        }
        assert_eq!(
            image_mime(Path::new("cover.JPG")).map(|m| m.essence_str().to_string()),
            Some("image/jpeg".to_string())
        );
        assert_eq!(image_mime(Path::new("song.mp3")), None);
        assert_eq!(image_mime(Path::new("no_extension")), None);
    }

    #[tokio::test]
    async fn jfif_upload_is_embedded_with_its_guessed_type() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("cover.jfif");
        fs::write(&file, b"abc").unwrap();

        let uri = convert_image(&file).await.unwrap();
        let (mime, len) = describe_data_uri(&uri).unwrap();
        assert!(mime.starts_with("image/"));
        assert_eq!(len, 3);
    }

    #[tokio::test]
    async fn spawned_conversion_reports_its_ticket() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("photo.jpeg");
        fs::write(&file, b"abc").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel::<ImageConverted>();
        let conversion = ImageConversion::spawn(&Handle::current(), 7, file, tx);
        assert_eq!(conversion.ticket(), 7);

        let done = rx.recv().await.unwrap();
        assert_eq!(done.ticket, 7);
        assert_eq!(done.result.unwrap(), "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn describes_builtin_sound_uri() {
        let uri = "data:audio/wav;base64,UklGRg==";
        assert_eq!(describe_data_uri(uri), Some(("audio/wav", 4)));
        assert_eq!(describe_data_uri("https://example.com/a.png"), None);
    }
}
