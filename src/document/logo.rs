use log::{debug, error};
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LOGO_URL: &str = "https://i.ibb.co/99m6byNT/MTIJ-Logo-3.png";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("muat turun gagal: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("gagal membaca {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("imej tidak dapat dinyahkod: {0}")]
    Decode(#[from] image_crate::ImageError),
}

/// Decoded raster logo, cheap to clone into every page that shows it.
#[derive(Clone)]
pub struct Logo {
    image: Arc<DynamicImage>,
}

impl fmt::Debug for Logo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.pixel_size();
        write!(f, "Logo({w}x{h})")
    }
}

impl Logo {
    pub fn from_image(image: DynamicImage) -> Self {
        // alpha channels are flattened; the PDF side only takes RGB
        Self {
            image: Arc::new(DynamicImage::ImageRgb8(image.to_rgb8())),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LogoError> {
        Ok(Self::from_image(image_crate::load_from_memory(bytes)?))
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub(crate) fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Loads the logo from an `http(s)://` URL or a local path.
pub fn fetch(source: &str) -> Result<Logo, LogoError> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;
        client
            .get(source)
            .send()?
            .error_for_status()?
            .bytes()?
            .to_vec()
    } else {
        fs::read(source).map_err(|source_err| LogoError::Read {
            path: PathBuf::from(source),
            source: source_err,
        })?
    };
    debug!("logo {} dimuatkan ({} bait)", source, bytes.len());
    Logo::from_bytes(&bytes)
}

/// A missing or broken logo never stops a document; it is logged and skipped.
pub fn fetch_or_skip(source: Option<&str>) -> Option<Logo> {
    let source = source?;
    match fetch(source) {
        Ok(logo) => Some(logo),
        Err(e) => {
            error!("logo {} gagal dimuatkan, dokumen dijana tanpa logo: {}", source, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error_and_skipped() {
        assert!(matches!(
            fetch("/tiada/logo.png"),
            Err(LogoError::Read { .. })
        ));
        assert!(fetch_or_skip(Some("/tiada/logo.png")).is_none());
        assert!(fetch_or_skip(None).is_none());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            Logo::from_bytes(b"bukan imej"),
            Err(LogoError::Decode(_))
        ));
    }

    #[test]
    fn image_is_flattened_to_rgb() {
        let logo = Logo::from_image(DynamicImage::new_rgba8(4, 3));
        assert_eq!(logo.pixel_size(), (4, 3));
        assert!(matches!(logo.image(), DynamicImage::ImageRgb8(_)));
    }
}
