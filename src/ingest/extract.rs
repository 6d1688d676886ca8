//! Format sniffing and EXIF extraction.
//!
//! The file extension proves nothing: the bytes on disk must sniff as JPEG
//! before EXIF parsing is attempted.

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{FailureReason, MetadataRecord};

use super::task::ItemTaskContext;

/// Token a reported format must contain (case-insensitive) to be accepted
const JPEG_FORMAT_TOKEN: &str = "JPEG";

/// What the format introspection utility reports about a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Upper-case format name, e.g. `JPEG` or `PNG`
    pub format: String,
}

impl ImageDescriptor {
    /// Whether the reported format is JPEG
    pub fn is_jpeg(&self) -> bool {
        self.format.to_ascii_uppercase().contains(JPEG_FORMAT_TOKEN)
    }
}

/// Format introspection utility
///
/// Implementations run on the blocking thread pool and may do file I/O.
pub trait ImageInspector: Send + Sync {
    /// Identify the format of the file at `path`; `Ok(None)` if unrecognised
    fn identify(&self, path: &Path) -> std::io::Result<Option<ImageDescriptor>>;
}

/// Metadata parsing utility
///
/// Implementations run on the blocking thread pool and may do file I/O.
pub trait MetadataParser: Send + Sync {
    /// Read embedded metadata as field → text value
    fn parse(&self, path: &Path) -> Result<MetadataRecord>;
}

/// [`ImageInspector`] that sniffs magic bytes with the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateInspector;

impl ImageInspector for ImageCrateInspector {
    fn identify(&self, path: &Path) -> std::io::Result<Option<ImageDescriptor>> {
        // Opening by path would seed the format from the extension
        let file = BufReader::new(std::fs::File::open(path)?);
        let reader = image::ImageReader::new(file).with_guessed_format()?;
        Ok(reader.format().map(|format| ImageDescriptor {
            format: format!("{:?}", format).to_ascii_uppercase(),
        }))
    }
}

/// [`MetadataParser`] reading the EXIF sub-IFD with `kamadak-exif`
///
/// Field names follow the common EXIF reader conventions (`ISO` rather than
/// `PhotographicSensitivity`); vendor maker notes and IFD pointers are left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifParser;

/// Tags whose conventional name differs from the EXIF 2.3 name
const FIELD_ALIASES: &[(exif::Tag, &str)] = &[
    (exif::Tag::PhotographicSensitivity, "ISO"),
    (exif::Tag::DateTimeDigitized, "CreateDate"),
    (exif::Tag::ExposureBiasValue, "ExposureCompensation"),
    (exif::Tag::PixelXDimension, "ExifImageWidth"),
    (exif::Tag::PixelYDimension, "ExifImageHeight"),
    (exif::Tag::FocalLengthIn35mmFilm, "FocalLengthIn35mmFormat"),
];

const EXCLUDED_TAGS: &[exif::Tag] = &[exif::Tag::MakerNote, exif::Tag::InteropIFDPointer];

impl ExifParser {
    fn field_name(tag: exif::Tag) -> String {
        FIELD_ALIASES
            .iter()
            .find(|(aliased, _)| *aliased == tag)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| tag.to_string())
    }

    fn field_text(field: &exif::Field) -> String {
        match &field.value {
            exif::Value::Ascii(parts) => parts
                .iter()
                .map(|part| {
                    String::from_utf8_lossy(part)
                        .trim_end_matches('\0')
                        .to_string()
                })
                .collect::<Vec<_>>()
                .join(", "),
            _ => field.display_value().to_string(),
        }
    }
}

impl MetadataParser for ExifParser {
    fn parse(&self, path: &Path) -> Result<MetadataRecord> {
        let file = std::fs::File::open(path)?;
        let mut reader = BufReader::new(file);
        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| Error::Metadata(e.to_string()))?;

        Ok(exif
            .fields()
            .filter(|f| f.ifd_num == exif::In::PRIMARY)
            .filter(|f| f.tag.context() == exif::Context::Exif)
            .filter(|f| !EXCLUDED_TAGS.contains(&f.tag))
            .map(|f| (Self::field_name(f.tag), Self::field_text(f)))
            .collect())
    }
}

impl ItemTaskContext {
    /// Confirm the blob is a JPEG and parse its metadata
    pub(super) async fn extract_metadata(&self) -> std::result::Result<MetadataRecord, FailureReason> {
        let descriptor = self.identify_format().await;
        let reported = descriptor
            .as_ref()
            .map(|d| d.format.clone())
            .unwrap_or_default();

        if !descriptor.as_ref().is_some_and(ImageDescriptor::is_jpeg) {
            tracing::warn!(
                path = %self.path.display(),
                format = %reported,
                "File is not a valid JPEG"
            );
            return Err(FailureReason::FormatMismatch(reported));
        }

        let parser = Arc::clone(&self.parser);
        let path = self.path.clone();
        let parsed = match tokio::task::spawn_blocking(move || parser.parse(&path)).await {
            Ok(parsed) => parsed,
            // A parser panic takes the worker down with it; the queue treats that as fatal
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                return Err(FailureReason::MetadataParse(format!(
                    "parser task failed: {}",
                    e
                )));
            }
        };
        let record = parsed.map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Could not read EXIF");
            FailureReason::MetadataParse(e.to_string())
        })?;

        // An empty write would leave the hash absent and the item would be retried forever
        if record.is_empty() {
            return Err(FailureReason::MetadataParse(
                "image carries no EXIF fields".to_string(),
            ));
        }

        Ok(record)
    }

    /// Run the inspector; errors and panics count as an unknown format
    async fn identify_format(&self) -> Option<ImageDescriptor> {
        let inspector = Arc::clone(&self.inspector);
        let path = self.path.clone();

        match tokio::task::spawn_blocking(move || inspector.identify(&path)).await {
            Ok(Ok(descriptor)) => descriptor,
            Ok(Err(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Format identification failed");
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Format identification task failed");
                None
            }
        }
    }
}
