//! Raster decoding with format-specific metadata extraction.
//!
//! Photo input (JPEG/PNG) decodes through the standard raster codecs
//! with EXIF orientation applied, so phone photos of films reach the
//! model upright. DICOM input goes through `dicom::decode_dicom`.

use std::io::Cursor;

use image::DynamicImage;

use crate::models::Modality;

use super::dicom;
use super::DecodeError;

/// Format-specific metadata recovered during decode, before pipeline
/// metadata is assembled.
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub modality: Modality,
    pub body_part: Option<String>,
    pub patient_id: Option<String>,
}

impl SourceMetadata {
    /// Metadata for generic photo input: no DICOM tags to read.
    pub fn photo() -> Self {
        Self {
            modality: Modality::Photo,
            body_part: None,
            patient_id: None,
        }
    }
}

/// Decode `bytes` according to the declared extension.
///
/// Never returns a partially decoded image: corrupt input fails with
/// `DecodeError` wrapping the underlying cause.
pub fn decode(bytes: &[u8], extension: &str) -> Result<(DynamicImage, SourceMetadata), DecodeError> {
    if extension == "dcm" {
        return dicom::decode_dicom(bytes);
    }

    let img = image::load_from_memory(bytes)?;
    let img = apply_orientation(img, read_exif_orientation(bytes));
    Ok((img, SourceMetadata::photo()))
}

/// Read EXIF orientation tag 0x0112 from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
///
/// EXIF orientation values:
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        1 => img,
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}
