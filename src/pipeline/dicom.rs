//! DICOM container parsing and pixel conversion.
//!
//! Extracts the modality and body-part tags, forces the patient id to
//! the anonymization sentinel regardless of embedded identifiers, and
//! converts the pixel array to an 8-bit grayscale raster via min-max
//! rescaling.

use std::io::Cursor;

use dicom_dictionary_std::tags;
use dicom_object::{from_reader, InMemDicomObject};
use image::{DynamicImage, GrayImage, Luma};

use crate::models::{Modality, ANONYMIZED_PATIENT_ID};

use super::decode::SourceMetadata;
use super::DecodeError;

/// Parse a DICOM study and convert it to a displayable grayscale raster
/// plus anonymized metadata.
pub fn decode_dicom(bytes: &[u8]) -> Result<(DynamicImage, SourceMetadata), DecodeError> {
    // DICM magic sits after the optional 128-byte preamble; the reader
    // expects the stream to start at the file meta group.
    let stream = if bytes.len() > 132 && &bytes[128..132] == b"DICM" {
        &bytes[128..]
    } else {
        bytes
    };

    let obj = from_reader(Cursor::new(stream)).map_err(|e| DecodeError::Dicom(e.to_string()))?;
    decode_dicom_object(&obj)
}

/// Convert an already-parsed DICOM data set.
pub fn decode_dicom_object(
    obj: &InMemDicomObject,
) -> Result<(DynamicImage, SourceMetadata), DecodeError> {
    let metadata = extract_metadata(obj);
    let image = extract_pixels(obj)?;
    Ok((image, metadata))
}

/// Read the modality and body-part tags, defaulting to "Unknown" when
/// absent. The patient id is always the anonymization sentinel; the
/// embedded identifier is never read.
fn extract_metadata(obj: &InMemDicomObject) -> SourceMetadata {
    let modality = obj
        .element(tags::MODALITY)
        .ok()
        .and_then(|e| e.to_str().ok())
        .map(|code| Modality::from_dicom_code(&code))
        .unwrap_or(Modality::Unknown);

    let body_part = obj
        .element(tags::BODY_PART_EXAMINED)
        .ok()
        .and_then(|e| e.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    SourceMetadata {
        modality,
        body_part: Some(body_part),
        patient_id: Some(ANONYMIZED_PATIENT_ID.to_string()),
    }
}

/// Convert the pixel array to 8-bit grayscale.
///
/// 8- and 16-bit grayscale data is supported, signed and unsigned
/// (little-endian). A non-degenerate value range is linearly rescaled
/// to 0-255; a constant array comes out all-zero.
fn extract_pixels(obj: &InMemDicomObject) -> Result<DynamicImage, DecodeError> {
    let rows = read_u16(obj, tags::ROWS)
        .ok_or_else(|| DecodeError::Dicom("Rows tag missing or unreadable".into()))?
        as u32;
    let cols = read_u16(obj, tags::COLUMNS)
        .ok_or_else(|| DecodeError::Dicom("Columns tag missing or unreadable".into()))?
        as u32;
    let bits_allocated = read_u16(obj, tags::BITS_ALLOCATED).unwrap_or(16);
    let pixel_representation = read_u16(obj, tags::PIXEL_REPRESENTATION).unwrap_or(0);

    if rows == 0 || cols == 0 {
        return Err(DecodeError::Dicom(format!(
            "Degenerate image dimensions: {cols}x{rows}"
        )));
    }

    let pixel_data = obj
        .element(tags::PIXEL_DATA)
        .map_err(|e| DecodeError::Dicom(format!("Pixel data not found: {e}")))?;
    let raw = pixel_data
        .to_bytes()
        .map_err(|e| DecodeError::Dicom(format!("Failed to read pixel data: {e}")))?;

    let pixel_count = (rows * cols) as usize;
    let values: Vec<f64> = match bits_allocated {
        8 => {
            if raw.len() < pixel_count {
                return Err(DecodeError::Dicom(format!(
                    "Pixel data truncated: {} bytes for {pixel_count} pixels",
                    raw.len()
                )));
            }
            raw[..pixel_count].iter().map(|&p| p as f64).collect()
        }
        16 => {
            if raw.len() < pixel_count * 2 {
                return Err(DecodeError::Dicom(format!(
                    "Pixel data truncated: {} bytes for {pixel_count} 16-bit pixels",
                    raw.len()
                )));
            }
            let chunks = raw[..pixel_count * 2].chunks_exact(2);
            if pixel_representation == 0 {
                chunks
                    .map(|c| u16::from_le_bytes([c[0], c[1]]) as f64)
                    .collect()
            } else {
                chunks
                    .map(|c| i16::from_le_bytes([c[0], c[1]]) as f64)
                    .collect()
            }
        }
        other => {
            return Err(DecodeError::Dicom(format!(
                "Unsupported bits allocated: {other}"
            )))
        }
    };

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let mut gray = GrayImage::new(cols, rows);
    if max > min {
        let range = max - min;
        for (i, &v) in values.iter().enumerate() {
            let x = (i as u32) % cols;
            let y = (i as u32) / cols;
            let scaled = ((v - min) / range * 255.0).round().clamp(0.0, 255.0) as u8;
            gray.put_pixel(x, y, Luma([scaled]));
        }
    }
    // max == min: constant array, left all-zero

    Ok(DynamicImage::ImageLuma8(gray))
}

fn read_u16(obj: &InMemDicomObject, tag: dicom_core::Tag) -> Option<u16> {
    obj.element(tag).ok().and_then(|e| e.to_int::<u16>().ok())
}
