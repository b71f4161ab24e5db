//! DICOM container decoding and windowing metadata extraction.

use dicom_dictionary_std::tags;
use dicom_object::{DefaultDicomObject, Tag};

use crate::error::PreprocessError;

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// Radiological windowing parameters (0028,1050) / (0028,1051).
///
/// When the attributes are multi-valued the first element is authoritative,
/// matching how the values are read elsewhere in the deployment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowingParameters {
    pub center: f64,
    pub width: f64,
}

/// Parse raw upload bytes into a DICOM object.
///
/// Requires the standard Part 10 layout: 128-byte preamble, `DICM` marker,
/// file meta group, data set.
pub fn decode_object(bytes: &[u8]) -> Result<DefaultDicomObject, PreprocessError> {
    if bytes.len() < PREAMBLE_LEN + MAGIC.len() {
        return Err(PreprocessError::Decode(
            "file too short for a DICOM preamble".to_string(),
        ));
    }
    if &bytes[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] != MAGIC {
        return Err(PreprocessError::Decode(
            "missing DICM marker after preamble".to_string(),
        ));
    }

    // `from_reader` expects the stream to begin with the DICM magic code,
    // so only the preamble is stripped here.
    dicom_object::from_reader(&bytes[PREAMBLE_LEN..])
        .map_err(|e| PreprocessError::Decode(e.to_string()))
}

/// Read windowing parameters from the data set, if both attributes are
/// present and numeric. Absence of either attribute selects the min-max
/// fallback in the caller.
pub fn windowing_of(obj: &DefaultDicomObject) -> Option<WindowingParameters> {
    let center = first_float(obj, tags::WINDOW_CENTER)?;
    let width = first_float(obj, tags::WINDOW_WIDTH)?;
    Some(WindowingParameters { center, width })
}

fn first_float(obj: &DefaultDicomObject, tag: Tag) -> Option<f64> {
    let element = obj.element(tag).ok()?;
    let values = element.value().to_multi_float64().ok()?;
    values.first().copied()
}
