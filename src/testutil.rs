//! Test helpers: synthetic in-memory DICOM files.

use dicom_core::value::{PrimitiveValue, C};
use dicom_core::{DataElement, Tag, VR};
use dicom_dictionary_std::tags;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};

const SOP_CLASS: &str = "1.2.840.10008.5.1.4.1.1.7";
const SOP_INSTANCE: &str = "2.25.312934";
const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";

/// Windowing attributes to embed, possibly multi-valued.
pub struct SyntheticWindow {
    pub centers: Vec<f64>,
    pub widths: Vec<f64>,
}

/// Build a complete Part 10 file with 8-bit grayscale pixel data.
pub fn gray_dicom(
    rows: u16,
    cols: u16,
    pixels: Vec<u8>,
    window: Option<SyntheticWindow>,
) -> Vec<u8> {
    assert_eq!(pixels.len(), rows as usize * cols as usize);

    let mut obj = InMemDicomObject::new_empty();
    put_str(&mut obj, tags::SOP_CLASS_UID, VR::UI, SOP_CLASS);
    put_str(&mut obj, tags::SOP_INSTANCE_UID, VR::UI, SOP_INSTANCE);
    put_str(&mut obj, tags::PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
    put_u16(&mut obj, tags::SAMPLES_PER_PIXEL, 1);
    put_u16(&mut obj, tags::ROWS, rows);
    put_u16(&mut obj, tags::COLUMNS, cols);
    put_u16(&mut obj, tags::BITS_ALLOCATED, 8);
    put_u16(&mut obj, tags::BITS_STORED, 8);
    put_u16(&mut obj, tags::HIGH_BIT, 7);
    put_u16(&mut obj, tags::PIXEL_REPRESENTATION, 0);

    if let Some(w) = window {
        obj.put(DataElement::new(
            tags::WINDOW_CENTER,
            VR::DS,
            decimal_strings(&w.centers),
        ));
        obj.put(DataElement::new(
            tags::WINDOW_WIDTH,
            VR::DS,
            decimal_strings(&w.widths),
        ));
    }

    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OB,
        PrimitiveValue::U8(C::from(pixels)),
    ));

    let file_obj = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(EXPLICIT_VR_LE)
                .media_storage_sop_class_uid(SOP_CLASS)
                .media_storage_sop_instance_uid(SOP_INSTANCE),
        )
        .expect("synthetic DICOM meta table");

    let mut bytes = Vec::new();
    file_obj
        .write_all(&mut bytes)
        .expect("synthetic DICOM serialization");
    bytes
}

fn put_str(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

fn put_u16(obj: &mut InMemDicomObject, tag: Tag, value: u16) {
    obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

fn decimal_strings(values: &[f64]) -> PrimitiveValue {
    PrimitiveValue::Strs(values.iter().map(|v| v.to_string()).collect())
}
