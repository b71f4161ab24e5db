//! Uploaded imaging file, transient for the duration of one request.

/// One file pulled out of the multipart form. Raw bytes plus the client
/// filename; nothing is persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as submitted by the client, used for the extension check
    /// and for log context.
    pub filename: String,
    /// Raw container bytes.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Whether the filename carries a recognized DICOM suffix
    /// (case-insensitive `.dcm` or `.dicom`).
    pub fn is_dicom(&self) -> bool {
        let name = self.filename.to_ascii_lowercase();
        name.ends_with(".dcm") || name.ends_with(".dicom")
    }
}
