use bytes::Bytes;

/// A file part received in a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file arrived in (`images`, `logo`, `partner0`, ...).
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A multipart form split into its `json` part and its files.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    pub json: Option<Bytes>,
    pub files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// Files whose field name starts with `prefix`, in arrival order.
    pub fn files_with_prefix(&self, prefix: &str) -> Vec<UploadedFile> {
        self.files
            .iter()
            .filter(|f| f.field.starts_with(prefix))
            .cloned()
            .collect()
    }
}
