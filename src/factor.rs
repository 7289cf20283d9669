// src/factor.rs
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Extensions the intake accepts (checked on the file name only, never on content).
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A selected data file: original name plus bytes, held as one shared in-memory reference.
#[derive(Clone, PartialEq, Eq)]
pub struct FactorFile {
    file_name: String,
    bytes: Arc<[u8]>,
}

impl FactorFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping its base name as the upload file name.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lower-cased extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
    }

    pub fn is_accepted(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
    }

    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("csv") => "text/csv",
            Some("xlsx") => XLSX_MIME,
            _ => "application/octet-stream",
        }
    }
}

// Bytes stay out of logs.
impl fmt::Debug for FactorFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One named input slot. `uploaded()` is derived from the file, so it can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    name: String,
    file: Option<FactorFile>,
}

impl Factor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uploaded(&self) -> bool {
        self.file.is_some()
    }

    pub fn file(&self) -> Option<&FactorFile> {
        self.file.as_ref()
    }

    pub(crate) fn set_file(&mut self, file: Option<FactorFile>) {
        self.file = file;
    }
}

/// Ordered factors with unique names; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactorSet {
    factors: Vec<Factor>,
}

impl FactorSet {
    /// Build an empty (nothing uploaded) set. Repeated names are kept once.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for name in names {
            let name = name.into();
            if set.get(&name).is_none() {
                set.factors.push(Factor::new(name));
            }
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<&Factor> {
        self.factors.iter().find(|f| f.name == name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Factor> {
        self.factors.iter_mut().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Factor> {
        self.factors.iter()
    }

    pub fn uploaded_names(&self) -> impl Iterator<Item = &str> {
        self.factors
            .iter()
            .filter(|f| f.uploaded())
            .map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub(crate) fn reset(&mut self) {
        for f in &mut self.factors {
            f.file = None;
        }
    }
}

impl IntoIterator for FactorSet {
    type Item = Factor;
    type IntoIter = std::vec::IntoIter<Factor>;

    fn into_iter(self) -> Self::IntoIter {
        self.factors.into_iter()
    }
}
