//! File intake
//!
//! Turns a user action (file chooser, drop, example reference) into a single
//! validated [`UploadCandidate`]. The three input paths are one tagged union,
//! [`CandidateSource`], resolved before validation.

use std::collections::HashMap;
use std::fmt;
use reqwest::Url;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use vhd_common::catalog::{EXAMPLE_DRAG_KEY, EXAMPLE_MIME_TYPE};

/// Shown when a non-audio file is chosen or dropped
pub const INVALID_TYPE_MESSAGE: &str = "Please select a valid audio file (WAV, MP3, etc.)";

/// Shown when a bundled example cannot be retrieved
pub const EXAMPLE_FETCH_MESSAGE: &str = "Failed to load example file";

/// MIME type used when neither a declared type nor content sniffing helps
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// File intake errors
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Resolved MIME type does not start with `audio/`
    #[error("Not an audio file: {name} ({mime_type})")]
    InvalidType { name: String, mime_type: String },

    /// Example fetch failed or returned non-2xx
    #[error("Failed to load example file {filename}: {reason}")]
    ExampleFetchFailed { filename: String, reason: String },

    /// Drop carried neither an example key nor a file
    #[error("Drop contained no file")]
    EmptyDrop,

    /// Local file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntakeError {
    /// Message surfaced to the user
    pub fn user_message(&self) -> String {
        match self {
            IntakeError::InvalidType { .. } => INVALID_TYPE_MESSAGE.to_string(),
            IntakeError::ExampleFetchFailed { .. } => EXAMPLE_FETCH_MESSAGE.to_string(),
            IntakeError::EmptyDrop => "Nothing was dropped".to_string(),
            IntakeError::Io { path, .. } => format!("Could not read {}", path.display()),
        }
    }
}

/// A validated audio file ready for submission
///
/// Construction enforces the `audio/` MIME invariant, so every value of this
/// type is submittable.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    bytes: Vec<u8>,
    original_name: String,
    mime_type: String,
}

impl UploadCandidate {
    pub fn new(
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, IntakeError> {
        let original_name = original_name.into();
        let mime_type = mime_type.into();

        if !mime_type.starts_with("audio/") {
            return Err(IntakeError::InvalidType {
                name: original_name,
                mime_type,
            });
        }

        Ok(Self {
            bytes,
            original_name,
            mime_type,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

impl fmt::Debug for UploadCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCandidate")
            .field("original_name", &self.original_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A file picked or dropped by the user
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Type reported by the picker/drop source; sniffed from content when absent
    pub declared_mime: Option<String>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, declared_mime: Option<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            declared_mime,
        }
    }

    /// Read a file from disk; the MIME type is left to content sniffing
    pub async fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| IntakeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, bytes, None))
    }

    /// Declared type if present, else sniffed from magic bytes
    pub fn resolved_mime(&self) -> String {
        match self.declared_mime.as_deref().map(str::trim) {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => infer::get(&self.bytes)
                .map(|kind| kind.mime_type().to_string())
                .unwrap_or_else(|| UNKNOWN_MIME_TYPE.to_string()),
        }
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("declared_mime", &self.declared_mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Contents of a drop event
///
/// `data` holds keyed string items (an internally dragged example sets
/// [`EXAMPLE_DRAG_KEY`] to its filename); `files` holds native OS files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropPayload {
    data: HashMap<String, String>,
    files: Vec<LocalFile>,
}

impl DropPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload produced by dragging one of the bundled examples
    pub fn example_drag(filename: impl Into<String>) -> Self {
        Self::new().with_data(EXAMPLE_DRAG_KEY, filename)
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_file(mut self, file: LocalFile) -> Self {
        self.files.push(file);
        self
    }

    /// Example filename carried under the custom drag key, if any
    pub fn example_filename(&self) -> Option<&str> {
        self.data
            .get(EXAMPLE_DRAG_KEY)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// Where a candidate comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Chosen through a file picker
    Selected(LocalFile),
    /// Dropped onto the upload area
    Dropped(DropPayload),
    /// Named bundled example
    Example(String),
}

/// Source after drop resolution: either a local file or an example name
enum Resolved {
    Local(LocalFile),
    Example(String),
}

fn resolve(source: CandidateSource) -> Result<Resolved, IntakeError> {
    match source {
        CandidateSource::Selected(file) => Ok(Resolved::Local(file)),
        CandidateSource::Example(filename) => Ok(Resolved::Example(filename)),
        CandidateSource::Dropped(payload) => {
            // Custom example key first, native files as fallback
            if let Some(filename) = payload.example_filename() {
                return Ok(Resolved::Example(filename.to_string()));
            }
            payload
                .files
                .into_iter()
                .next()
                .map(Resolved::Local)
                .ok_or(IntakeError::EmptyDrop)
        }
    }
}

/// File intake bound to the site hosting `/sound/<file>`
#[derive(Debug, Clone)]
pub struct FileIntake {
    http_client: reqwest::Client,
    sound_base_url: String,
}

impl FileIntake {
    pub fn new(http_client: reqwest::Client, site_base_url: &str) -> Self {
        Self {
            http_client,
            sound_base_url: format!("{}/sound", site_base_url),
        }
    }

    /// Resolve and validate one candidate
    pub async fn accept(&self, source: CandidateSource) -> Result<UploadCandidate, IntakeError> {
        match resolve(source)? {
            Resolved::Local(file) => {
                let mime_type = file.resolved_mime();
                debug!(name = %file.name, mime_type = %mime_type, "Validating local file");
                UploadCandidate::new(file.name, mime_type, file.bytes)
            }
            Resolved::Example(filename) => self.fetch_example(&filename).await,
        }
    }

    /// `<site>/sound/<filename>` with the name percent-encoded as one path segment
    fn example_url(&self, filename: &str) -> Result<Url, String> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err("invalid example name".to_string());
        }

        let mut url = Url::parse(&self.sound_base_url).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|_| format!("cannot append to {}", self.sound_base_url))?
            .push(filename);
        Ok(url)
    }

    /// GET `<site>/sound/<filename>`; examples are `audio/wav` by construction
    async fn fetch_example(&self, filename: &str) -> Result<UploadCandidate, IntakeError> {
        let fetch_failed = |reason: String| IntakeError::ExampleFetchFailed {
            filename: filename.to_string(),
            reason,
        };

        let url = self.example_url(filename).map_err(fetch_failed)?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(format!("status {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;
        info!(filename = %filename, bytes = bytes.len(), "Loaded example recording");

        UploadCandidate::new(filename, EXAMPLE_MIME_TYPE, bytes.to_vec())
    }
}
