//! Typed content descriptors and the JSON boundary that produces them.
//!
//! Raw API nodes are deserialized loosely (every field optional) and then
//! converted into [`ContentDescriptor`] values. Shape problems surface here as
//! [`ApiError`] so the download engine never sees half-parsed JSON.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::resolver::ContentId;

use super::ApiError;

/// Password status value that grants access to gated content.
const PASSWORD_OK: &str = "passwordOk";

/// Typed description of one content id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDescriptor {
    /// A single downloadable file.
    File(FileDescriptor),
    /// A folder with its (possibly nested) children.
    Folder(FolderDescriptor),
    /// Access denied until a correct password is supplied.
    PasswordRequired {
        /// The gated content id.
        id: ContentId,
        /// The server's `passwordStatus` value, when present.
        status: Option<String>,
    },
}

impl ContentDescriptor {
    /// Returns the content id this descriptor belongs to.
    #[must_use]
    pub fn id(&self) -> &ContentId {
        match self {
            Self::File(file) => &file.id,
            Self::Folder(folder) => &folder.id,
            Self::PasswordRequired { id, .. } => id,
        }
    }

    /// Returns the file descriptor if this is a file.
    #[must_use]
    pub fn as_file(&self) -> Option<&FileDescriptor> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Returns the folder descriptor if this is a folder.
    #[must_use]
    pub fn as_folder(&self) -> Option<&FolderDescriptor> {
        match self {
            Self::Folder(folder) => Some(folder),
            _ => None,
        }
    }
}

/// A remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// File content id.
    pub id: ContentId,
    /// File name as stored on the service.
    pub name: Option<String>,
    /// Direct download link.
    pub link: Option<String>,
    /// Declared size in bytes.
    pub size: Option<u64>,
}

impl FileDescriptor {
    /// Name to save the file under: the remote name, or `gofile_<id>` when absent.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("gofile_{}", self.id))
    }
}

/// A remote folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderDescriptor {
    /// Folder content id.
    pub id: ContentId,
    /// Folder name.
    pub name: Option<String>,
    /// Children in API order.
    pub children: Vec<ContentDescriptor>,
}

impl FolderDescriptor {
    /// Looks up a direct child by id.
    #[must_use]
    pub fn child(&self, id: &str) -> Option<&ContentDescriptor> {
        self.children.iter().find(|child| child.id().as_str() == id)
    }

    /// Iterates over file-typed children.
    pub fn files(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.children.iter().filter_map(ContentDescriptor::as_file)
    }

    /// Iterates over folder-typed children.
    pub fn subfolders(&self) -> impl Iterator<Item = &FolderDescriptor> {
        self.children.iter().filter_map(ContentDescriptor::as_folder)
    }

    /// Number of file-typed children.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// First file-typed child in API order.
    #[must_use]
    pub fn first_file(&self) -> Option<&FileDescriptor> {
        self.files().next()
    }
}

/// Top-level API response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// Converts a non-ok envelope into an [`ApiError::Status`].
    pub(crate) fn ensure_ok(&self, content_id: &str) -> Result<(), ApiError> {
        if self.status == "ok" {
            return Ok(());
        }
        let message = self
            .data
            .as_ref()
            .and_then(|data| data.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map_or_else(|| self.status.clone(), str::to_string);
        Err(ApiError::status(content_id, &self.status, message))
    }
}

/// Content node as the API sends it; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    link: Option<String>,
    size: Option<Value>,
    children: Option<Map<String, Value>>,
    password: Option<Value>,
    password_status: Option<String>,
}

impl RawNode {
    fn is_password_gated(&self) -> bool {
        let has_password = self
            .password
            .as_ref()
            .is_some_and(|value| !value.is_null() && *value != Value::Bool(false));
        has_password && self.password_status.as_deref() != Some(PASSWORD_OK)
    }

    fn into_descriptor(self, fallback_id: &str) -> Result<ContentDescriptor, ApiError> {
        let id = ContentId::from_raw(
            non_empty(self.id).unwrap_or_else(|| fallback_id.to_string()),
        );

        match self.kind.as_deref() {
            Some("file") => Ok(ContentDescriptor::File(FileDescriptor {
                id,
                name: non_empty(self.name),
                link: non_empty(self.link),
                size: self.size.as_ref().and_then(Value::as_u64),
            })),
            Some("folder") => {
                let mut children = Vec::new();
                for (key, value) in self.children.unwrap_or_default() {
                    let child: RawNode = serde_json::from_value(value).map_err(|e| {
                        ApiError::malformed(id.as_str(), format!("child {key}: {e}"))
                    })?;
                    children.push(child.into_descriptor(&key)?);
                }
                Ok(ContentDescriptor::Folder(FolderDescriptor {
                    id,
                    name: non_empty(self.name),
                    children,
                }))
            }
            Some(other) => Err(ApiError::unknown_content_type(id.as_str(), other)),
            None => Err(ApiError::malformed(id.as_str(), "missing content type")),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Converts a decoded envelope for `content_id` into a descriptor.
pub(crate) fn parse_content_envelope(
    content_id: &ContentId,
    envelope: ApiEnvelope,
) -> Result<ContentDescriptor, ApiError> {
    envelope.ensure_ok(content_id.as_str())?;

    let data = envelope
        .data
        .ok_or_else(|| ApiError::malformed(content_id.as_str(), "missing data node"))?;
    let node: RawNode = serde_json::from_value(data).map_err(|e| {
        ApiError::malformed(content_id.as_str(), format!("unexpected data node shape: {e}"))
    })?;

    if node.is_password_gated() {
        let id = non_empty(node.id).map_or_else(|| content_id.clone(), ContentId::from_raw);
        return Ok(ContentDescriptor::PasswordRequired {
            id,
            status: node.password_status,
        });
    }

    node.into_descriptor(content_id.as_str())
}
