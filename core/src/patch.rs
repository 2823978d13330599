//! JSON-Patch style partial-update documents.
//!
//! # Design
//! A patch document is an ordered list of `PatchOperation`s. The same wire
//! format serves single-resource edits (paths like `/text`) and
//! collection-level batches (`add` at `/-` appends a new resource, paths
//! like `/4/text` address an existing one). Paths are checked when an
//! operation is constructed so a malformed document never reaches the
//! request builder.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Slash-delimited, JSON-Pointer-like target of a patch operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatchPath(String);

impl PatchPath {
    /// The `/-` path: append to the target collection.
    pub const APPEND: &'static str = "/-";

    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(Error::Encoding(format!(
                "patch path `{path}` must start with `/`"
            )));
        }
        if path.len() > 1 && path.ends_with('/') {
            return Err(Error::Encoding(format!(
                "patch path `{path}` has an empty trailing segment"
            )));
        }
        Ok(Self(path))
    }

    pub fn append() -> Self {
        Self(Self::APPEND.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PatchPath {
    type Error = Error;

    fn try_from(path: String) -> Result<Self> {
        Self::new(path)
    }
}

impl From<PatchPath> for String {
    fn from(path: PatchPath) -> Self {
        path.0
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One patch instruction. Serializes as `{"op": ..., "path": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: PatchPath, value: Value },
    Replace { path: PatchPath, value: Value },
    Remove { path: PatchPath },
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: impl Serialize) -> Result<Self> {
        Ok(PatchOperation::Add {
            path: PatchPath::new(path)?,
            value: to_value(value)?,
        })
    }

    pub fn replace(path: impl Into<String>, value: impl Serialize) -> Result<Self> {
        Ok(PatchOperation::Replace {
            path: PatchPath::new(path)?,
            value: to_value(value)?,
        })
    }

    pub fn remove(path: impl Into<String>) -> Result<Self> {
        Ok(PatchOperation::Remove {
            path: PatchPath::new(path)?,
        })
    }

    /// `add` at `/-`: append a new resource built from `value`.
    pub fn append(value: impl Serialize) -> Result<Self> {
        Ok(PatchOperation::Add {
            path: PatchPath::append(),
            value: to_value(value)?,
        })
    }

    pub fn op(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Remove { .. } => "remove",
        }
    }

    pub fn path(&self) -> &PatchPath {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Remove { path } => path,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            PatchOperation::Add { value, .. } | PatchOperation::Replace { value, .. } => {
                Some(value)
            }
            PatchOperation::Remove { .. } => None,
        }
    }
}

/// Reject empty documents; an edit must change something.
pub(crate) fn ensure_not_empty(ops: &[PatchOperation]) -> Result<()> {
    if ops.is_empty() {
        return Err(Error::Encoding(
            "patch document must contain at least one operation".to_string(),
        ));
    }
    Ok(())
}

fn to_value(value: impl Serialize) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replace_serializes_to_wire_shape() {
        let op = PatchOperation::replace("/type", "comment").unwrap();
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({ "op": "replace", "path": "/type", "value": "comment" })
        );
    }

    #[test]
    fn remove_has_no_value() {
        let op = PatchOperation::remove("/4").unwrap();
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({ "op": "remove", "path": "/4" })
        );
        assert!(op.value().is_none());
        assert_eq!(op.op(), "remove");
    }

    #[test]
    fn append_targets_collection_end() {
        let op = PatchOperation::append(json!({ "text": "test" })).unwrap();
        assert_eq!(op.path().as_str(), "/-");
        assert_eq!(op.op(), "add");
    }

    #[test]
    fn relative_path_is_rejected() {
        let err = PatchOperation::replace("text", "x").unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert!(PatchPath::new("").is_err());
        assert!(PatchPath::new("/text/").is_err());
        assert!(PatchPath::new("/").is_ok());
    }

    #[test]
    fn deserialize_validates_path() {
        let ok: PatchOperation =
            serde_json::from_value(json!({ "op": "add", "path": "/-", "value": 1 })).unwrap();
        assert_eq!(ok, PatchOperation::append(1).unwrap());

        let bad: std::result::Result<PatchOperation, _> =
            serde_json::from_value(json!({ "op": "remove", "path": "4" }));
        assert!(bad.is_err());

        let unknown: std::result::Result<PatchOperation, _> =
            serde_json::from_value(json!({ "op": "move", "path": "/a" }));
        assert!(unknown.is_err());
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(ensure_not_empty(&[]).is_err());
        assert!(ensure_not_empty(&[PatchOperation::remove("/1").unwrap()]).is_ok());
    }
}
