//! Manifest loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use scaffold_types::ScaffoldError;

/// Metadata read from the manifest file at the source path.
///
/// Only `version` must have a fixed type. `name` and `description` are picked
/// up when they are strings and otherwise stay in `extra` with the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PackageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Every other manifest field, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for PackageData {
    type Error = String;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let version = match fields.remove("version") {
            None | Some(Value::Null) => None,
            Some(Value::String(version)) => Some(version),
            Some(other) => return Err(format!("version must be a string, got {other}")),
        };
        Ok(Self {
            name: take_string(&mut fields, "name"),
            version,
            description: take_string(&mut fields, "description"),
            extra: fields,
        })
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    let value = fields.get(key)?.as_str()?.to_string();
    fields.remove(key);
    Some(value)
}

impl PackageData {
    /// `name version`, or whichever of the two is present.
    pub fn title(&self) -> Option<String> {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => Some(format!("{name} {version}")),
            (Some(name), None) => Some(name.clone()),
            (None, Some(version)) => Some(version.clone()),
            (None, None) => None,
        }
    }
}

/// Read and parse `<source>/<manifest_file>`.
///
/// A file that cannot be read is a [`ScaffoldError::ManifestRead`]; content
/// that is not a JSON object of the expected shape is a
/// [`ScaffoldError::ManifestParse`].
pub async fn load_package(source: &Path, manifest_file: &str) -> Result<PackageData, ScaffoldError> {
    let path = source.join(manifest_file);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ScaffoldError::ManifestRead {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    let package: PackageData =
        serde_json::from_str(&content).map_err(|e| ScaffoldError::ManifestParse {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    debug!(
        path = %path.display(),
        name = package.name.as_deref().unwrap_or(""),
        "manifest loaded"
    );
    Ok(package)
}
