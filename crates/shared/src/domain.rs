use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record identified by a unique string id within a collection.
pub trait Document {
    fn id(&self) -> &str;
}

macro_rules! document {
    ($name:ident) => {
        impl Document for $name {
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

document!(Analysis);
document!(AnalysisDetail);
document!(PathoscopeHit);
document!(User);
document!(Reference);
document!(Subtraction);
document!(UploadedFile);
document!(HmmAnnotation);
document!(IndexSummary);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    PathoscopeBowtie,
    Nuvs,
    #[serde(other)]
    Unknown,
}

/// Lightweight `{id, name}` pointer to another document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Analysis listing entry as returned by the sample analyses endpoint and
/// pushed over the websocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(default)]
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<EntityRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Analysis {
    pub fn sample_id(&self) -> Option<&str> {
        self.sample.as_ref().map(|sample| sample.id.as_str())
    }
}

/// Full analysis document. `diagnosis` is populated for Pathoscope runs and
/// `results` for NuVs runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetail {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(default)]
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnosis: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<NuvsSequence>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisDetail {
    pub fn is_ready_pathoscope(&self) -> bool {
        self.ready && self.algorithm == Some(Algorithm::PathoscopeBowtie)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuvsSequence {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blast: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Display row derived from one Pathoscope diagnosis entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathoscopeHit {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub pi: f64,
    #[serde(default)]
    pub coverage: f64,
    #[serde(default)]
    pub depth: f64,
    #[serde(default)]
    pub isolates: Vec<Value>,
    #[serde(default)]
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub id: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<EntityRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub administrator: bool,
    #[serde(default)]
    pub force_reset: bool,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub primary_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_password_change: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub newer: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSource {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub organism: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remotes_from: Option<RemoteSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Release>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed: Option<Release>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reference {
    pub fn is_remote(&self) -> bool {
        self.remotes_from.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtraction {
    pub id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<EntityRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub file_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmAnnotation {
    pub id: String,
    #[serde(default)]
    pub cluster: u32,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed: Option<Release>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Release>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Value>,
}

/// Server settings are a flat key/value document, e.g. `nuvs_proc: 4`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsDocument(pub Map<String, Value>);

impl SettingsDocument {
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }
}
