use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Create payload. The remote side assigns the id, so this shape has none.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

/// Update payload. Fields left as `None` are omitted from the request body
/// and stay unchanged on the remote side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
