use serde::{Deserialize, Serialize};

/// An account registered with the CA.
///
/// # Example JSON
///
/// ```json
/// {
///   "id": 42,
///   "contact": ["mailto:cert-admin@example.com"],
///   "status": "valid"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
