//! Messages exchanged between the modeling side and the viewer

use crate::error::Result;
use crate::part::{Part, VisibilityState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full snapshot of an assembly; always complete, never a delta
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsChanged {
    #[serde(default)]
    pub assembly_id: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl PartsChanged {
    /// Create a snapshot
    pub fn new(assembly_id: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            assembly_id: assembly_id.into(),
            parts,
        }
    }

    /// Decode a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Events the viewer emits towards the modeling side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewerEvent {
    /// The viewer finished initialization and accepts part lists
    Ready,
    /// The user selected a part; `data` is its identifier or tree path
    Select { data: String },
}

impl ViewerEvent {
    /// Encode as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Per-part visibility handed to the tree view, keyed by display name
pub type VisibilityMap = BTreeMap<String, VisibilityState>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PartMesh;

    #[test]
    fn test_event_wire_format() {
        assert_eq!(ViewerEvent::Ready.to_json().unwrap(), r#"{"type":"ready"}"#);
        let select = ViewerEvent::Select {
            data: "/Assembly/Top".into(),
        };
        assert_eq!(
            select.to_json().unwrap(),
            r#"{"type":"select","data":"/Assembly/Top"}"#
        );
    }

    #[test]
    fn test_visibility_map_format() {
        let mut map = VisibilityMap::new();
        map.insert("Back".into(), VisibilityState::new(true, true));
        map.insert("Shelf 6".into(), VisibilityState::new(false, true));
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Back":[1,1],"Shelf 6":[0,1]}"#);
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = PartsChanged::new(
            "shelf",
            vec![Part::new("A", "Box", PartMesh::cuboid([0.0; 3], [1.0; 3]))],
        );
        let decoded = PartsChanged::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(decoded.assembly_id, "shelf");
        assert_eq!(decoded.parts.len(), 1);
        assert_eq!(decoded.parts[0].mesh.vertex_count(), 24);
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(PartsChanged::from_json("{\"parts\": 3}").is_err());
    }
}
