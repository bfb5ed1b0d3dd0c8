//! Lab document text codec.
//!
//! Decode failures are `CorruptDocument`: the document is validated before
//! any live-side command so a malformed file never leads to a half-applied
//! operation.

use crate::error::{LinkError, Result};

use super::types::LabFile;

pub fn decode(text: &str) -> Result<LabFile> {
    serde_json::from_str(text).map_err(|e| LinkError::CorruptDocument(e.to_string()))
}

pub fn encode(doc: &LabFile) -> Result<String> {
    serde_json::to_string_pretty(doc).map_err(|e| LinkError::CorruptDocument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::poly::PolySet;

    const SAMPLE: &str = r#"{
        "lab": {
            "name": "demo",
            "version": "1",
            "topology": {
                "networks": {
                    "network": {"id": 1, "type": "bridge", "name": "n", "left": 504, "top": 289, "visibility": 0}
                },
                "nodes": {
                    "node": [
                        {"id": "1", "name": "R1", "interface": {"id": "0", "name": "e0", "type": "ethernet", "network_id": 1}},
                        {"id": "2", "name": "R2", "interface": [
                            {"id": "0", "name": "e0", "type": "ethernet", "network_id": 1},
                            {"id": "1", "name": "e1", "type": "ethernet", "network_id": 2}
                        ]}
                    ]
                }
            }
        }
    }"#;

    #[test]
    fn test_round_trip_is_structurally_lossless() {
        let doc = decode(SAMPLE).unwrap();
        let text = encode(&doc).unwrap();
        let again = decode(&text).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_singleton_shape_survives() {
        let doc = decode(SAMPLE).unwrap();

        // singleton attachment decodes as One, not Many([_])
        let nodes = doc.lab.topology.nodes.as_ref().unwrap();
        let first = nodes.node.iter().next().unwrap();
        assert!(matches!(first.interface, Some(PolySet::One(_))));
        let second = nodes.node.iter().nth(1).unwrap();
        assert!(matches!(second.interface, Some(PolySet::Many(_))));

        // and re-encodes as a bare object, not a one-element array
        let text = encode(&doc).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        let intf = &raw["lab"]["topology"]["nodes"]["node"][0]["interface"];
        assert!(intf.is_object(), "singleton was wrapped into {}", intf);
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let doc = decode(SAMPLE).unwrap();
        assert_eq!(doc.lab.rest.get("name").unwrap(), "demo");

        let text = encode(&doc).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["lab"]["name"], "demo");
        assert_eq!(raw["lab"]["topology"]["nodes"]["node"][1]["name"], "R2");
    }

    #[test]
    fn test_garbage_is_corrupt_document() {
        assert!(matches!(
            decode("<lab/>"),
            Err(LinkError::CorruptDocument(_))
        ));
        assert!(matches!(
            decode(r#"{"lab": {"topology": []}}"#),
            Err(LinkError::CorruptDocument(_))
        ));
    }
}
