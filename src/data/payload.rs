use std::path::Path;

use serde_json::Value;

use crate::data::TerrainDataset;
use crate::error::PlotResult;

/// Parses a payload of the form `{"data": {...}}` or a bare dataset object.
///
/// `{"data": null}` yields `None`, which plots as an empty scene.
pub fn parse_payload(text: &str) -> PlotResult<Option<TerrainDataset>> {
    let mut value: Value = serde_json::from_str(text)?;

    let inner = if value.get("data").is_some() {
        value["data"].take()
    } else {
        value
    };

    if inner.is_null() {
        return Ok(None);
    }

    let dataset: TerrainDataset = serde_json::from_value(inner)?;
    log::debug!(
        "parsed payload: {} points, {} faces, {} stages",
        dataset.points.len(),
        dataset.faces.len(),
        dataset.number_of_stages()
    );
    Ok(Some(dataset))
}

pub fn load_payload(path: &Path) -> PlotResult<Option<TerrainDataset>> {
    let text = std::fs::read_to_string(path)?;
    parse_payload(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FaceRecord;

    #[test]
    fn accepts_envelope_and_bare_dataset() {
        let body = r#"{"points":[{"x":0,"y":0,"e":1,"w":[2]}],"faces":[[0,0,0]],"zLabel":"Depth"}"#;
        let wrapped = format!(r#"{{"data":{}}}"#, body);

        let bare = parse_payload(body).unwrap().unwrap();
        let env = parse_payload(&wrapped).unwrap().unwrap();

        assert_eq!(bare, env);
        assert_eq!(env.faces, vec![FaceRecord([0, 0, 0])]);
        assert_eq!(env.z_label.as_deref(), Some("Depth"));
    }

    #[test]
    fn null_data_is_no_dataset() {
        assert!(parse_payload(r#"{"data":null}"#).unwrap().is_none());
    }

    #[test]
    fn malformed_face_is_a_parse_error() {
        let err = parse_payload(r#"{"points":[],"faces":[[0,1]]}"#).unwrap_err();
        assert!(matches!(err, crate::error::PlotError::Json(_)));
    }
}
