use serde_json::json;

use terrain3d::{PlotConfig, PlotError, TerrainPlot, load_payload, parse_payload};

#[test]
fn ragged_stages_are_rejected_before_any_scene_change() {
    let payload = json!({
        "data": {
            "points": [
                { "x": 0.0, "y": 0.0, "e": 0.0, "w": [1.0, 2.0] },
                { "x": 1.0, "y": 0.0, "e": 0.0, "w": [1.0] },
                { "x": 0.0, "y": 1.0, "e": 0.0, "w": [1.0, 2.0] }
            ],
            "faces": [[0, 1, 2]]
        }
    });
    let dataset = parse_payload(&payload.to_string()).unwrap();

    let mut plot = TerrainPlot::new(PlotConfig::default());
    let err = plot.plot(dataset).unwrap_err();
    assert!(matches!(err, PlotError::InvalidDataset(ref msg) if msg.contains("point 1")));
    assert!(plot.scene().is_empty());
    assert_eq!(plot.current_stage(), None);
}

#[test]
fn faces_must_reference_existing_points() {
    let payload = json!({
        "points": [
            { "x": 0.0, "y": 0.0, "e": 0.0, "w": [1.0] },
            { "x": 1.0, "y": 0.0, "e": 0.0, "w": [1.0] },
            { "x": 0.0, "y": 1.0, "e": 0.0, "w": [1.0] }
        ],
        "faces": [[0, 1, 2], [1, 2, 3]]
    });
    let dataset = parse_payload(&payload.to_string()).unwrap();

    let mut plot = TerrainPlot::new(PlotConfig::default());
    let err = plot.plot(dataset).unwrap_err();
    assert!(matches!(err, PlotError::InvalidDataset(ref msg) if msg.contains("face 1")));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(parse_payload("{\"data\": [1, 2"), Err(PlotError::Json(_))));
    assert!(matches!(
        parse_payload(r#"{"data": {"points": [{"x": "east"}]}}"#),
        Err(PlotError::Json(_))
    ));
}

#[test]
fn payload_loads_from_disk() {
    let path = std::env::temp_dir().join(format!("terrain3d-payload-{}.json", std::process::id()));
    let payload = json!({
        "data": {
            "points": [
                { "x": 0.0, "y": 0.0, "e": 1.0, "w": [2.0, 3.0] },
                { "x": 5.0, "y": 0.0, "e": 1.5, "w": [2.0, 3.0] },
                { "x": 0.0, "y": 5.0, "e": 0.5, "w": [2.0, 3.0] }
            ],
            "faces": [[0, 2, 1]],
            "xLabel": "Easting"
        }
    });
    std::fs::write(&path, payload.to_string()).unwrap();

    let dataset = load_payload(&path).unwrap().unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(dataset.number_of_stages(), 2);
    assert_eq!(dataset.x_label.as_deref(), Some("Easting"));

    let mut plot = TerrainPlot::new(PlotConfig::default());
    plot.plot(Some(dataset)).unwrap();
    assert_eq!(plot.axis_names(), ("Easting", "Y"));
    assert!(plot.last_stage());
    assert_eq!(plot.stage_label().as_deref(), Some("Stage 2 of 2"));
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("terrain3d-definitely-missing.json");
    assert!(matches!(load_payload(&path), Err(PlotError::Io(_))));
}
