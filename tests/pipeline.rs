// End-to-end: parser JSON in, manifest out.

use sloperkit::{assemble, run_pipeline, Drawing, RenderConfig};

const LABELED_PIECE: &str = r#"{
    "entities": [
        {"type": "POLYLINE", "closed": true, "vertices": [
            {"x": 0, "y": 0}, {"x": 200, "y": 0}, {"x": 200, "y": 300}, {"x": 0, "y": 300}]},
        {"type": "TEXT", "startPoint": {"x": 50, "y": 120}, "text": "Size: M", "rotation": 90},
        {"type": "TEXT", "startPoint": {"x": 50, "y": 180}, "text": "Piece Name: boke_Sleeve", "rotation": 90},
        {"type": "DIMENSION", "ignored": true},
        {"type": "INSERT", "name": "missing-block", "insert": {"x": 900, "y": 900}}
    ]
}"#;

#[test]
fn labeled_drawing_produces_named_manifest() {
    let drawing = Drawing::from_json_str(LABELED_PIECE).unwrap();
    let config = RenderConfig::default();
    let output = run_pipeline(&drawing, &config);

    // The unsupported entity and the unresolved INSERT contribute nothing.
    assert_eq!(output.pieces.len(), 1);
    let piece = &output.pieces[0];
    assert_eq!(piece.entity_index, 0);
    assert_eq!(piece.entity_type, "POLYLINE");
    assert_eq!(piece.claimed_texts.len(), 2);
    // Both labels read at math 90 degrees (north 0): already upright.
    assert_eq!(piece.rotation_applied, 0.0);
    assert!(piece.image.is_some());

    let manifest = assemble("dress-m.dxf", &output);
    assert_eq!(manifest.file_info.sloper_name, "dress-m");
    assert_eq!(manifest.file_info.size, "M");
    assert_eq!(manifest.cut.len(), 1);
    assert_eq!(manifest.cut[0].name, "Sleeve");
    assert_eq!(manifest.cut[0].zoom, 1.0);
    assert!(manifest.cut[0].url.starts_with("data:image/png;base64,"));
    assert!(manifest.file_info.width > 0.0);
    assert!(manifest.file_info.height > 0.0);
}

#[test]
fn sideways_labels_rotate_the_piece_upright() {
    let json = r#"{
        "entities": [
            {"type": "POLYLINE", "closed": true, "vertices": [
                {"x": 0, "y": 0}, {"x": 200, "y": 0}, {"x": 200, "y": 100}, {"x": 0, "y": 100}]},
            {"type": "TEXT", "startPoint": {"x": 80, "y": 40}, "text": "Piece Name: boke_Belt", "rotation": 0}
        ]
    }"#;
    let drawing = Drawing::from_json_str(json).unwrap();
    let output = run_pipeline(&drawing, &RenderConfig::default());

    let piece = &output.pieces[0];
    // Math 0 reads east; north angle -90, so the piece rotates to stand up.
    assert!((piece.rotation_applied - -90.0).abs() < 1e-9);
    let image = piece.image.as_ref().unwrap();
    // The 200x100 piece is taller than wide once upright.
    assert!(image.height > image.width);
}

#[test]
fn empty_drawing_is_not_an_error() {
    let drawing = Drawing::from_json_str(r#"{"entities": []}"#).unwrap();
    let output = run_pipeline(&drawing, &RenderConfig::default());
    assert!(output.pieces.is_empty());
    assert!(output.overall.is_none());

    let manifest = assemble("empty.dxf", &output);
    assert_eq!(manifest.cut.len(), 0);
    assert_eq!(manifest.file_info.width, 0.0);
}
