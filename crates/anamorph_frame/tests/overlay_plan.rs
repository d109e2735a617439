use anamorph_frame::{AspectRatio, OverlayMode, OverlayPlan};

#[test]
fn every_catalog_ratio_fits_inside_the_surface() {
    for &(w, h) in &[(1920.0, 1080.0), (1080.0, 1920.0), (1000.0, 1000.0)] {
        for &aspect in AspectRatio::catalog() {
            let plan = OverlayPlan::build(w, h, aspect, OverlayMode::Matte, 0.5, 1.0);
            let frame = plan.frame;

            assert!(frame.x >= 0.0 && frame.y >= 0.0, "{aspect} in {w}x{h}");
            assert!(frame.right() <= w + 1e-9 && frame.bottom() <= h + 1e-9);
            assert!((frame.w / frame.h - aspect.value()).abs() < 1e-9);
            // One axis always spans the surface
            assert!((frame.w - w).abs() < 1e-9 || (frame.h - h).abs() < 1e-9);
        }
    }
}

#[test]
fn plan_serializes_for_canvas_replay() {
    let plan = OverlayPlan::build(
        1920.0,
        1080.0,
        AspectRatio::ACADEMY,
        OverlayMode::Matte,
        0.75,
        2.0,
    );
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["aspect"], "4:3");
    assert_eq!(json["mode"], "matte");
    assert_eq!(json["frame"]["w"], 1440.0);
    assert_eq!(json["frame"]["x"], 240.0);
    assert_eq!(json["mattes"].as_array().unwrap().len(), 4);
    assert_eq!(json["mattes"][2]["rect"]["w"], 240.0);
    assert_eq!(json["outline"]["line_width"], 4.0);
    assert_eq!(json["center"]["lines"].as_array().unwrap().len(), 2);
    assert_eq!(json["thirds"]["lines"].as_array().unwrap().len(), 4);
    assert_eq!(json["thirds"]["color"]["a"], 0.25);
}

#[test]
fn frame_mode_has_no_mattes() {
    let plan = OverlayPlan::build(
        800.0,
        600.0,
        AspectRatio::VERTICAL,
        OverlayMode::Frame,
        1.0,
        1.0,
    );
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["mode"], "frame");
    assert!(json["mattes"].as_array().unwrap().is_empty());
}
