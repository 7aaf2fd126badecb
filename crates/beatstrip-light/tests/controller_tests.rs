use beatstrip_core::{Command, PayloadValue};
use beatstrip_light::{LightController, SceneDoc};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn test_command_stream_to_binary_frames() {
    let mut controller = LightController::new();
    controller.set_binary_send_interval(Duration::ZERO);

    let captured = Rc::new(RefCell::new(Vec::new()));
    let sink = captured.clone();
    controller.register_output_callback(move |message| {
        sink.borrow_mut().push(message.clone());
    });

    // The command sequence a switcher would emit over a few frames
    let commands = vec![
        Command::new("/scene/1/change_effect", PayloadValue::Int(2)),
        Command::new(
            "/scene/1/effect/2/segment/1/color",
            PayloadValue::VecInt(vec![0, 1, 2, 3]),
        ),
        Command::new(
            "/scene/1/effect/2/segment/1/dimmer_time_ratio",
            PayloadValue::Double(0.85),
        ),
        Command::new(
            "/scene/1/change_palette",
            PayloadValue::String("C".to_string()),
        ),
    ];

    for command in &commands {
        controller.handle_input_data(command);
        controller.scene_update();
        controller.send_led_binary_data();
    }

    let scene = controller.scene(1).expect("scene");
    assert_eq!(scene.current_effect_id(), Some(2));
    assert_eq!(scene.current_palette(), "C");
    let segment = &scene.effect(2).expect("effect").segments()[&1];
    assert_eq!(segment.color(), &[0, 1, 2, 3]);
    assert!((segment.dimmer_time_ratio() - 0.85).abs() < 1e-6);

    // One frame pair per loop iteration
    let messages = captured.borrow();
    assert_eq!(messages.len(), 2 * commands.len());
    for message in messages.iter() {
        assert!(message.address.starts_with("/light/serial/"));
        let bytes = message.payload.as_bytes().expect("bytes");
        assert_eq!(bytes.len() % 4, 0);
    }
}

#[cfg(feature = "scene-files")]
#[test]
fn test_load_effects_replaces_scene_from_file() {
    use beatstrip_light::{EffectDoc, SegmentDoc};
    use std::collections::BTreeMap;

    // Write a small scene document to a temp path
    let mut segments = BTreeMap::new();
    segments.insert(
        "1".to_string(),
        SegmentDoc {
            segment_id: 1,
            color: vec![0, 1, 2, 3],
            transparency: vec![1.0, 1.0, 1.0, 1.0],
            length: vec![5, 0, 0],
            move_speed: 3.0,
            move_range: vec![0, 99],
            initial_position: 10,
            current_position: 55.0,
            is_edge_reflect: true,
            dimmer_time: vec![0, 100, 200, 100, 500],
            dimmer_time_ratio: 1.0,
            gradient: false,
            fade: true,
            gradient_colors: vec![0, -1, -1],
        },
    );
    let mut effects = BTreeMap::new();
    effects.insert(
        "5".to_string(),
        EffectDoc {
            effect_id: 5,
            led_count: 100,
            fps: 20,
            time: 0.0,
            current_palette: "B".to_string(),
            segments,
        },
    );
    let mut palettes = beatstrip_core::PaletteMap::new();
    palettes.insert("B".to_string(), vec![[1, 2, 3], [4, 5, 6]]);
    let doc = SceneDoc {
        scene_id: 1,
        current_effect_id: Some(5),
        current_palette: "B".to_string(),
        palettes,
        effects,
    };

    let path = std::env::temp_dir().join(format!(
        "beatstrip_scene_{}_{}.json",
        std::process::id(),
        line!()
    ));
    doc.save(&path).expect("write scene file");

    let mut controller = LightController::new();
    controller.handle_input_data(&Command::new(
        "/scene/1/load_effects",
        PayloadValue::String(path.to_string_lossy().to_string()),
    ));

    let scene = controller.scene(1).expect("scene");
    assert_eq!(scene.effects().len(), 1);
    assert_eq!(scene.current_effect_id(), Some(5));
    assert_eq!(scene.current_palette(), "B");
    let segment = &scene.effect(5).expect("effect").segments()[&1];
    // The stored runtime position is discarded on load
    assert_eq!(segment.current_position(), 10.0);
    assert!(segment.fade());

    std::fs::remove_file(&path).ok();
}

#[cfg(feature = "scene-files")]
#[test]
fn test_load_effects_missing_file_keeps_scene() {
    let mut controller = LightController::new();
    controller.handle_input_data(&Command::new(
        "/scene/1/load_effects",
        PayloadValue::String("/no/such/beatstrip_scene.json".to_string()),
    ));
    let scene = controller.scene(1).expect("scene");
    assert_eq!(scene.effects().len(), 9);
}

#[cfg(not(feature = "scene-files"))]
#[test]
fn test_load_effects_without_filesystem_reports_error() {
    let captured = Rc::new(RefCell::new(Vec::new()));
    let mut controller = LightController::new();
    let sink = captured.clone();
    controller.register_output_callback(move |message| {
        sink.borrow_mut().push(message.clone());
    });
    controller.handle_input_data(&Command::new(
        "/scene/1/load_effects",
        PayloadValue::String("classic.json".to_string()),
    ));
    let messages = captured.borrow();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].address, "/scene/1/load_error");
}
