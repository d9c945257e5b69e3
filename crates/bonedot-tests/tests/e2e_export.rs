//! End-to-end tests for `.bdsket` export from scene documents.

use bonedot_backend_rig::{AnimationHost, DocumentHost, Exporter, RigError};
use bonedot_spec::export::validate_document;
use bonedot_spec::{ErrorCode, ExportConfig, ExportDocument, LocationKey, ObjectStatus};
use bonedot_tests::fixtures::{chain_rig_scene, SceneFixture};
use pretty_assertions::assert_eq;

fn assert_angles(keys: &[bonedot_spec::RotationKey], expected: &[(i32, f64)]) {
    assert_eq!(keys.len(), expected.len());
    for (key, (frame, angle)) in keys.iter().zip(expected) {
        assert_eq!(key.frame, *frame);
        assert!(
            (key.angle - angle).abs() < 1e-6,
            "frame {}: {} != {}",
            frame,
            key.angle,
            angle
        );
    }
}

#[test]
fn chain_rig_exports_bones_meshes_and_animations() {
    let mut host = DocumentHost::new(chain_rig_scene());
    let (doc, report) = Exporter::default()
        .export(&mut host, &["rig", "lamp"])
        .unwrap();

    // the empty is reported, the armature still exports
    assert!(!report.ok);
    assert_eq!(report.entry("rig").unwrap().status, ObjectStatus::Finished);
    let lamp = report.entry("lamp").unwrap();
    assert_eq!(lamp.status, ObjectStatus::Cancelled);
    assert_eq!(
        lamp.error.as_ref().unwrap().code,
        ErrorCode::WrongObjectType.code()
    );

    assert_eq!(doc.armatures.len(), 1);
    let rig = doc.armature("rig").unwrap();

    let a = rig.bone("A").unwrap();
    let b = rig.bone("B").unwrap();
    assert_eq!(a.parent, None);
    assert_eq!(b.parent.as_deref(), Some("A"));
    assert_eq!(a.angle, 1.570796);
    assert_eq!(b.angle, 1.570796);
    assert_eq!(b.head, [0.0, 1.0]);
    assert_eq!(b.tail, [0.0, 2.0]);

    assert_eq!(rig.textures.len(), 1);
    assert_eq!(rig.textures[0].texture, "textures/body.png");
    assert_eq!(rig.textures[0].size, [50, 200]);

    let mesh = &rig.meshes[0];
    assert_eq!(mesh.name, "body");
    assert_eq!(mesh.texture, "textures/body.png");
    assert_eq!(mesh.z_hint, 0.25);
    assert_eq!(mesh.vertices, vec![[-0.5, 0.0], [0.5, 0.0], [0.5, 2.0], [-0.5, 2.0]]);
    assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    assert_eq!(mesh.uvs[2], [1.0, 1.0]);
    assert_eq!(mesh.weights[3].get("B"), Some(&1.0));

    let names: Vec<&str> = rig.animations.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["wave", "hold"]);

    let wave = &rig.animation("wave").unwrap().data;
    assert_eq!(wave.fps, 5);
    let track_a = wave.track("A").unwrap();
    assert_eq!(track_a.location, vec![LocationKey::new(1, 0.0, 0.0)]);
    assert_angles(&track_a.rotation, &[(1, 0.0)]);

    let track_b = wave.track("B").unwrap();
    assert_eq!(track_b.location, vec![LocationKey::new(1, 0.0, 1.0)]);
    assert_angles(
        &track_b.rotation,
        &[
            (1, 0.0),
            (2, 0.392699),
            (3, 0.785398),
            (4, 1.178097),
            (5, 1.570796),
        ],
    );

    let hold = &rig.animation("hold").unwrap().data;
    assert_eq!(hold.fps, 4);
    for track in &hold.tracks {
        assert_eq!(track.location.len(), 1);
        assert_eq!(track.rotation.len(), 1);
        assert_eq!(track.location[0].frame, 0);
    }

    assert!(validate_document(&doc).is_empty());
}

#[test]
fn export_restores_host_state_and_ignores_baked_copies() {
    let mut host = DocumentHost::new(chain_rig_scene());
    let exporter = Exporter::new(ExportConfig::default());

    let (first, _) = exporter.export(&mut host, &["rig"]).unwrap();
    assert_eq!(host.frame_current(), 1);
    assert_eq!(host.active_action("rig").unwrap(), None);
    assert!(host.scene().action("wave_baked").is_some());

    // a second export sees the baked copies but does not export them
    let (second, report) = exporter.export(&mut host, &["rig"]).unwrap();
    assert!(report.ok);
    assert_eq!(first, second);
}

#[test]
fn empty_selection_is_an_error() {
    let mut host = DocumentHost::new(chain_rig_scene());
    let selection: [&str; 0] = [];
    assert!(matches!(
        Exporter::default().export(&mut host, &selection),
        Err(RigError::EmptySelection)
    ));
}

#[test]
fn bdsket_file_round_trips() {
    let fixture = SceneFixture::new();
    let mut host = DocumentHost::new(chain_rig_scene());
    let (doc, _) = Exporter::default().export(&mut host, &["rig"]).unwrap();

    let path = fixture.path().join("rig.bdsket");
    let hash = doc.write(&path, true).unwrap();
    assert_eq!(hash.len(), 64);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"format\": \"bdsket\""));
    assert!(text.contains("[\n"));

    let read = ExportDocument::read(&path).unwrap();
    assert_eq!(read, doc);
}

#[test]
fn cli_export_writes_valid_document() {
    let fixture = SceneFixture::new();
    let scene_path = fixture.write_scene("scene.json", &chain_rig_scene());
    let out = fixture.path().join("out.bdsket");

    bonedot_cli::commands::export::run(
        scene_path.to_str().unwrap(),
        &["rig".to_string()],
        out.to_str().unwrap(),
        &ExportConfig::default().pretty(false),
        true,
    )
    .unwrap();

    let doc = ExportDocument::read(&out).unwrap();
    assert_eq!(doc.armatures[0].animations.len(), 2);
    assert!(validate_document(&doc).is_empty());
    assert!(!std::fs::read_to_string(&out).unwrap().contains('\n'));
}
