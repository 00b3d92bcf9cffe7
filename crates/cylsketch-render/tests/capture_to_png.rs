//! Integration test: draw, unroll, render with the shipped program, and
//! save numbered snapshots.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use cylsketch_core::{Control, FrameInput, Session, SketchConfig};
use cylsketch_render::{ResourceManager, SnapshotWriter, SoftwareRenderer, submit_frame};

fn frame(controls: &[Control], look: [f64; 2]) -> FrameInput {
    FrameInput {
        delta_time: 1.0 / 60.0,
        look_delta: look,
        held: controls.iter().copied().collect(),
    }
}

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

#[test]
fn capture_renders_and_saves_after_existing_snapshots() {
    let mut resources = ResourceManager::new(workspace_root().join("resources"));
    let program = resources
        .load_program(
            "default",
            "programs/default.vertex.json",
            "programs/default.fragment.json",
        )
        .expect("shipped program should load");

    let out = tempfile::tempdir().unwrap();
    std::fs::write(out.path().join("render4.png"), b"").unwrap();
    let mut writer = SnapshotWriter::new(out.path());

    let mut session = Session::new(SketchConfig::default()).unwrap();
    for _ in 0..120 {
        session.frame(&frame(&[Control::Draw], [20.0, 1.0]));
    }
    session.frame(&frame(&[Control::Flatten], [0.0, 0.0]));
    let outcome = session.frame(&frame(&[], [0.0, 0.0]));
    assert!(outcome.capture);

    let mut renderer = SoftwareRenderer::new(320, 180).unwrap();
    let render_frame = session.render_frame(renderer.aspect());
    submit_frame(&mut renderer, &render_frame, Some(&program));
    let image = renderer.to_image();

    let white = image
        .pixels()
        .filter(|p| p.0[..3].iter().all(|&c| c > 200))
        .count();
    eprintln!("{white} stroke pixels");
    assert!(white > 100);

    let path = writer.write(&image).unwrap();
    assert_eq!(path, out.path().join("render5.png"));
    let decoded = image::open(&path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (320, 180));
}

#[test]
fn missing_program_renders_blank_frames() {
    let mut resources = ResourceManager::new(workspace_root().join("resources"));
    let loaded = resources.load_program(
        "ghost",
        "programs/ghost.vertex.json",
        "programs/ghost.fragment.json",
    );
    assert!(loaded.is_none());

    let session = Session::new(SketchConfig::default()).unwrap();
    let mut renderer = SoftwareRenderer::new(32, 18).unwrap();
    let program = resources.program("ghost");
    let frame = session.render_frame(renderer.aspect());
    submit_frame(&mut renderer, &frame, program.as_deref());
    assert!(renderer.to_image().pixels().all(|p| p.0 == [0, 0, 0, 255]));
}
