use std::{path::PathBuf, process::Command};

use image::{Rgb, RgbImage};

fn bin() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_spritemill")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "spritemill.exe"
            } else {
                "spritemill"
            });
            p
        })
}

#[test]
fn no_arguments_prints_usage_and_exits_non_zero() {
    let out = Command::new(bin()).output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn unpack_without_source_prints_usage_and_exits_non_zero() {
    let out = Command::new(bin()).arg("unpack").output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn unpack_of_a_missing_source_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("ghost_cubemap_4k.png");

    let out = Command::new(bin()).arg("unpack").arg(&missing).output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found"));
}

#[test]
fn unpack_writes_six_faces_with_a_folder_override_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mars_cubemap_4k.png");
    RgbImage::from_pixel(32, 24, Rgb([120, 60, 20]))
        .save(&source)
        .unwrap();

    let cfg_path = dir.path().join("pipeline.json");
    std::fs::write(&cfg_path, r#"{ "face_size": 8 }"#).unwrap();

    let out = Command::new(bin())
        .arg("unpack")
        .arg(&source)
        .arg("terrain")
        .arg("--config")
        .arg(&cfg_path)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let out_dir = dir.path().join("terrain");
    for tag in ["px", "nx", "py", "ny", "pz", "nz"] {
        let face = image::open(out_dir.join(format!("{tag}.jpg"))).unwrap();
        assert_eq!((face.width(), face.height()), (8, 8));
    }
}
