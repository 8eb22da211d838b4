#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fenscan() -> Command {
    Command::cargo_bin("fenscan").expect("binary built")
}

/// Framed 8x8 board on a light background, written as PNG.
fn write_board_png(path: &std::path::Path) {
    let (side, margin) = (200u32, 20u32);
    let inner = side - 2 * margin;
    let img = image::GrayImage::from_fn(side, side, |x, y| {
        let inside = (margin..margin + inner).contains(&x) && (margin..margin + inner).contains(&y);
        if !inside {
            return image::Luma([235]);
        }
        let (u, v) = (x - margin, y - margin);
        if u < 2 || v < 2 || u >= inner - 2 || v >= inner - 2 {
            return image::Luma([20]);
        }
        let dark = (u / 20 + v / 20) % 2 == 1;
        image::Luma([if dark { 60 } else { 230 }])
    });
    img.save(path).expect("write png");
}

#[test]
fn show_draws_the_board() {
    fenscan()
        .args(["show", "8/8/8/8/8/8/8/K7 w - - 0 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 ♔ · · · · · · · 1"))
        .stdout(predicate::str::contains("   a  b  c  d  e  f  g  h"));
}

#[test]
fn show_rejects_malformed_fen() {
    fenscan()
        .args(["show", "8/8/8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 8 ranks"));
}

#[test]
fn encode_labels_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("labels.json");
    let mut labels = vec![0usize; 64];
    labels[4] = 12;
    labels[60] = 6;
    std::fs::write(&path, serde_json::to_string(&labels).expect("json")).expect("write");

    fenscan()
        .arg("encode")
        .arg(&path)
        .assert()
        .success()
        .stdout("4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1\n");
}

#[test]
fn encode_reads_stdin_and_honours_suffix_params() {
    let dir = tempdir().expect("tempdir");
    let params = dir.path().join("params.json");
    std::fs::write(&params, r#"{ "suffix": { "side_to_move": "black" } }"#).expect("write");

    fenscan()
        .arg("--params")
        .arg(&params)
        .args(["encode", "-"])
        .write_stdin(serde_json::to_string(&vec![0usize; 64]).expect("json"))
        .assert()
        .success()
        .stdout("8/8/8/8/8/8/8/8 b KQkq - 0 1\n");
}

#[test]
fn encode_reports_shape_errors() {
    fenscan()
        .args(["encode", "-"])
        .write_stdin("[0, 1, 2]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("classification shape"));
}

#[test]
fn init_params_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("params.json");

    fenscan().arg("init-params").arg(&path).assert().success();
    let raw = std::fs::read_to_string(&path).expect("params written");
    assert!(raw.contains("\"board_px\": 256"));

    fenscan()
        .arg("--params")
        .arg(&path)
        .args(["show", "8/8/8/8/8/8/8/8"])
        .assert()
        .success();
}

#[test]
fn invalid_params_fail_before_work() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("params.json");
    std::fs::write(&path, r#"{ "tessellate": { "tile_px": 24 } }"#).expect("write");

    fenscan()
        .arg("--params")
        .arg(&path)
        .args(["show", "8/8/8/8/8/8/8/8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not divisible"));
}

#[test]
fn corners_prints_json() {
    let dir = tempdir().expect("tempdir");
    let img = dir.path().join("board.png");
    write_board_png(&img);

    let out = fenscan().arg("corners").arg(&img).assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");
    let corners: Vec<[f32; 2]> = serde_json::from_str(&stdout).expect("corner json");
    assert_eq!(corners.len(), 4);
    assert!((corners[0][0] - 20.0).abs() < 1.5 && (corners[0][1] - 20.0).abs() < 1.5);
    assert!((corners[2][0] - 180.0).abs() < 1.5 && (corners[2][1] - 180.0).abs() < 1.5);
}

#[test]
fn rectify_writes_board_and_tiles() {
    let dir = tempdir().expect("tempdir");
    let img = dir.path().join("board.png");
    let out = dir.path().join("top.png");
    let tiles = dir.path().join("tiles");
    write_board_png(&img);

    fenscan()
        .arg("rectify")
        .arg(&img)
        .args(["--corners", "180,180,20,20,180,20,20,180"])
        .arg("--out")
        .arg(&out)
        .arg("--tiles-dir")
        .arg(&tiles)
        .assert()
        .success();

    let top = image::open(&out).expect("rectified png").to_luma8();
    assert_eq!(top.dimensions(), (256, 256));
    assert_eq!(std::fs::read_dir(&tiles).expect("tiles dir").count(), 64);

    let a8 = image::open(tiles.join("a8.png")).expect("a8").to_luma8();
    let b8 = image::open(tiles.join("b8.png")).expect("b8").to_luma8();
    assert_eq!(a8.dimensions(), (32, 32));
    assert!(a8.get_pixel(16, 16).0[0] > 200);
    assert!(b8.get_pixel(16, 16).0[0] < 100);
}

#[test]
fn rectify_rejects_bad_corner_list() {
    let dir = tempdir().expect("tempdir");
    let img = dir.path().join("board.png");
    write_board_png(&img);

    fenscan()
        .arg("rectify")
        .arg(&img)
        .args(["--corners", "1,2,3"])
        .arg("--out")
        .arg(dir.path().join("top.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("8 comma-separated"));
}
