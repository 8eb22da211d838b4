use std::sync::{Arc, Mutex};

use fenscan::board::{DetectionBox, RectifiedBoard, RegionOfInterest, SelectedRegion, TileSet};
use fenscan::core::{homography_from_4pt, CornerSet, GrayImage, GrayImageView};
use fenscan::fen::{BoardField, Classification, Piece, EMPTY_LABEL};
use fenscan::{
    BoardDetector, Exclusive, ExclusiveClassifier, ModelError, Pipeline, PipelineErrorKind,
    PipelineObserver, PipelineParams, PreparedFrame, TileClassifier,
};
use nalgebra::Point2;

const BOARD_UNITS: f32 = 160.0;
const SQUARE_UNITS: f32 = BOARD_UNITS / 8.0;
const BACKGROUND: u8 = 235;
const POSITION: &str = "4k3/8/8/3q4/8/2N5/8/R3K2R";
const QUAD: [(f32, f32); 4] = [(60.0, 50.0), (250.0, 56.0), (244.0, 246.0), (54.0, 238.0)];

/// Gray level of the marker painted for a piece label.
fn marker_level(label: usize) -> u8 {
    (95 + 10 * label) as u8
}

fn board_color(board: &BoardField, u: f32, v: f32) -> u8 {
    if u < 2.0 || v < 2.0 || u >= BOARD_UNITS - 2.0 || v >= BOARD_UNITS - 2.0 {
        return 20;
    }
    let (c, r) = ((u / SQUARE_UNITS) as usize, (v / SQUARE_UNITS) as usize);
    if let Some(piece) = board.get(r * 8 + c) {
        let du = u - (c as f32 + 0.5) * SQUARE_UNITS;
        let dv = v - (r as f32 + 0.5) * SQUARE_UNITS;
        if du.abs() < SQUARE_UNITS * 0.25 && dv.abs() < SQUARE_UNITS * 0.25 {
            return marker_level(piece.label());
        }
    }
    if (r + c) % 2 == 0 {
        230
    } else {
        60
    }
}

/// 400x300 photo with the board's corners on `QUAD`.
fn photo(board: &BoardField) -> GrayImage {
    let rect = [
        Point2::new(0.0, 0.0),
        Point2::new(BOARD_UNITS, 0.0),
        Point2::new(BOARD_UNITS, BOARD_UNITS),
        Point2::new(0.0, BOARD_UNITS),
    ];
    let h = homography_from_4pt(&QUAD.map(|(x, y)| Point2::new(x, y)), &rect).expect("homography");

    let mut img = GrayImage::new(400, 300);
    for y in 0..300 {
        for x in 0..400 {
            let p = h.apply(Point2::new(x as f32 + 0.5, y as f32 + 0.5));
            let inside = (0.0..BOARD_UNITS).contains(&p.x) && (0.0..BOARD_UNITS).contains(&p.y);
            img.put(x, y, if inside { board_color(board, p.x, p.y) } else { BACKGROUND });
        }
    }
    img
}

/// Reports a box around the board plus two decoys.
struct ScriptedDetector {
    boxes: Vec<DetectionBox>,
}

impl ScriptedDetector {
    fn around_board() -> Self {
        // working image is 400x300, so the detection frame covers the
        // top-left 300x300 square at 128px
        let s = 300.0 / 128.0;
        Self {
            boxes: vec![
                DetectionBox::new(20.0, 110.0, 15.0, 15.0, 0.95),
                DetectionBox::new(152.0 / s, 148.0 / s, 196.0 / s, 196.0 / s, 0.8),
                DetectionBox::new(64.0, 64.0, 30.0, 30.0, 0.1),
            ],
        }
    }
}

impl BoardDetector for ScriptedDetector {
    fn detect(&self, frame: &GrayImageView<'_>) -> Result<Vec<DetectionBox>, ModelError> {
        assert_eq!((frame.width, frame.height), (128, 128));
        Ok(self.boxes.clone())
    }
}

/// Decodes the marker gray level in the middle of each tile.
struct MarkerClassifier;

fn classify_tiles(tiles: &TileSet) -> Classification {
    let labels = tiles
        .iter()
        .map(|tile| {
            let side = tile.image.width;
            let (lo, hi) = (side * 3 / 8, side * 5 / 8);
            let mut sum = 0u32;
            for y in lo..hi {
                for x in lo..hi {
                    sum += tile.image.get(x, y) as u32;
                }
            }
            let mean = sum as f32 / ((hi - lo) * (hi - lo)) as f32;
            let label = ((mean - 95.0) / 10.0).round();
            if (1.0..=12.0).contains(&label) {
                label as usize
            } else {
                EMPTY_LABEL
            }
        })
        .collect();
    Classification::Labels(labels)
}

impl TileClassifier for MarkerClassifier {
    fn classify(&self, tiles: &TileSet) -> Result<Classification, ModelError> {
        Ok(classify_tiles(tiles))
    }
}

struct FixedClassifier(Classification);

impl TileClassifier for FixedClassifier {
    fn classify(&self, _tiles: &TileSet) -> Result<Classification, ModelError> {
        Ok(self.0.clone())
    }
}

fn pipeline(
    detector: impl BoardDetector + 'static,
    classifier: impl TileClassifier + 'static,
) -> Pipeline {
    Pipeline::new(Arc::new(detector), Arc::new(classifier), PipelineParams::default())
        .expect("valid params")
}

#[test]
fn reads_position_from_synthetic_photo() {
    let position = BoardField::parse(POSITION).expect("valid");
    let img = photo(&position);

    let result = pipeline(ScriptedDetector::around_board(), MarkerClassifier)
        .run(&img.view())
        .expect("scan");

    assert_eq!(result.fen, format!("{POSITION} w KQkq - 0 1"));
    assert_eq!(result.board, position);
    assert_eq!(result.region.index, 1);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    for (p, (x, y)) in result.corners.points().iter().zip(QUAD) {
        let d = (*p - Point2::new(x, y)).norm();
        assert!(d < 3.0, "corner {p:?} is {d:.2}px from ({x}, {y})");
    }
}

#[test]
fn repeated_runs_are_identical() {
    let position = BoardField::parse(POSITION).expect("valid");
    let img = photo(&position);
    let p = pipeline(ScriptedDetector::around_board(), MarkerClassifier);

    let first = p.run(&img.view()).expect("scan");
    let second = p.run(&img.view()).expect("scan");
    assert_eq!(first, second);
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn push(&self, e: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(e);
        }
    }
}

impl PipelineObserver for Recorder {
    fn on_frame(&self, frame: &PreparedFrame) {
        self.push(format!("frame {}", frame.detection.width));
    }

    fn on_region(&self, region: &SelectedRegion, roi: &RegionOfInterest, crop: &GrayImage) {
        assert_eq!((crop.width, crop.height), (roi.width, roi.height));
        self.push(format!("region {}", region.index));
    }

    fn on_corners(&self, _corners: &CornerSet) {
        self.push("corners".to_string());
    }

    fn on_rectified(&self, board: &RectifiedBoard) {
        self.push(format!("rectified {}", board.side()));
    }

    fn on_tiles(&self, tiles: &TileSet) {
        self.push(format!("tiles {}", tiles.len()));
    }
}

#[test]
fn observer_sees_every_stage_without_changing_the_result() {
    let position = BoardField::parse(POSITION).expect("valid");
    let img = photo(&position);

    let plain = pipeline(ScriptedDetector::around_board(), MarkerClassifier);
    let recorder = Arc::new(Recorder::default());
    let observed = plain.clone().with_observer(recorder.clone());

    assert_eq!(
        plain.run(&img.view()).expect("scan"),
        observed.run(&img.view()).expect("scan")
    );
    let events = recorder.events.lock().expect("lock").clone();
    assert_eq!(
        events,
        vec!["frame 128", "region 1", "corners", "rectified 256", "tiles 64"]
    );
}

struct Silent;

impl BoardDetector for Silent {
    fn detect(&self, _frame: &GrayImageView<'_>) -> Result<Vec<DetectionBox>, ModelError> {
        Ok(Vec::new())
    }
}

struct Broken;

impl BoardDetector for Broken {
    fn detect(&self, _frame: &GrayImageView<'_>) -> Result<Vec<DetectionBox>, ModelError> {
        Err(ModelError::new("session closed"))
    }
}

#[test]
fn failures_map_to_error_kinds() {
    let position = BoardField::parse(POSITION).expect("valid");
    let img = photo(&position);
    let blank = GrayImage::from_raw(400, 300, vec![BACKGROUND; 400 * 300]).expect("valid");

    let err = pipeline(Silent, MarkerClassifier).run(&img.view()).unwrap_err();
    assert_eq!(err.kind(), PipelineErrorKind::NoDetection);

    let err = pipeline(Broken, MarkerClassifier).run(&img.view()).unwrap_err();
    assert_eq!(err.kind(), PipelineErrorKind::Detector);
    assert!(err.to_string().contains("session closed"));

    let err = pipeline(ScriptedDetector::around_board(), MarkerClassifier)
        .run(&blank.view())
        .unwrap_err();
    assert_eq!(err.kind(), PipelineErrorKind::NoContour);

    let short = FixedClassifier(Classification::Labels(vec![EMPTY_LABEL; 63]));
    let err = pipeline(ScriptedDetector::around_board(), short)
        .run(&img.view())
        .unwrap_err();
    assert_eq!(err.kind(), PipelineErrorKind::ClassificationShape);

    let narrow = FixedClassifier(Classification::Scores(vec![vec![1.0; 12]; 64]));
    let err = pipeline(ScriptedDetector::around_board(), narrow)
        .run(&img.view())
        .unwrap_err();
    assert_eq!(err.kind(), PipelineErrorKind::ClassificationShape);

    let err = pipeline(Silent, MarkerClassifier)
        .run(&GrayImage::new(0, 0).view())
        .unwrap_err();
    assert_eq!(err.kind(), PipelineErrorKind::InvalidInput);
}

#[test]
fn bad_configuration_is_rejected_at_construction() {
    let mut params = PipelineParams::default();
    params.rectify.board_px = 250;
    let err = Pipeline::new(Arc::new(Silent), Arc::new(MarkerClassifier), params)
        .err()
        .expect("configuration error");
    assert_eq!(err.kind(), PipelineErrorKind::Configuration);
}

struct StatefulClassifier {
    calls: usize,
}

impl ExclusiveClassifier for StatefulClassifier {
    fn classify(&mut self, tiles: &TileSet) -> Result<Classification, ModelError> {
        self.calls += 1;
        Ok(classify_tiles(tiles))
    }
}

#[test]
fn exclusive_backend_runs_inside_the_pipeline() {
    let position = BoardField::parse(POSITION).expect("valid");
    let img = photo(&position);
    let classifier = Arc::new(Exclusive::new(StatefulClassifier { calls: 0 }));

    let p = Pipeline::new(
        Arc::new(ScriptedDetector::around_board()),
        classifier.clone(),
        PipelineParams::default(),
    )
    .expect("valid params");
    let fen = p.run(&img.view()).expect("scan").fen;
    assert!(fen.starts_with(POSITION));

    drop(p);
    let backend = Arc::try_unwrap(classifier)
        .ok()
        .expect("sole owner")
        .into_inner()
        .expect("lock");
    assert_eq!(backend.calls, 1);
}

#[test]
fn label_alphabet_matches_markers() {
    // keeps marker levels clear of the plain square colors
    for label in 1..=12 {
        let level = marker_level(label);
        assert!(level > 70 && level < 220, "label {label}");
        assert!(Piece::from_label(label).is_some());
    }
}

#[test]
fn block_pattern_round_trips_through_tiles_and_encoder() {
    // 4x4 checkerboard of 2x2-square blocks on a 256px rectified board
    let mut board = GrayImage::new(256, 256);
    for y in 0..256 {
        for x in 0..256 {
            let dark = (x / 64 + y / 64) % 2 == 1;
            board.put(x, y, if dark { 40 } else { 220 });
        }
    }
    let tessellator = fenscan::board::Tessellator::new(256, 32).expect("valid geometry");
    let pawn = Piece::from_symbol('P').expect("pawn").label();

    let encode = || {
        let tiles = tessellator.tessellate_view(board.view()).expect("tiles");
        let labels: Vec<usize> = tiles
            .iter()
            .map(|t| if t.image.get(16, 16) < 128 { pawn } else { EMPTY_LABEL })
            .collect();
        fenscan::fen::board_from_labels(&labels).expect("64 labels").to_string()
    };

    let expected = "2PP2PP/2PP2PP/PP2PP2/PP2PP2/2PP2PP/2PP2PP/PP2PP2/PP2PP2";
    assert_eq!(encode(), expected);
    assert_eq!(encode(), encode());
}
