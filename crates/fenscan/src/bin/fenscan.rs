//! Developer tool around the board geometry and FEN helpers.
//!
//! ```bash
//! # trace the board outline of a cropped board photo
//! fenscan corners board.png
//!
//! # warp a board to 256px and dump its 64 tiles
//! fenscan rectify board.png --corners 12,8,250,15,240,260,5,230 --out top.png --tiles-dir tiles/
//!
//! # encode classifier output (labels or score rows, JSON)
//! fenscan encode labels.json
//!
//! # pretty-print a position
//! fenscan show "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1" --flip
//! ```

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};
use nalgebra::Point2;

use fenscan::board::{
    find_board_corners, rectify_board, CornerError, RectifyError, TessellateError,
};
use fenscan::core::{init_with_level, order_corners, GeometryError};
use fenscan::fen::{
    board_from_labels, check_plausibility, render_board, square_name, Classification,
    EncodeError, Fen, FenParseError,
};
use fenscan::imaging::{load_gray, to_image_buffer};
use fenscan::{ConfigError, ParamsIoError, PipelineParams};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Params(#[from] ParamsIoError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Corners(#[from] CornerError),
    #[error(transparent)]
    Rectify(#[from] RectifyError),
    #[error(transparent)]
    Tessellate(#[from] TessellateError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Fen(#[from] FenParseError),
    #[error("expected 8 comma-separated corner coordinates, got {0:?}")]
    CornerList(String),
    #[error("could not convert {0}x{1} image for writing")]
    ImageBuffer(usize, usize),
}

/// Chessboard photo geometry and FEN tools
#[derive(Parser, Debug)]
#[command(name = "fenscan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON pipeline parameters (missing fields take defaults)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Trace the board outline in an image and print its corners as JSON
    Corners {
        /// Image containing the board region
        image: PathBuf,
    },
    /// Warp a board to a square top-down image and optionally write its tiles
    Rectify {
        image: PathBuf,

        /// Four corners as x0,y0,x1,y1,x2,y2,x3,y3 (any order); traced when omitted
        #[arg(long)]
        corners: Option<String>,

        /// Output PNG for the rectified board
        #[arg(short, long)]
        out: PathBuf,

        /// Directory receiving one PNG per square, named a8.png .. h1.png
        #[arg(long)]
        tiles_dir: Option<PathBuf>,
    },
    /// Encode 64 labels or score rows (JSON file, `-` for stdin) as FEN
    Encode { input: PathBuf },
    /// Draw a FEN position as a text board
    Show {
        fen: String,

        /// View from black's side
        #[arg(long)]
        flip: bool,
    },
    /// Write the default parameters as JSON
    InitParams { out: PathBuf },
}

fn parse_corner_list(s: &str) -> Result<[Point2<f32>; 4], CliError> {
    let values: Vec<f32> = s
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|_| CliError::CornerList(s.to_string()))?;
    if values.len() != 8 {
        return Err(CliError::CornerList(s.to_string()));
    }
    Ok(std::array::from_fn(|i| {
        Point2::new(values[2 * i], values[2 * i + 1])
    }))
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn save_png(img: &fenscan::core::GrayImage, path: &Path) -> Result<(), CliError> {
    let buf = to_image_buffer(img).ok_or(CliError::ImageBuffer(img.width, img.height))?;
    buf.save(path)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let params = match &cli.params {
        Some(path) => PipelineParams::load_json(path)?,
        None => PipelineParams::default(),
    };
    params.validate()?;

    match cli.command {
        Command::Corners { image } => {
            let img = load_gray(&image)?;
            let corners = find_board_corners(&img.view(), &params.corners)?;
            println!("{}", serde_json::to_string_pretty(&corners)?);
        }
        Command::Rectify {
            image,
            corners,
            out,
            tiles_dir,
        } => {
            let img = load_gray(&image)?;
            let corners = match corners {
                Some(list) => order_corners(&parse_corner_list(&list)?)?,
                None => find_board_corners(&img.view(), &params.corners)?,
            };
            let board = rectify_board(&img.view(), &corners, &params.rectify)?;
            save_png(&board.image, &out)?;
            info!("wrote {}", out.display());

            if let Some(dir) = tiles_dir {
                fs::create_dir_all(&dir)?;
                let tiles = params.tessellator()?.tessellate(&board)?;
                for tile in &tiles {
                    if let Some(name) = square_name(tile.index) {
                        save_png(&tile.image, &dir.join(format!("{name}.png")))?;
                    }
                }
                info!("wrote {} tiles to {}", tiles.len(), dir.display());
            }
        }
        Command::Encode { input } => {
            let classification: Classification = serde_json::from_str(&read_input(&input)?)?;
            let board = board_from_labels(&classification.into_labels()?)?;
            for w in check_plausibility(&board) {
                warn!("implausible position: {w}");
            }
            println!("{board} {}", params.suffix);
        }
        Command::Show { fen, flip } => {
            let fen = Fen::parse(&fen)?;
            print!("{}", render_board(&fen.board, flip));
        }
        Command::InitParams { out } => {
            params.write_json(&out)?;
            info!("wrote {}", out.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = init_with_level(level) {
        eprintln!("logger init failed: {e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
