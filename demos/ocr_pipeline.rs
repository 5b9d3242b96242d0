//! Complete OCR pipeline example.
//!
//! Runs detection, optional text line orientation correction and recognition
//! on each image and prints the recognized lines in reading order.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example ocr_pipeline -- \
//!     --det-model path/to/det.onnx \
//!     --rec-model path/to/rec.onnx \
//!     --char-dict path/to/ppocr_keys_v1.txt \
//!     image1.jpg image2.png
//! ```
//!
//! To correct upside-down lines:
//!
//! ```bash
//! cargo run --example ocr_pipeline -- \
//!     --det-model path/to/det.onnx \
//!     --rec-model path/to/rec.onnx \
//!     --char-dict path/to/ppocr_keys_v1.txt \
//!     --cls-model path/to/cls.onnx \
//!     image1.jpg
//! ```
//!
//! Set `RUST_LOG=debug` to follow each stage.

use clap::Parser;
use onnx_ocr::core::init_tracing;
use onnx_ocr::pipeline::{OAROCRBuilder, OCRConfig};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Command-line arguments for the OCR pipeline example.
#[derive(Parser)]
#[command(name = "ocr_pipeline")]
#[command(about = "OCR pipeline example: detect, classify and recognize text lines")]
struct Args {
    /// Image files to process.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Path to the text detection model file.
    #[arg(long)]
    det_model: PathBuf,

    /// Path to the text recognition model file.
    #[arg(long)]
    rec_model: PathBuf,

    /// Path to the character dictionary file, one character per line.
    #[arg(long)]
    char_dict: PathBuf,

    /// Path to the text line orientation model. Enables orientation correction.
    #[arg(long)]
    cls_model: Option<PathBuf>,

    /// JSON configuration file; command-line paths override its model paths.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum mean probability for a detected region.
    #[arg(long, default_value_t = 0.6)]
    box_thresh: f32,

    /// Minimum recognition score for a line to be printed.
    #[arg(long, default_value_t = 0.5)]
    drop_score: f32,

    /// Run on this CUDA device (requires the `cuda` feature).
    #[arg(long)]
    gpu: Option<i32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let existing_images: Vec<&PathBuf> = args
        .images
        .iter()
        .filter(|path| {
            let exists = Path::new(path).exists();
            if !exists {
                error!("Image file not found: {}", path.display());
            }
            exists
        })
        .collect();
    if existing_images.is_empty() {
        error!("No valid image files found");
        return Err("No valid image files found".into());
    }

    let config = match &args.config {
        Some(path) => OCRConfig::from_json_file(path)?,
        None => OCRConfig::default(),
    };
    let mut builder = OAROCRBuilder::from_config(OCRConfig {
        det_model_path: args.det_model,
        rec_model_path: args.rec_model,
        rec_char_dict_path: args.char_dict,
        ..config
    })
    .det_db_box_thresh(args.box_thresh)
    .drop_score(args.drop_score);

    if let Some(cls_model) = args.cls_model {
        builder = builder.with_angle_cls(cls_model);
    }
    if let Some(gpu_id) = args.gpu {
        builder = builder.use_gpu(gpu_id);
    }

    let ocr = match builder.build() {
        Ok(ocr) => ocr,
        Err(e) => {
            error!("Failed to build pipeline: {}", e);
            return Err(e.into());
        }
    };
    info!("Pipeline built successfully");

    for (i, image_path) in existing_images.iter().enumerate() {
        info!(
            "Processing image {} of {}: {}",
            i + 1,
            existing_images.len(),
            image_path.display()
        );

        match ocr.process_file(image_path) {
            Ok(lines) => {
                println!("{}: {} lines", image_path.display(), lines.len());
                for line in &lines {
                    println!("  {line}");
                }
            }
            Err(e) => {
                error!("OCR failed for {}: {}", image_path.display(), e);
            }
        }
    }

    Ok(())
}
