//! Constants used throughout the OCR pipeline.
//!
//! Default values for image processing parameters, thresholds and batch sizes.
//! The pipeline configuration falls back to these when a field is not set.

/// The default limit for the side length of images fed to the detector.
pub const DEFAULT_LIMIT_SIDE_LEN: u32 = 960;

/// Detector input sides are rounded to a multiple of this value.
pub const DET_SIDE_MULTIPLE: u32 = 32;

/// The default binarization threshold for the detection probability map.
pub const DEFAULT_DB_THRESH: f32 = 0.3;

/// The default minimum mean probability for a detected region.
pub const DEFAULT_DB_BOX_THRESH: f32 = 0.6;

/// The default expansion ratio used to unclip detected regions.
pub const DEFAULT_DB_UNCLIP_RATIO: f32 = 1.5;

/// The maximum number of contours scored per detection map.
pub const DEFAULT_MAX_CANDIDATES: usize = 1000;

/// The minimum side length, in map pixels, of a candidate rectangle.
///
/// Expanded rectangles must be at least two pixels longer than this.
pub const DEFAULT_MIN_BOX_SIDE: f32 = 3.0;

/// Rows whose top-left corners are closer than this (in source pixels) are treated
/// as one line when sorting regions into reading order.
pub const READING_ORDER_Y_TOLERANCE: f32 = 10.0;

/// Crops whose height/width ratio reaches this value are rotated to horizontal.
pub const VERTICAL_CROP_RATIO: f32 = 1.5;

/// The default shape for recognition images.
///
/// This constant defines the default shape (channels, height, width)
/// for images used in the recognition phase of the OCR pipeline.
pub const DEFAULT_REC_IMAGE_SHAPE: [usize; 3] = [3, 48, 320];

/// The default shape (channels, height, width) for orientation classification images.
pub const DEFAULT_CLS_IMAGE_SHAPE: [usize; 3] = [3, 48, 192];

/// The default batch size for processing.
///
/// This constant defines the default number of items processed
/// together in a batch in the OCR pipeline.
pub const DEFAULT_BATCH_SIZE: usize = 6;

/// The default score above which a 180 degree orientation is applied.
pub const DEFAULT_CLS_THRESH: f32 = 0.9;

/// The default labels of the orientation classifier.
pub const DEFAULT_CLS_LABELS: [&str; 2] = ["0", "180"];

/// The default minimum recognition score for a line to be reported.
pub const DEFAULT_DROP_SCORE: f32 = 0.5;

/// ImageNet channel means (RGB) used to normalize detector input.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations (RGB) used to normalize detector input.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];
