//! Core image processing functionality

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, ImageFormat};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ShrinkError};

pub mod discovery;
pub mod formats;
pub mod naming;
pub mod policy;

pub use discovery::*;
pub use formats::*;
pub use naming::*;
pub use policy::*;

/// Default JPEG quality, matching the common encoder default
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// What happened to a single input image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImageOutcome {
    Resized {
        source: PathBuf,
        destination: PathBuf,
        original: Dimensions,
        resized: Dimensions,
    },
    Unchanged {
        source: PathBuf,
        dimensions: Dimensions,
    },
    Failed {
        source: PathBuf,
        error: String,
    },
}

impl ImageOutcome {
    pub fn source(&self) -> &Path {
        match self {
            Self::Resized { source, .. }
            | Self::Unchanged { source, .. }
            | Self::Failed { source, .. } => source,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for ImageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resized { destination, .. } => {
                write!(f, "Resized and saved image: {}", destination.display())
            }
            Self::Unchanged { source, .. } => write!(
                f,
                "Image size is appropriate, no resizing needed: {}",
                source.display()
            ),
            Self::Failed { source, error } => write!(
                f,
                "Error occurred while processing image {}: {}",
                source.display(),
                error
            ),
        }
    }
}

/// Shrinks one image at a time into a shared output directory.
///
/// A worker holds no per-image state, so one instance is shared by every
/// thread in the pool.
#[derive(Debug, Clone)]
pub struct ImageWorker {
    policy: ResizePolicy,
    namer: UniqueNamer,
    filter: FilterType,
    jpeg_quality: u8,
}

impl ImageWorker {
    /// Create a worker writing into `output_dir` with the default policy
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            policy: ResizePolicy::default(),
            namer: UniqueNamer::new(output_dir),
            filter: FilterType::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the resize policy
    pub fn policy(mut self, policy: ResizePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the resampling filter
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Set the JPEG encoder quality (1-100)
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn output_dir(&self) -> &Path {
        self.namer.output_dir()
    }

    /// Process one image. Never fails: errors come back as `ImageOutcome::Failed`.
    pub fn process(&self, path: &Path) -> ImageOutcome {
        match self.try_process(path) {
            Ok(outcome) => outcome,
            Err(e) => ImageOutcome::Failed {
                source: path.to_path_buf(),
                error: e.to_string(),
            },
        }
    }

    fn try_process(&self, path: &Path) -> Result<ImageOutcome> {
        debug!("Processing file: {:?}", path);

        let image = load_image(path)?;
        let original = Dimensions::of(&image);

        let target = match self.policy.decide(original) {
            ResizeDecision::Unchanged => {
                debug!("{:?} is {}, within bounds", path, original);
                return Ok(ImageOutcome::Unchanged {
                    source: path.to_path_buf(),
                    dimensions: original,
                });
            }
            ResizeDecision::Resize(target) => target,
        };

        let base = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let reservation = self.namer.reserve(&base, &extension)?;

        debug!(
            "Resizing {} -> {} using {:?}",
            original, target, self.filter
        );
        let resized = image.resize_exact(target.width, target.height, self.filter.into());

        let destination = reservation.path.clone();
        if let Err(e) = self.encode_into(&resized, &reservation.path, &reservation.file) {
            reservation.abandon();
            return Err(ShrinkError::write(&destination, e));
        }

        Ok(ImageOutcome::Resized {
            source: path.to_path_buf(),
            destination,
            original,
            resized: Dimensions::of(&resized),
        })
    }

    /// Encode into an already claimed file, format taken from its extension
    fn encode_into(
        &self,
        image: &DynamicImage,
        path: &Path,
        file: &File,
    ) -> std::result::Result<(), ImageError> {
        let format = ImageFormat::from_path(path)?;
        let mut writer = BufWriter::new(file);

        match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality);
                if image.color().has_alpha() {
                    DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
                } else {
                    image.write_with_encoder(encoder)?;
                }
            }
            _ => image.write_to(&mut writer, format)?,
        }

        writer.flush().map_err(ImageError::IoError)
    }
}

/// Decode an image, sniffing the format from its content first
fn load_image(path: &Path) -> Result<DynamicImage> {
    image::io::Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::IoError)
        .and_then(|reader| reader.decode())
        .map_err(|e| ShrinkError::decode(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, Rgba};
    use tempfile::TempDir;

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let intensity = ((x + y) % 255) as u8;
            Rgb([intensity, intensity, intensity])
        });
        DynamicImage::ImageRgb8(img)
    }

    struct Fixture {
        input: TempDir,
        output: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                input: TempDir::new().unwrap(),
                output: TempDir::new().unwrap(),
            }
        }

        fn save(&self, name: &str, width: u32, height: u32) -> PathBuf {
            let path = self.input.path().join(name);
            create_test_image(width, height).save(&path).unwrap();
            path
        }

        fn worker(&self) -> ImageWorker {
            ImageWorker::new(self.output.path())
        }
    }

    #[test]
    fn test_large_landscape_is_resized() {
        let fx = Fixture::new();
        let source = fx.save("a.jpg", 1000, 500);

        let outcome = fx.worker().process(&source);

        let expected = fx.output.path().join("a_1.jpg");
        assert_eq!(
            outcome,
            ImageOutcome::Resized {
                source: source.clone(),
                destination: expected.clone(),
                original: Dimensions::new(1000, 500),
                resized: Dimensions::new(768, 384),
            }
        );
        let written = image::open(&expected).unwrap();
        assert_eq!((written.width(), written.height()), (768, 384));
    }

    #[test]
    fn test_small_image_is_left_alone() {
        let fx = Fixture::new();
        let source = fx.save("b.png", 400, 300);

        let outcome = fx.worker().process(&source);

        assert!(matches!(outcome, ImageOutcome::Unchanged { .. }));
        assert_eq!(std::fs::read_dir(fx.output.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_corrupt_file_fails_without_output() {
        let fx = Fixture::new();
        let source = fx.input.path().join("c.gif");
        std::fs::write(&source, b"definitely not a gif").unwrap();

        let outcome = fx.worker().process(&source);

        assert!(outcome.is_failure());
        assert_eq!(outcome.source(), source.as_path());
        assert!(outcome.to_string().starts_with("Error occurred while processing image"));
        assert_eq!(std::fs::read_dir(fx.output.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unencodable_output_removes_claimed_file() {
        let fx = Fixture::new();
        let source = fx.input.path().join("deep.jpg");
        let gray = ImageBuffer::from_pixel(1000, 600, Luma([40_000u16]));
        DynamicImage::ImageLuma16(gray)
            .save_with_format(&source, ImageFormat::Png)
            .unwrap();

        let outcome = fx.worker().process(&source);

        match &outcome {
            ImageOutcome::Failed { source: failed, error } => {
                assert_eq!(failed, &source);
                assert!(error.starts_with("Failed to write"), "{error}");
                assert!(error.contains("deep_1.jpg"), "{error}");
            }
            other => panic!("expected a write failure, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(fx.output.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_portrait_png_keeps_format() {
        let fx = Fixture::new();
        let source = fx.save("tall.PNG", 600, 1200);

        let outcome = fx.worker().process(&source);

        let expected = fx.output.path().join("tall_1.PNG");
        assert!(matches!(outcome, ImageOutcome::Resized { ref destination, .. } if *destination == expected));
        let format = image::io::Reader::open(&expected)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(format, Some(ImageFormat::Png));
        let written = image::open(&expected).unwrap();
        assert_eq!((written.width(), written.height()), (384, 768));
    }

    #[test]
    fn test_mislabelled_content_is_sniffed() {
        let fx = Fixture::new();
        let source = fx.input.path().join("actually_png.jpg");
        create_test_image(900, 300)
            .save_with_format(&source, ImageFormat::Png)
            .unwrap();

        let outcome = fx.worker().process(&source);

        let expected = fx.output.path().join("actually_png_1.jpg");
        assert!(matches!(outcome, ImageOutcome::Resized { ref destination, .. } if *destination == expected));
        assert_eq!(image::open(&expected).unwrap().width(), 768);
    }

    #[test]
    fn test_alpha_is_dropped_for_jpeg_output() {
        let fx = Fixture::new();
        let source = fx.input.path().join("overlay.jpg");
        let rgba = ImageBuffer::from_pixel(800, 800, Rgba([10u8, 20, 30, 128]));
        DynamicImage::ImageRgba8(rgba)
            .save_with_format(&source, ImageFormat::Png)
            .unwrap();

        let outcome = fx.worker().process(&source);

        assert!(!outcome.is_failure(), "{outcome}");
    }

    #[test]
    fn test_custom_policy_and_quality() {
        let fx = Fixture::new();
        let source = fx.save("wide.bmp", 300, 100);

        let worker = fx
            .worker()
            .policy(ResizePolicy {
                max_width: 200,
                max_height: 200,
                target_width: 150,
                target_height: 150,
            })
            .filter(FilterType::CatmullRom)
            .jpeg_quality(0);

        assert_eq!(worker.jpeg_quality, 1);
        match worker.process(&source) {
            ImageOutcome::Resized { resized, .. } => {
                assert_eq!(resized, Dimensions::new(150, 50));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_outcome_lines() {
        let resized = ImageOutcome::Resized {
            source: PathBuf::from("in/a.jpg"),
            destination: PathBuf::from("resized/a_1.jpg"),
            original: Dimensions::new(1000, 500),
            resized: Dimensions::new(768, 384),
        };
        assert_eq!(resized.to_string(), "Resized and saved image: resized/a_1.jpg");

        let unchanged = ImageOutcome::Unchanged {
            source: PathBuf::from("in/b.png"),
            dimensions: Dimensions::new(400, 300),
        };
        assert_eq!(
            unchanged.to_string(),
            "Image size is appropriate, no resizing needed: in/b.png"
        );
    }
}
