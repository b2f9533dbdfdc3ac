//! Proportional resize policy

use std::fmt;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShrinkError};

/// Width/height pair of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of a decoded image
    pub fn of(image: &DynamicImage) -> Self {
        Self::new(image.width(), image.height())
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// What the policy decided for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDecision {
    /// Already within bounds
    Unchanged,
    /// Resample to the given dimensions
    Resize(Dimensions),
}

/// Resampling filters considered good enough for downscaling photos.
///
/// Nearest-neighbour is intentionally absent: every option here averages
/// over an area and avoids visible aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Triangle (linear interpolation)
    Triangle,
    /// Catmull-Rom cubic spline
    CatmullRom,
    /// Gaussian blur
    Gaussian,
    /// Lanczos with radius 3 (high quality, recommended)
    #[default]
    Lanczos3,
}

impl From<FilterType> for image::imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Triangle => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Gaussian => image::imageops::FilterType::Gaussian,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Decides whether an image needs shrinking and to what size.
///
/// Images no wider than `max_width` and no taller than `max_height` are left
/// alone. Anything else is scaled so that its longer side matches the
/// corresponding target; a square image is scaled by height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizePolicy {
    /// Widest image left untouched
    pub max_width: u32,
    /// Tallest image left untouched
    pub max_height: u32,
    /// Output width for landscape images
    pub target_width: u32,
    /// Output height for portrait and square images
    pub target_height: u32,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            max_width: 512,
            max_height: 768,
            target_width: 768,
            target_height: 768,
        }
    }
}

impl ResizePolicy {
    /// Classify an image and compute its output size
    pub fn decide(&self, current: Dimensions) -> ResizeDecision {
        let Dimensions { width, height } = current;

        if width <= self.max_width && height <= self.max_height {
            return ResizeDecision::Unchanged;
        }

        let target = if width > height {
            Dimensions::new(
                self.target_width,
                scale_floor(height, self.target_width, width),
            )
        } else {
            Dimensions::new(
                scale_floor(width, self.target_height, height),
                self.target_height,
            )
        };

        ResizeDecision::Resize(target)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ShrinkError::invalid_parameters(format!(
                "Thresholds must be greater than 0, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ShrinkError::invalid_parameters(format!(
                "Target dimensions must be greater than 0, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        Ok(())
    }
}

/// `floor(side * numerator / denominator)`, never below 1
fn scale_floor(side: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = u64::from(side) * u64::from(numerator) / u64::from(denominator.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}
