use crate::error::OcrError;
use image::DynamicImage;
use serde::Serialize;
use std::time::Instant;

use super::steps;

type StepFn = fn(DynamicImage) -> Result<DynamicImage, OcrError>;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: &'static str,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Ordered, unconditional sequence of preprocessing steps
pub struct Pipeline {
    steps: Vec<(&'static str, StepFn)>,
}

impl Pipeline {
    /// The ID document pipeline: fit into 1600x1200, grayscale, normalize,
    /// gamma 1.2, sharpen, fixed threshold, median denoise
    pub fn id_document() -> Self {
        Self {
            steps: vec![
                ("resize", steps::resize::apply as StepFn),
                ("grayscale", steps::grayscale::apply as StepFn),
                ("normalize", steps::normalize::apply as StepFn),
                ("gamma", steps::gamma::apply as StepFn),
                ("sharpen", steps::sharpen::apply as StepFn),
                ("threshold", steps::threshold::apply as StepFn),
                ("denoise", steps::denoise::apply as StepFn),
            ],
        }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|(name, _)| *name).collect()
    }

    /// Run every step in order; the first failing step aborts the pipeline
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, OcrError> {
        let start = Instant::now();
        let mut timings = Vec::with_capacity(self.steps.len());
        let mut img = image;

        for &(name, step_fn) in &self.steps {
            let step_start = Instant::now();
            img = step_fn(img).map_err(|e| {
                OcrError::PreprocessingError(format!("{} step failed: {}", name, e))
            })?;
            timings.push(StepTiming {
                name,
                time_ms: step_start.elapsed().as_millis() as u64,
            });
        }

        Ok(PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: timings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    #[test]
    fn test_id_pipeline_step_order() {
        assert_eq!(
            Pipeline::id_document().step_names(),
            vec!["resize", "grayscale", "normalize", "gamma", "sharpen", "threshold", "denoise"]
        );
    }

    #[test]
    fn test_id_pipeline_outputs_binary_grayscale_within_bounds() {
        let img = RgbImage::from_fn(400, 300, |x, _| {
            if (x / 20) % 2 == 0 {
                Rgb([30, 30, 40])
            } else {
                Rgb([220, 215, 200])
            }
        });

        let result = Pipeline::id_document()
            .process(DynamicImage::ImageRgb8(img))
            .unwrap();

        let (width, height) = result.image.dimensions();
        assert!(width <= steps::resize::MAX_WIDTH && height <= steps::resize::MAX_HEIGHT);
        assert_eq!(result.steps.len(), 7);
        assert!(result
            .image
            .to_luma8()
            .pixels()
            .all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
