//! Gaussian smoothing of hammer positions.
//!
//! The turning-point detector has no noise threshold, so detector jitter is
//! removed here before the scan. Each axis is convolved independently with a
//! truncated Gaussian kernel; near the ends of the sequence the kernel is
//! cut to the in-range samples and renormalized, so edges are never pulled
//! toward an assumed boundary value.

use hammertrack_common::config::AnalysisConfig;
use hammertrack_common::error::{HammertrackError, HammertrackResult};
use hammertrack_model::geometry::Point2D;

/// Fixed-kernel Gaussian smoother.
#[derive(Debug, Clone)]
pub struct GaussianSmoother {
    sigma: f64,
    min_points: usize,
    kernel: Vec<f64>,
}

impl GaussianSmoother {
    /// Create a smoother with standard deviation `sigma` (in samples).
    ///
    /// Sequences shorter than `min_points` are returned unchanged.
    pub fn new(sigma: f64, min_points: usize) -> HammertrackResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(HammertrackError::invalid_config(format!(
                "smoothing sigma must be a positive number, got {sigma}"
            )));
        }

        Ok(Self {
            sigma,
            min_points,
            kernel: gaussian_kernel(sigma),
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> HammertrackResult<Self> {
        Self::new(config.smoothing_sigma, config.min_smoothing_points)
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Kernel half-width in samples.
    pub fn radius(&self) -> usize {
        self.kernel.len() / 2
    }

    /// Unnormalized kernel weights, centre at index `radius()`.
    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    /// Smooth a position sequence. The result has the same length.
    pub fn smooth(&self, positions: &[Point2D]) -> Vec<Point2D> {
        if positions.len() < self.min_points {
            return positions.to_vec();
        }

        let xs: Vec<f64> = positions.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = positions.iter().map(|p| p.y).collect();
        let xs = self.convolve(&xs);
        let ys = self.convolve(&ys);

        xs.into_iter()
            .zip(ys)
            .map(|(x, y)| Point2D::new(x, y))
            .collect()
    }

    fn convolve(&self, values: &[f64]) -> Vec<f64> {
        let radius = self.radius() as i64;
        let len = values.len() as i64;

        (0..len)
            .map(|i| {
                let mut weighted = 0.0;
                let mut weight_sum = 0.0;
                for (k, weight) in self.kernel.iter().enumerate() {
                    let j = i + k as i64 - radius;
                    if (0..len).contains(&j) {
                        weighted += weight * values[j as usize];
                        weight_sum += weight;
                    }
                }
                weighted / weight_sum
            })
            .collect()
    }
}

impl Default for GaussianSmoother {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self {
            sigma: config.smoothing_sigma,
            min_points: config.min_smoothing_points,
            kernel: gaussian_kernel(config.smoothing_sigma),
        }
    }
}

/// Weights for offsets `-ceil(3σ)..=ceil(3σ)`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (3.0 * sigma).ceil() as i64;
    (-radius..=radius)
        .map(|offset| {
            let offset = offset as f64;
            (-(offset * offset) / (2.0 * sigma * sigma)).exp()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn points(coords: &[(f64, f64)]) -> Vec<Point2D> {
        coords.iter().map(|&(x, y)| Point2D::new(x, y)).collect()
    }

    #[test]
    fn test_kernel_shape() {
        let smoother = GaussianSmoother::new(0.5, 6).unwrap();
        assert_eq!(smoother.radius(), 2);
        assert_eq!(smoother.kernel().len(), 5);
        assert_eq!(smoother.kernel()[2], 1.0);
        assert_eq!(smoother.kernel()[0], smoother.kernel()[4]);

        let wide = GaussianSmoother::new(1.2, 6).unwrap();
        assert_eq!(wide.radius(), 4);
    }

    #[test]
    fn test_invalid_sigma_rejected() {
        for sigma in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            assert!(matches!(
                GaussianSmoother::new(sigma, 6),
                Err(HammertrackError::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_short_sequence_is_unchanged() {
        let smoother = GaussianSmoother::default();
        let input = points(&[(0.1, 0.9), (0.8, 0.2), (0.3, 0.5), (0.9, 0.1), (0.0, 0.4)]);
        assert_eq!(smoother.smooth(&input), input);
        assert!(smoother.smooth(&[]).is_empty());
    }

    #[test]
    fn test_spike_is_attenuated() {
        let smoother = GaussianSmoother::default();
        let mut input = points(&[(0.5, 0.5); 9]);
        input[4] = Point2D::new(0.9, 0.5);
        let output = smoother.smooth(&input);
        assert_eq!(output.len(), input.len());
        assert!(output[4].x < 0.9);
        assert!(output[4].x > 0.5);
        assert!(output[3].x > 0.5);
        assert!((output[0].x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_edges_use_renormalized_weights() {
        // A linear ramp stays linear in the interior; at the edge the
        // truncated kernel only sees one side, so the first value moves
        // toward its neighbours but never below the ramp start.
        let smoother = GaussianSmoother::default();
        let input: Vec<Point2D> = (0..8).map(|i| Point2D::new(i as f64 * 0.1, 0.5)).collect();
        let output = smoother.smooth(&input);
        assert!((output[4].x - 0.4).abs() < 1e-12);
        assert!(output[0].x > 0.0);
        assert!(output[0].x < 0.1);
        assert!(output.iter().all(|p| (p.y - 0.5).abs() < 1e-12));
    }

    proptest! {
        #[test]
        fn prop_constant_sequence_is_fixed_point(
            x in 0.0f64..1.0,
            y in 0.0f64..1.0,
            len in 0usize..80,
            sigma in 0.1f64..3.0,
        ) {
            let smoother = GaussianSmoother::new(sigma, 6).unwrap();
            let input = vec![Point2D::new(x, y); len];
            let output = smoother.smooth(&input);
            prop_assert_eq!(output.len(), len);
            for p in output {
                prop_assert!((p.x - x).abs() < 1e-12);
                prop_assert!((p.y - y).abs() < 1e-12);
            }
        }

        #[test]
        fn prop_output_stays_within_input_range(
            xs in proptest::collection::vec(0.0f64..1.0, 6..60),
        ) {
            let smoother = GaussianSmoother::default();
            let input: Vec<Point2D> = xs.iter().map(|&x| Point2D::new(x, 0.5)).collect();
            let lo = xs.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            for p in smoother.smooth(&input) {
                prop_assert!(p.x >= lo - 1e-12 && p.x <= hi + 1e-12);
            }
        }
    }
}
