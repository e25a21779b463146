//! Deterministic frame scoring.
//!
//! No frames are decoded. Per-frame confidence values are derived from the
//! content digest so that the same file always produces the same sequence,
//! bit for bit, on every platform.

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;

/// Default number of frames scored per analysis.
pub const DEFAULT_FRAME_COUNT: usize = 60;

/// Offset added to the frame index before it is multiplied by the seed.
const INDEX_OFFSET: u128 = 73;

/// Confidence score for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FrameScore {
    /// Frame number in sequence
    #[cfg_attr(feature = "openapi", schema(example = 0))]
    pub frame_index: usize,
    /// Deepfake confidence score, 0-1
    #[cfg_attr(feature = "openapi", schema(example = 0.7125))]
    pub confidence: f64,
}

/// Seeded generator for frame confidence sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreGenerator {
    seed: u64,
}

impl ScoreGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed the generator from the first eight hex characters of a digest.
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self::new(digest.seed())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Map a frame index to a value in `[0, 0.999]`.
    ///
    /// The product and modulus stay in integer arithmetic; only the final
    /// division is floating point.
    pub fn pseudo_rand(&self, index: usize) -> f64 {
        let product = u128::from(self.seed) * (index as u128 + INDEX_OFFSET);
        (product % 1000) as f64 / 1000.0
    }

    /// Confidence for one frame, clamped to `[0, 1]`.
    pub fn confidence(&self, index: usize) -> f64 {
        let wave = (self.pseudo_rand(index) + self.pseudo_rand(index / 3)) / 2.0;
        (0.5 + 0.5 * wave).clamp(0.0, 1.0)
    }

    /// Scores for frames `0..frame_count` in index order.
    pub fn generate(&self, frame_count: usize) -> Vec<FrameScore> {
        (0..frame_count)
            .map(|frame_index| FrameScore {
                frame_index,
                confidence: self.confidence(frame_index),
            })
            .collect()
    }
}

/// Generate `frame_count` scores for a digest.
pub fn generate_frame_scores(digest: &ContentDigest, frame_count: usize) -> Vec<FrameScore> {
    ScoreGenerator::from_digest(digest).generate(frame_count)
}

/// Arithmetic mean of the frame confidences.
///
/// An empty sequence has no mean; it aggregates to `0.0`.
pub fn aggregate_likelihood(scores: &[FrameScore]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let total = scores.iter().fold(0.0_f64, |acc, s| acc + s.confidence);
    total / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(hex: &str) -> ContentDigest {
        ContentDigest::parse(hex).unwrap()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let d = ContentDigest::from_bytes(b"some clip");
        let a = generate_frame_scores(&d, DEFAULT_FRAME_COUNT);
        let b = generate_frame_scores(&d, DEFAULT_FRAME_COUNT);

        assert_eq!(a.len(), DEFAULT_FRAME_COUNT);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.frame_index, y.frame_index);
            assert_eq!(x.confidence.to_bits(), y.confidence.to_bits());
        }
    }

    #[test]
    fn test_known_sequence_for_abc() {
        // sha256("abc") starts with ba7816bf, seed 3128432319
        let d = ContentDigest::from_bytes(b"abc");
        let scores = generate_frame_scores(&d, DEFAULT_FRAME_COUNT);

        let expected = [0.6435, 0.72325, 0.8029999999999999, 0.7125, 0.79225];
        for (score, want) in scores.iter().zip(expected) {
            assert_eq!(score.confidence, want);
        }
        assert_eq!(aggregate_likelihood(&scores), 0.7412500000000001);
    }

    #[test]
    fn test_indices_strictly_increase_from_zero() {
        let scores = generate_frame_scores(&digest("deadbeef"), 17);
        for (i, score) in scores.iter().enumerate() {
            assert_eq!(score.frame_index, i);
        }
    }

    #[test]
    fn test_confidence_always_in_unit_interval() {
        for data in [&b""[..], b"x", b"another clip", &[0xffu8; 1024]] {
            let d = ContentDigest::from_bytes(data);
            for score in generate_frame_scores(&d, 500) {
                assert!((0.0..=1.0).contains(&score.confidence));
            }
        }

        let max_seed = ScoreGenerator::new(u64::from(u32::MAX));
        for i in 0..1000 {
            assert!((0.0..=1.0).contains(&max_seed.confidence(i)));
        }
    }

    #[test]
    fn test_zero_seed_yields_half() {
        let scores = generate_frame_scores(&digest(&"0".repeat(64)), DEFAULT_FRAME_COUNT);
        assert!(scores.iter().all(|s| s.confidence == 0.5));
        assert_eq!(aggregate_likelihood(&scores), 0.5);
    }

    #[test]
    fn test_zero_frames_is_empty() {
        assert!(generate_frame_scores(&digest("abcdef12"), 0).is_empty());
    }

    #[test]
    fn test_pseudo_rand_range() {
        let generator = ScoreGenerator::new(999_999_999);
        for i in 0..200 {
            let v = generator.pseudo_rand(i);
            assert!((0.0..=0.999).contains(&v));
        }
    }

    #[test]
    fn test_pseudo_rand_does_not_wrap_on_large_index() {
        let generator = ScoreGenerator::new(u64::from(u32::MAX));
        let v = generator.pseudo_rand(usize::MAX - 100);
        assert!((0.0..=0.999).contains(&v));
    }

    #[test]
    fn test_aggregate_is_mean() {
        let scores: Vec<FrameScore> = [0.5, 0.75, 1.0, 0.25]
            .iter()
            .enumerate()
            .map(|(frame_index, &confidence)| FrameScore {
                frame_index,
                confidence,
            })
            .collect();
        assert_eq!(aggregate_likelihood(&scores), 0.625);
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        assert_eq!(aggregate_likelihood(&[]), 0.0);
    }

    #[test]
    fn test_frame_score_serialization() {
        let json = serde_json::to_value(FrameScore {
            frame_index: 3,
            confidence: 0.75,
        })
        .unwrap();
        assert_eq!(json["frame_index"], 3);
        assert_eq!(json["confidence"], 0.75);
    }
}
