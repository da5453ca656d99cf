//! Client-side simulated classifier
//!
//! Keeps the demo interactive when no backend is reachable. Scores come from
//! the file name plus noise; they say nothing about the audio and results
//! must always be presented as simulated.

use mgc_common::api::ClassificationResult;
use mgc_common::GenreLabel;
use rand::Rng;

/// Shown alongside every simulated result
pub const SIMULATED_NOTICE: &str = "Using simulated classification (API unavailable)";

const BASE_WEIGHT: f64 = 0.1;
const NAME_MATCH_BONUS: f64 = 0.3;
const NOISE_RANGE: f64 = 0.4;
const TOP_N: usize = 3;

/// Fabricate a classification for `file_name`
///
/// Every genre starts at 0.1, gains 0.3 if the lowercased file name contains
/// its label, then gains uniform noise in [0, 0.4). The three best are
/// normalised to sum to 1. Ties keep canonical genre order.
pub fn simulate_classification<R: Rng + ?Sized>(file_name: &str, rng: &mut R) -> ClassificationResult {
    let name = file_name.to_lowercase();

    let mut weights: Vec<(GenreLabel, f64)> = GenreLabel::ALL
        .into_iter()
        .map(|genre| {
            let mut weight = BASE_WEIGHT;
            if name.contains(genre.as_str()) {
                weight += NAME_MATCH_BONUS;
            }
            weight += rng.gen_range(0.0..NOISE_RANGE);
            (genre, weight)
        })
        .collect();

    // Stable sort keeps canonical order among equal weights
    weights.sort_by(|a, b| b.1.total_cmp(&a.1));
    weights.truncate(TOP_N);

    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let top_genres: Vec<GenreLabel> = weights.iter().map(|(g, _)| *g).collect();
    let top_confidences: Vec<f64> = weights.iter().map(|(_, w)| w / total).collect();

    ClassificationResult {
        genre: top_genres[0],
        confidence: top_confidences[0],
        top_genres,
        top_confidences,
        spectrogram: None,
    }
}
