use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const LABEL_MAX_CHARS: usize = 28;

/// Truncates a node label for on-canvas display, appending an ellipsis
/// marker when the text exceeds `LABEL_MAX_CHARS`.
pub fn truncate_label(text: &str) -> String {
    if text.chars().count() <= LABEL_MAX_CHARS {
        return text.to_owned();
    }

    let mut truncated = text.chars().take(LABEL_MAX_CHARS).collect::<String>();
    truncated.push('…');
    truncated
}

/// Deterministic pseudo-random pair in [-1, 1] derived from a seed string.
/// Used to scatter initial node positions without a RNG so that rebuilding
/// the same tree starts the simulation from the same configuration.
pub fn stable_pair(seed: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
