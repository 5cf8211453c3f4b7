use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::{Vec2, vec2};

pub fn label_len(name: &str) -> f32 {
    name.chars().count() as f32
}

pub fn stable_jitter(name: &str) -> Vec2 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    vec2((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn golden_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214 + 0.11) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_is_stable_and_bounded() {
        let first = stable_jitter("Elizabeth Bennet");
        let second = stable_jitter("Elizabeth Bennet");
        assert_eq!(first, second);
        assert!(first.x.abs() <= 1.0 && first.y.abs() <= 1.0);
    }

    #[test]
    fn label_len_counts_chars_not_bytes() {
        assert_eq!(label_len("Zoë"), 3.0);
    }

    #[test]
    fn golden_direction_is_unit_length() {
        let direction = golden_direction(3, 7);
        assert!((direction.length() - 1.0).abs() < 1e-4);
    }
}
