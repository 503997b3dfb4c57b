use anyhow::{bail, Result};

/// Character used for the filled part of a bar
pub const BAR_FILL: char = '#';

/// Fraction of `total` taken by `used`. `total` must be non-zero.
pub fn percent_of(used: u64, total: u64) -> f64 {
    used as f64 / total as f64
}

/// Fixed-width bar for a fraction in [0, 1].
///
/// The fill count is truncated, so 0.999 at width 20 draws 19 cells and only
/// 1.0 fills the bar.
pub fn bar_graph(percent: f64, length: usize) -> Result<String> {
    if !(0.0..=1.0).contains(&percent) {
        bail!("Percent must be between 0 and 1, got {}", percent);
    }
    let filled = ((percent * length as f64) as usize).min(length);
    let mut bar = String::with_capacity(length);
    bar.extend(std::iter::repeat(BAR_FILL).take(filled));
    bar.extend(std::iter::repeat(' ').take(length - filled));
    Ok(bar)
}

/// Whole-number percentage, truncated
pub fn percent_label(percent: f64) -> u64 {
    (percent * 100.0) as u64
}
