//! Wilson score lower bound.
//!
//! Ranks by win rate while penalizing small samples. Scaled to 0–100.
//! The same formula is emitted as SQL for the database aggregate and
//! evaluated in Rust for in-process aggregation.

/// Normal quantile for 95% confidence.
pub const Z: f64 = 1.96;

/// `Z²`, written out so the SQL text stays readable.
pub const Z_SQUARED: f64 = 3.8416;

/// Wilson lower bound of `wins / (wins + losses)`, as a percentage.
///
/// A group with no decided games scores 0.
pub fn wilson_score(wins: u64, losses: u64) -> f64 {
    let n = (wins + losses) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let p = wins as f64 / n;
    let centre = p + Z_SQUARED / (2.0 * n);
    let margin = Z * (p * (1.0 - p) / n + Z_SQUARED / (4.0 * n * n)).sqrt();
    let lower = (centre - margin) / (1.0 + Z_SQUARED / n);
    (lower * 100.0).clamp(0.0, 100.0)
}

/// SQL expression computing [`wilson_score`] from two numeric expressions.
///
/// Both inputs must already be floating point so no integer division occurs.
/// `NULLIF` keeps a zero sample from dividing by zero; `GREATEST` then maps
/// the resulting NULL (and rounding noise below zero) to 0.
pub fn wilson_score_sql(wins: &str, losses: &str) -> String {
    let n = format!("NULLIF({wins} + {losses}, 0)");
    let half = Z_SQUARED / 2.0;
    let quarter = Z_SQUARED / 4.0;
    format!(
        "GREATEST(((({wins} + {half}) / {n} - {Z} * SQRT({wins} * {losses} / {n} + {quarter}) / {n}) \
         / (1 + {Z_SQUARED} / {n})) * 100, 0)"
    )
}
