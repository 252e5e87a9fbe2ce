use crate::models::ImpactLevel;

const FULL_QUANTITY: f64 = 50.0;
const QUANTITY_WEIGHT: f64 = 0.7;
const PERFORMANCE_WEIGHT: f64 = 0.3;
const LARGE_THRESHOLD: f64 = 0.6;
const MID_THRESHOLD: f64 = 0.3;

/// Bucket a holding by position size and performance.
///
/// Quantity ramps linearly up to 50 units; gain maps -20%..+20% onto 0..1
/// (0.5 when unknown). An empty portfolio is always small.
pub fn classify_impact(
    quantity: i32,
    gain_percent: Option<f64>,
    total_portfolio_value: f64,
    _position_value: f64,
) -> ImpactLevel {
    if total_portfolio_value <= 0.0 {
        return ImpactLevel::Small;
    }

    let score = impact_score(quantity, gain_percent);

    if score >= LARGE_THRESHOLD {
        ImpactLevel::Large
    } else if score >= MID_THRESHOLD {
        ImpactLevel::Mid
    } else {
        ImpactLevel::Small
    }
}

pub fn impact_score(quantity: i32, gain_percent: Option<f64>) -> f64 {
    let quantity_impact = (quantity.max(0) as f64 / FULL_QUANTITY).min(1.0);
    let performance_impact = match gain_percent {
        Some(gain) => ((gain + 20.0) / 40.0).clamp(0.0, 1.0),
        None => 0.5,
    };

    QUANTITY_WEIGHT * quantity_impact + PERFORMANCE_WEIGHT * performance_impact
}

/// Share of the portfolio held in this position, 0 for an empty portfolio.
pub fn portfolio_weight(position_value: f64, total_portfolio_value: f64) -> f64 {
    if total_portfolio_value > 0.0 {
        position_value / total_portfolio_value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_portfolio_is_small() {
        assert_eq!(classify_impact(0, None, 0.0, 0.0), ImpactLevel::Small);
        assert_eq!(classify_impact(500, Some(50.0), 0.0, 0.0), ImpactLevel::Small);
    }

    #[test]
    fn test_saturated_position_is_large() {
        assert!((impact_score(50, Some(20.0)) - 1.0).abs() < 1e-9);
        assert_eq!(classify_impact(50, Some(20.0), 1000.0, 500.0), ImpactLevel::Large);
    }

    #[test]
    fn test_thresholds() {
        // 0.7 * 0.2 + 0.3 * 0.5 = 0.29
        assert_eq!(classify_impact(10, None, 1000.0, 100.0), ImpactLevel::Small);
        // 0.7 * 0.4 + 0.3 * 0.5 = 0.43
        assert_eq!(classify_impact(20, None, 1000.0, 100.0), ImpactLevel::Mid);
        // 0.7 * 0.8 + 0.3 * 0.5 = 0.71
        assert_eq!(classify_impact(40, None, 1000.0, 100.0), ImpactLevel::Large);
    }

    #[test]
    fn test_performance_is_clamped() {
        assert!((impact_score(0, Some(-80.0)) - 0.0).abs() < 1e-9);
        assert!((impact_score(0, Some(300.0)) - 0.3).abs() < 1e-9);
        assert!((impact_score(200, None) - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_portfolio_weight() {
        assert_eq!(portfolio_weight(250.0, 1000.0), 0.25);
        assert_eq!(portfolio_weight(250.0, 0.0), 0.0);
    }
}
