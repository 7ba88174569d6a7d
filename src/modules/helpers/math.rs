pub struct Math {}

impl Math {
    pub fn round_float_to_n_decimals(number: f64, decimals: i32) -> f64 {
        let multiplier = 10.0_f64.powi(decimals);
        (number * multiplier).round() / multiplier
    }

    /// mean of the values, 0 for an empty list.
    /// a 0 average is read as "no data" by every caller
    pub fn mean(nums: &[f64]) -> f64 {
        if nums.is_empty() {
            return 0.0;
        }
        let sum: f64 = nums.iter().sum();
        sum / nums.len() as f64
    }

    /// mean of the values, `None` for an empty list
    pub fn mean_checked(nums: &[f64]) -> Option<f64> {
        if nums.is_empty() {
            None
        } else {
            Some(Math::mean(nums))
        }
    }

    pub fn max(nums: &[f64]) -> Option<f64> {
        nums.iter().copied().reduce(f64::max)
    }

    /// keep the smallest strictly positive value
    pub fn min_positive(current: Option<f64>, candidate: Option<f64>) -> Option<f64> {
        match (current, candidate) {
            (Some(best), Some(value)) if value > 0.0 => Some(best.min(value)),
            (None, Some(value)) if value > 0.0 => Some(value),
            (best, _) => best,
        }
    }

    /// format a value with a fixed amount of decimals, `N/A` when there is none
    pub fn fixed(number: Option<f64>, decimals: usize) -> String {
        match number {
            Some(value) if value.is_finite() => format!("{:.*}", decimals, value),
            _ => "N/A".to_string(),
        }
    }
}
