/// Arithmetic mean, or 0 for an empty input so reports never show NaN.
pub fn average(numbers: &[f64]) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    numbers.iter().sum::<f64>() / numbers.len() as f64
}

/// Median (mean of the two middle values for even lengths), or 0 for an
/// empty input.
pub fn median(numbers: &[f64]) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Average and median of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    pub average: f64,
    pub median: f64,
}

impl Aggregate {
    pub fn of(values: &[f64]) -> Self {
        Self {
            average: average(values),
            median: median(values),
        }
    }

    /// Aggregate of whole-second durations.
    pub fn of_seconds(seconds: &[i64]) -> Self {
        let values: Vec<f64> = seconds.iter().map(|&s| s as f64).collect();
        Self::of(&values)
    }
}

/// Floor an aggregate of seconds to whole seconds and convert to milliseconds.
pub fn seconds_to_millis(seconds: f64) -> i64 {
    seconds.floor() as i64 * 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
    }

    #[test]
    fn test_median_empty_is_zero() {
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[1.0, 2.0, 6.0]), 3.0);
        assert_eq!(average(&[10.0, 20.0]), 15.0);
    }

    #[test]
    fn test_median_odd_uses_middle_of_sorted() {
        assert_eq!(median(&[9.0, 1.0, 5.0]), 5.0);
    }

    #[test]
    fn test_median_even_averages_central_values() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 100.0]), 3.5);
        assert_eq!(median(&[10.0, 20.0]), 15.0);
    }

    #[test]
    fn test_median_does_not_reorder_input() {
        let values = [3.0, 1.0, 2.0];
        median(&values);
        assert_eq!(values, [3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_aggregate_of_seconds() {
        let agg = Aggregate::of_seconds(&[10, 20, 60]);
        assert_eq!(agg.average, 30.0);
        assert_eq!(agg.median, 20.0);
    }

    #[test]
    fn test_seconds_to_millis_floors() {
        assert_eq!(seconds_to_millis(15.9), 15_000);
        assert_eq!(seconds_to_millis(0.0), 0);
    }
}
