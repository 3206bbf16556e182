use std::fmt;
use std::str::FromStr;

/// Whether a lower or higher metric value is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Validation-set scoring metric for regression models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Root mean squared error.
    #[default]
    Rmse,
    /// Mean absolute error.
    Mae,
    /// Coefficient of determination.
    RSquared,
}

impl Metric {
    pub fn direction(&self) -> Direction {
        match self {
            Metric::Rmse | Metric::Mae => Direction::Minimize,
            Metric::RSquared => Direction::Maximize,
        }
    }

    /// Strict comparison: `true` when `candidate` beats `incumbent` under
    /// this metric's direction. Ties are not improvements, so the first
    /// configuration encountered wins them.
    pub fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        match self.direction() {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }

    /// Scores predictions against observed labels.
    ///
    /// Both slices must have the same non-zero length; callers score model
    /// output against the dataset it was predicted from.
    pub fn score(&self, predicted: &[f64], actual: &[f64]) -> f64 {
        debug_assert_eq!(predicted.len(), actual.len());
        let n = actual.len() as f64;
        match self {
            Metric::Rmse => {
                let mse = predicted
                    .iter()
                    .zip(actual)
                    .map(|(p, a)| (p - a).powi(2))
                    .sum::<f64>()
                    / n;
                mse.sqrt()
            }
            Metric::Mae => {
                predicted
                    .iter()
                    .zip(actual)
                    .map(|(p, a)| (p - a).abs())
                    .sum::<f64>()
                    / n
            }
            Metric::RSquared => {
                let mean = actual.iter().sum::<f64>() / n;
                let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
                let ss_res: f64 = predicted
                    .iter()
                    .zip(actual)
                    .map(|(p, a)| (a - p).powi(2))
                    .sum();
                if ss_tot <= f64::EPSILON {
                    // Constant labels: perfect predictions score 1, anything
                    // else scores 0.
                    if ss_res <= f64::EPSILON { 1.0 } else { 0.0 }
                } else {
                    1.0 - ss_res / ss_tot
                }
            }
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Rmse => "rmse",
            Metric::Mae => "mae",
            Metric::RSquared => "r2",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Metric {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rmse" => Ok(Metric::Rmse),
            "mae" => Ok(Metric::Mae),
            "r2" | "r-squared" | "r_squared" => Ok(Metric::RSquared),
            _ => Err(()),
        }
    }
}
