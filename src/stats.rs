//! Small numeric helpers shared by Baseline, Trend, and Correlation. Arrays involved
//! are tiny (<= 30 points) so nothing fancier than plain f64 arithmetic is needed for
//! mean/stddev/OLS; the Student's t CDF for the trend p-value comes from `statrs`.

use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n-1 denominator). 0.0 if fewer than 2 samples.
pub fn sample_stddev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let sum_sq: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (sum_sq / (xs.len() as f64 - 1.0)).sqrt()
}

#[derive(Debug, Clone, Copy)]
pub struct LinRegress {
    pub slope: f64,
    pub intercept: f64,
    /// Two-sided p-value for the null hypothesis slope == 0. `None` if the fit is
    /// degenerate (e.g. fewer than 3 points, or zero variance in x or residuals).
    pub p_value: Option<f64>,
}

/// Ordinary least squares of `ys` on `xs` (equal length, `xs` the time index).
/// Mirrors `scipy.stats.linregress`'s two-sided t-test on the slope.
pub fn linregress(xs: &[f64], ys: &[f64]) -> LinRegress {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return LinRegress {
            slope: 0.0,
            intercept: 0.0,
            p_value: None,
        };
    }

    let x_mean = mean(xs);
    let y_mean = mean(ys);
    let ss_xx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    let ss_xy: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();

    if ss_xx == 0.0 {
        return LinRegress {
            slope: 0.0,
            intercept: y_mean,
            p_value: None,
        };
    }

    let slope = ss_xy / ss_xx;
    let intercept = y_mean - slope * x_mean;

    if n < 3 {
        return LinRegress {
            slope,
            intercept,
            p_value: None,
        };
    }

    let residual_ss: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| {
            let pred = intercept + slope * x;
            (y - pred).powi(2)
        })
        .sum();
    let df = (n - 2) as f64;
    let mse = residual_ss / df;
    if mse <= 0.0 {
        // Perfect fit: slope is exact, significance is maximal. scipy reports this
        // as p ~ 0 rather than NaN; we treat it the same way.
        return LinRegress {
            slope,
            intercept,
            p_value: Some(0.0),
        };
    }
    let se_slope = (mse / ss_xx).sqrt();
    if se_slope == 0.0 {
        return LinRegress {
            slope,
            intercept,
            p_value: Some(0.0),
        };
    }
    let t_stat = slope / se_slope;

    let p_value = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => {
            let p = 2.0 * (1.0 - dist.cdf(t_stat.abs()));
            if p.is_finite() {
                Some(p)
            } else {
                None
            }
        }
        Err(_) => None,
    };

    LinRegress {
        slope,
        intercept,
        p_value,
    }
}

/// Pearson correlation coefficient. Caller is responsible for inner-joining the two
/// series on a shared key before calling this — never align by position (§9).
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let x_mean = mean(xs);
    let y_mean = mean(ys);
    let mut num = 0.0;
    let mut den_x = 0.0;
    let mut den_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        num += dx * dy;
        den_x += dx * dx;
        den_y += dy * dy;
    }
    if den_x == 0.0 || den_y == 0.0 {
        return None;
    }
    Some(num / (den_x.sqrt() * den_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_stddev_of_constant_series_is_zero_variance() {
        let xs = vec![5.0, 5.0, 5.0, 5.0];
        assert_eq!(mean(&xs), 5.0);
        assert_eq!(sample_stddev(&xs), 0.0);
    }

    #[test]
    fn linregress_perfect_upward_line() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let fit = linregress(&xs, &ys);
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!(fit.p_value.unwrap() < 0.05);
    }

    #[test]
    fn linregress_flat_line_has_zero_slope_and_no_significance() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = vec![20.0; 10];
        let fit = linregress(&xs, &ys);
        assert_eq!(fit.slope, 0.0);
    }

    #[test]
    fn pearson_identical_series_is_one() {
        let xs = vec![1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &xs).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_requires_variance() {
        let xs = vec![1.0, 1.0, 1.0];
        let ys = vec![1.0, 2.0, 3.0];
        assert_eq!(pearson(&xs, &ys), None);
    }
}
