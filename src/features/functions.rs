// ============================================================
// Layer 3b — Feature Functions
// ============================================================
// Every function reduces over the sample axis of a Window and
// returns one value per channel.
//
// Difference convention: d[i] = x[i] - x[i+1], giving N-1
// values for N samples. Second and third differences apply the
// same operator again (N-2 and N-3 values). Trained weights
// depend on this sign convention, so it must not be "fixed".

use serde::{Deserialize, Serialize};

use crate::domain::window::Window;
use crate::features::FeatureError;

/// Thresholds used by the threshold-based features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureParams {
    /// |x| above this counts towards the myopulse rate
    pub myop_threshold: f64,
    /// |d| above this counts towards the Willison amplitude
    pub wamp_threshold: f64,
    /// Offset added before the logarithm in ialv
    pub ialv_offset:    f64,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            myop_threshold: 0.5,
            wamp_threshold: 0.5,
            ialv_offset:    1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// integrated EMG
    Iemg,
    /// mean absolute value
    Mav,
    /// simple square integral
    Ssi,
    /// root mean square
    Rms,
    /// sample variance (ddof = 1)
    Var,
    /// myopulse percentage rate
    Myop,
    /// waveform length
    Wl,
    /// difference absolute mean value
    Damv,
    /// second order moment
    M2,
    /// difference variance version
    Dvarv,
    /// difference absolute standard deviation value
    Dasdv,
    Max,
    Min,
    /// Willison amplitude
    Wamp,
    /// integrated absolute second derivative
    Iasd,
    /// integrated absolute third derivative
    Iatd,
    /// integrated exponential of absolute values
    Ieav,
    /// integrated absolute log values
    Ialv,
    /// integrated exponential
    Ie,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 19] = [
        FeatureKind::Iemg, FeatureKind::Mav, FeatureKind::Ssi, FeatureKind::Rms,
        FeatureKind::Var, FeatureKind::Myop, FeatureKind::Wl, FeatureKind::Damv,
        FeatureKind::M2, FeatureKind::Dvarv, FeatureKind::Dasdv, FeatureKind::Max,
        FeatureKind::Min, FeatureKind::Wamp, FeatureKind::Iasd, FeatureKind::Iatd,
        FeatureKind::Ieav, FeatureKind::Ialv, FeatureKind::Ie,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Iemg  => "iemg",
            FeatureKind::Mav   => "mav",
            FeatureKind::Ssi   => "ssi",
            FeatureKind::Rms   => "rms",
            FeatureKind::Var   => "var",
            FeatureKind::Myop  => "myop",
            FeatureKind::Wl    => "wl",
            FeatureKind::Damv  => "damv",
            FeatureKind::M2    => "m2",
            FeatureKind::Dvarv => "dvarv",
            FeatureKind::Dasdv => "dasdv",
            FeatureKind::Max   => "max",
            FeatureKind::Min   => "min",
            FeatureKind::Wamp  => "wamp",
            FeatureKind::Iasd  => "iasd",
            FeatureKind::Iatd  => "iatd",
            FeatureKind::Ieav  => "ieav",
            FeatureKind::Ialv  => "ialv",
            FeatureKind::Ie    => "ie",
        }
    }

    /// Name as it appears in feature file headers, e.g. `f_mav`
    pub fn column_suffix(&self) -> String {
        format!("f_{}", self.name())
    }

    /// Accepts both `mav` and `f_mav`
    pub fn from_name(name: &str) -> Result<Self, FeatureError> {
        let bare = name.strip_prefix("f_").unwrap_or(name);
        FeatureKind::ALL
            .into_iter()
            .find(|k| k.name() == bare)
            .ok_or_else(|| FeatureError::UnknownFeature(name.to_string()))
    }

    /// Smallest window for which the feature is defined.
    pub fn min_samples(&self) -> usize {
        match self {
            FeatureKind::Var
            | FeatureKind::Wl
            | FeatureKind::Damv
            | FeatureKind::M2
            | FeatureKind::Dasdv
            | FeatureKind::Wamp => 2,
            FeatureKind::Dvarv | FeatureKind::Iasd => 3,
            FeatureKind::Iatd => 4,
            _ => 1,
        }
    }

    /// Apply the feature to every channel of the window.
    pub fn compute(&self, window: &Window, params: &FeatureParams) -> Result<Vec<f64>, FeatureError> {
        if window.samples() < self.min_samples() {
            return Err(FeatureError::TooFewSamples {
                feature:  self.name(),
                required: self.min_samples(),
                actual:   window.samples(),
            });
        }

        Ok((0..window.channels())
            .map(|c| self.reduce(&window.channel(c), params))
            .collect())
    }

    fn reduce(&self, x: &[f64], params: &FeatureParams) -> f64 {
        let n = x.len() as f64;
        match self {
            FeatureKind::Iemg  => abs_sum(x),
            FeatureKind::Mav   => abs_sum(x) / n,
            FeatureKind::Ssi   => square_sum(x),
            FeatureKind::Rms   => (square_sum(x) / n).sqrt(),
            FeatureKind::Var   => {
                let mean = x.iter().sum::<f64>() / n;
                x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
            }
            FeatureKind::Myop  => count_above(x, params.myop_threshold) / n,
            FeatureKind::Wl    => abs_sum(&diff(x)),
            FeatureKind::Damv  => abs_sum(&diff(x)) / (n - 1.0),
            FeatureKind::M2    => square_sum(&diff(x)),
            FeatureKind::Dvarv => square_sum(&diff(x)) / (n - 2.0),
            FeatureKind::Dasdv => (square_sum(&diff(x)) / (n - 1.0)).sqrt(),
            FeatureKind::Max   => x.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            FeatureKind::Min   => x.iter().copied().fold(f64::INFINITY, f64::min),
            FeatureKind::Wamp  => count_above(&diff(x), params.wamp_threshold),
            FeatureKind::Iasd  => abs_sum(&diff(&diff(x))),
            FeatureKind::Iatd  => abs_sum(&diff(&diff(&diff(x)))),
            FeatureKind::Ieav  => x.iter().map(|v| v.abs().exp()).sum(),
            FeatureKind::Ialv  => x.iter().map(|v| (v + params.ialv_offset).ln().abs()).sum(),
            FeatureKind::Ie    => x.iter().map(|v| v.exp()).sum(),
        }
    }
}

/// d[i] = x[i] - x[i+1]
pub fn diff(x: &[f64]) -> Vec<f64> {
    x.windows(2).map(|w| w[0] - w[1]).collect()
}

fn abs_sum(x: &[f64]) -> f64 {
    x.iter().map(|v| v.abs()).sum()
}

fn square_sum(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

fn count_above(x: &[f64], threshold: f64) -> f64 {
    x.iter().filter(|v| v.abs() > threshold).count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn single_channel(values: &[f64]) -> Window {
        let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
        Window::from_rows(&rows).unwrap()
    }

    fn compute(kind: FeatureKind, values: &[f64]) -> f64 {
        kind.compute(&single_channel(values), &FeatureParams::default()).unwrap()[0]
    }

    #[test]
    fn test_diff_is_current_minus_next() {
        assert_eq!(diff(&[1.0, 4.0, 2.0]), vec![-3.0, 2.0]);
        assert!(diff(&[1.0]).is_empty());
    }

    #[test]
    fn test_amplitude_features() {
        let x = [1.0, -2.0, 3.0, -4.0];
        assert!((compute(FeatureKind::Iemg, &x) - 10.0).abs() < EPS);
        assert!((compute(FeatureKind::Mav, &x) - 2.5).abs() < EPS);
        assert!((compute(FeatureKind::Ssi, &x) - 30.0).abs() < EPS);
        assert!((compute(FeatureKind::Rms, &x) - 7.5_f64.sqrt()).abs() < EPS);
        assert_eq!(compute(FeatureKind::Max, &x), 3.0);
        assert_eq!(compute(FeatureKind::Min, &x), -4.0);
    }

    #[test]
    fn test_variance_uses_sample_normalisation() {
        // mean 2.5, squared deviations sum 5.0, N-1 = 3
        let v = compute(FeatureKind::Var, &[1.0, 2.0, 3.0, 4.0]);
        assert!((v - 5.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_myop_is_a_rate_and_wamp_a_count() {
        let x = [0.0, 1.0, 0.2, 1.0];
        // |x| > 0.5 for 2 of 4 samples
        assert!((compute(FeatureKind::Myop, &x) - 0.5).abs() < EPS);
        // diffs: -1.0, 0.8, -0.8 → all three exceed 0.5
        assert_eq!(compute(FeatureKind::Wamp, &x), 3.0);
    }

    #[test]
    fn test_difference_features() {
        let x = [1.0, 4.0, 2.0, 2.0];
        // d = [-3, 2, 0]
        assert!((compute(FeatureKind::Wl, &x) - 5.0).abs() < EPS);
        assert!((compute(FeatureKind::Damv, &x) - 5.0 / 3.0).abs() < EPS);
        assert!((compute(FeatureKind::M2, &x) - 13.0).abs() < EPS);
        assert!((compute(FeatureKind::Dvarv, &x) - 6.5).abs() < EPS);
        assert!((compute(FeatureKind::Dasdv, &x) - (13.0_f64 / 3.0).sqrt()).abs() < EPS);
        // d2 = [-5, 2] → 7, d3 = [-7] → 7
        assert!((compute(FeatureKind::Iasd, &x) - 7.0).abs() < EPS);
        assert!((compute(FeatureKind::Iatd, &x) - 7.0).abs() < EPS);
    }

    #[test]
    fn test_exponential_features() {
        let x = [0.0, -1.0];
        assert!((compute(FeatureKind::Ieav, &x) - (1.0 + 1.0_f64.exp())).abs() < EPS);
        assert!((compute(FeatureKind::Ie, &x) - (1.0 + (-1.0_f64).exp())).abs() < EPS);
    }

    #[test]
    fn test_ialv_is_non_finite_below_offset() {
        assert!(!compute(FeatureKind::Ialv, &[-1.0, 0.5]).is_finite());
        assert!(compute(FeatureKind::Ialv, &[-2.0, 0.5]).is_nan());
    }

    #[test]
    fn test_difference_boundaries() {
        let params = FeatureParams::default();

        // N = 1: no difference rows at all
        let one = single_channel(&[1.0]);
        for kind in [FeatureKind::Damv, FeatureKind::Dasdv] {
            assert!(matches!(
                kind.compute(&one, &params),
                Err(FeatureError::TooFewSamples { required: 2, actual: 1, .. })
            ));
        }

        // N = 2: a single difference row is enough for damv and dasdv
        assert!((compute(FeatureKind::Damv, &[1.0, 3.0]) - 2.0).abs() < EPS);
        assert!((compute(FeatureKind::Dasdv, &[1.0, 3.0]) - 2.0).abs() < EPS);
        assert!(FeatureKind::Iasd.compute(&single_channel(&[1.0, 3.0]), &params).is_err());

        // N = 3: third difference still undefined
        let three = single_channel(&[1.0, 3.0, 2.0]);
        assert!(FeatureKind::Iasd.compute(&three, &params).is_ok());
        assert!(matches!(
            FeatureKind::Iatd.compute(&three, &params),
            Err(FeatureError::TooFewSamples { feature: "iatd", required: 4, actual: 3 })
        ));

        // N = 4: every feature is defined
        let four = single_channel(&[1.0, 3.0, 2.0, 5.0]);
        for kind in FeatureKind::ALL {
            assert!(kind.compute(&four, &params).is_ok(), "{} failed at N=4", kind.name());
        }
    }

    #[test]
    fn test_output_has_one_value_per_channel() {
        let w = Window::from_rows(&[
            vec![0.1, 0.2, 0.3],
            vec![0.4, -0.5, 0.6],
            vec![-0.7, 0.8, 0.9],
            vec![1.0, 1.1, -1.2],
        ]).unwrap();
        for kind in FeatureKind::ALL {
            let out = kind.compute(&w, &FeatureParams::default()).unwrap();
            assert_eq!(out.len(), 3, "{}", kind.name());
        }
    }

    #[test]
    fn test_from_name_accepts_prefix() {
        assert_eq!(FeatureKind::from_name("mav").unwrap(), FeatureKind::Mav);
        assert_eq!(FeatureKind::from_name("f_iatd").unwrap(), FeatureKind::Iatd);
        assert!(matches!(FeatureKind::from_name("zc"), Err(FeatureError::UnknownFeature(_))));
    }
}
