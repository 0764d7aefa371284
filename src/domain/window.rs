// ============================================================
// Layer 3 — Window Domain Type
// ============================================================
// One fixed-length slice of multichannel EMG (or wavelet
// coefficient) samples. Stored row-major:
//
//   row 0: [ch0, ch1, ..., chC-1]
//   row 1: [ch0, ch1, ..., chC-1]
//   ...
//
// Feature functions reduce over the sample axis, so every
// feature yields exactly one value per channel.

use crate::features::FeatureError;

#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    values:   Vec<f64>,
    samples:  usize,
    channels: usize,
}

impl Window {
    /// Build a window from sample rows. Every row must have the
    /// same number of channels.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, FeatureError> {
        let channels = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.is_empty() || channels == 0 {
            return Err(FeatureError::EmptyWindow);
        }

        let mut values = Vec::with_capacity(rows.len() * channels);
        for (row, samples) in rows.iter().enumerate() {
            if samples.len() != channels {
                return Err(FeatureError::RaggedWindow {
                    row,
                    expected: channels,
                    actual:   samples.len(),
                });
            }
            values.extend_from_slice(samples);
        }

        Ok(Self { values, samples: rows.len(), channels })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Copy out one channel as a contiguous series
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        self.values
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_extraction() {
        let w = Window::from_rows(&[
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
        ]).unwrap();
        assert_eq!(w.samples(), 3);
        assert_eq!(w.channels(), 2);
        assert_eq!(w.channel(0), vec![1.0, 2.0, 3.0]);
        assert_eq!(w.channel(1), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = Window::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, FeatureError::RaggedWindow { row: 1, expected: 2, actual: 1 }));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(Window::from_rows(&[]), Err(FeatureError::EmptyWindow)));
        assert!(matches!(Window::from_rows(&[vec![]]), Err(FeatureError::EmptyWindow)));
    }
}
