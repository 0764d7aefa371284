// ============================================================
// Layer 4 — Orientation Dataset
// ============================================================
// Chops the aligned input / target matrices into consecutive,
// non-overlapping sequences of `seq_length` windows. A sequence
// is the unit the data loader shuffles, so temporal order inside
// a sequence is always preserved.
//
// Sequences never cross a recording boundary: each recording is
// cut on its own and its trailing rows that do not fill a
// sequence are skipped.
//
//   rec A (12 rows): [0..5) [5..10)  skip 10,11
//   rec B ( 8 rows): [12..17)        skip 17,18,19
//
// Sequences that cannot fill a whole batch are then dropped
// (drop-last), e.g. 43 rows of one recording with batch_size 4
// and seq_length 5 keep 40 rows = 8 sequences = 2 batches.

use burn::data::dataset::Dataset;

use crate::data::loader::LoadedData;
use crate::data::DatasetError;

/// One training sequence, flattened row-major:
/// inputs `[seq_length × input_width]`, targets `[seq_length × target_width]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSample {
    pub inputs:  Vec<f32>,
    pub targets: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct OrientationDataset {
    inputs:       Vec<f32>,
    targets:      Vec<f32>,
    input_width:  usize,
    target_width: usize,
    seq_length:   usize,
    /// First row of every kept sequence
    starts:       Vec<usize>,
    dropped_rows: usize,
}

impl OrientationDataset {
    /// Treat all rows as one continuous recording.
    pub fn new(
        inputs:       Vec<f32>,
        input_width:  usize,
        targets:      Vec<f32>,
        target_width: usize,
        seq_length:   usize,
        batch_size:   usize,
    ) -> Result<Self, DatasetError> {
        let rows = if input_width == 0 { 0 } else { inputs.len() / input_width };
        Self::with_spans(inputs, input_width, targets, target_width, &[(0, rows)], seq_length, batch_size)
    }

    /// `spans` lists `(first_row, rows)` per recording; sequences
    /// are only cut inside a span.
    pub fn with_spans(
        inputs:       Vec<f32>,
        input_width:  usize,
        targets:      Vec<f32>,
        target_width: usize,
        spans:        &[(usize, usize)],
        seq_length:   usize,
        batch_size:   usize,
    ) -> Result<Self, DatasetError> {
        let rows = if input_width == 0 { 0 } else { inputs.len() / input_width };
        let target_rows = if target_width == 0 { 0 } else { targets.len() / target_width };
        if rows != target_rows {
            return Err(DatasetError::Alignment {
                key:     "<all recordings>".to_string(),
                inputs:  rows,
                targets: target_rows,
            });
        }

        let mut starts = Vec::new();
        if seq_length > 0 {
            for &(first, len) in spans {
                let len = len.min(rows.saturating_sub(first));
                starts.extend((0..len / seq_length).map(|k| first + k * seq_length));
            }
        }

        let batch_size = batch_size.max(1);
        starts.truncate(starts.len() - starts.len() % batch_size);

        let dropped_rows = rows - starts.len() * seq_length;
        if dropped_rows > 0 {
            tracing::debug!(
                "Dropping {} rows that do not fill a sequence of {} or a batch of {}",
                dropped_rows, seq_length, batch_size
            );
        }

        Ok(Self {
            inputs,
            targets,
            input_width,
            target_width,
            seq_length,
            starts,
            dropped_rows,
        })
    }

    /// Build from loader output, one span per recording.
    pub fn from_loaded(data: LoadedData, seq_length: usize, batch_size: usize) -> Result<Self, DatasetError> {
        let input_width  = data.inputs.width();
        let target_width = data.targets.width();
        let spans: Vec<(usize, usize)> = data.recordings.iter().map(|r| (r.start, r.rows)).collect();
        Self::with_spans(
            data.inputs.into_values(),
            input_width,
            data.targets.into_values(),
            target_width,
            &spans,
            seq_length,
            batch_size,
        )
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn target_width(&self) -> usize {
        self.target_width
    }

    pub fn seq_length(&self) -> usize {
        self.seq_length
    }

    /// Rows covered by kept sequences
    pub fn rows(&self) -> usize {
        self.starts.len() * self.seq_length
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }
}

impl Dataset<SequenceSample> for OrientationDataset {
    fn get(&self, index: usize) -> Option<SequenceSample> {
        let start = *self.starts.get(index)?;
        let end   = start + self.seq_length;
        Some(SequenceSample {
            inputs:  self.inputs[start * self.input_width..end * self.input_width].to_vec(),
            targets: self.targets[start * self.target_width..end * self.target_width].to_vec(),
        })
    }

    fn len(&self) -> usize {
        self.starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `rows` rows where every value equals its row index
    fn ramp(rows: usize, width: usize) -> Vec<f32> {
        (0..rows).flat_map(|r| std::iter::repeat(r as f32).take(width)).collect()
    }

    #[test]
    fn test_drop_last_truncation() {
        let ds = OrientationDataset::new(ramp(43, 3), 3, ramp(43, 2), 2, 5, 4).unwrap();
        assert_eq!(ds.len(), 8);
        assert_eq!(ds.rows(), 40);
        assert_eq!(ds.dropped_rows(), 3);
        assert!(ds.get(8).is_none());
    }

    #[test]
    fn test_exact_fit_drops_nothing() {
        let ds = OrientationDataset::new(ramp(40, 3), 3, ramp(40, 2), 2, 5, 4).unwrap();
        assert_eq!(ds.len(), 8);
        assert_eq!(ds.dropped_rows(), 0);
    }

    #[test]
    fn test_too_few_rows_gives_empty_dataset() {
        let ds = OrientationDataset::new(ramp(19, 3), 3, ramp(19, 2), 2, 5, 4).unwrap();
        assert_eq!(ds.len(), 0);
        assert_eq!(ds.dropped_rows(), 19);
    }

    #[test]
    fn test_sequences_keep_temporal_order() {
        let ds = OrientationDataset::new(ramp(40, 3), 3, ramp(40, 2), 2, 5, 4).unwrap();
        let s = ds.get(2).unwrap();
        assert_eq!(s.inputs.len(), 15);
        assert_eq!(s.targets.len(), 10);
        let row_ids: Vec<f32> = s.inputs.chunks(3).map(|r| r[0]).collect();
        assert_eq!(row_ids, vec![10.0, 11.0, 12.0, 13.0, 14.0]);
        let target_ids: Vec<f32> = s.targets.chunks(2).map(|r| r[1]).collect();
        assert_eq!(target_ids, row_ids);
    }

    #[test]
    fn test_sequences_stay_inside_one_recording() {
        // rows 0..12 are one recording, 12..20 the next
        let ds = OrientationDataset::with_spans(
            ramp(20, 3), 3, ramp(20, 2), 2, &[(0, 12), (12, 8)], 5, 1,
        ).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dropped_rows(), 5);

        let first_rows: Vec<f32> = (0..ds.len()).map(|i| ds.get(i).unwrap().inputs[0]).collect();
        assert_eq!(first_rows, vec![0.0, 5.0, 12.0]);
    }

    #[test]
    fn test_drop_last_applies_after_recording_split() {
        // 3 sequences in total, batch of 2 keeps the first 2
        let ds = OrientationDataset::with_spans(
            ramp(20, 3), 3, ramp(20, 2), 2, &[(0, 12), (12, 8)], 5, 2,
        ).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows(), 10);
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        let err = OrientationDataset::new(ramp(10, 3), 3, ramp(9, 2), 2, 5, 1).unwrap_err();
        assert!(matches!(err, DatasetError::Alignment { inputs: 10, targets: 9, .. }));
    }
}
