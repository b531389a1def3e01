/// Whether the consumer kept up when an epoch was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pace {
    /// Fewer than `step` new samples arrived since the previous epoch.
    #[default]
    OnTime,
    /// At least `step` new samples arrived; older samples were skipped.
    Slow,
}

/// A channel-major window of samples, `[n_channels][len]`.
///
/// Epochs are plain copies: changing one never affects the ring buffer or
/// any other epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Epoch {
    rows: Vec<Vec<f64>>,
    channel_ids: Vec<usize>,
    pace: Pace,
}

impl Epoch {
    /// `rows[i]` holds the samples of source channel `channel_ids[i]`.
    pub fn new(rows: Vec<Vec<f64>>, channel_ids: Vec<usize>, pace: Pace) -> Self {
        debug_assert_eq!(rows.len(), channel_ids.len());
        Self {
            rows,
            channel_ids,
            pace,
        }
    }

    pub fn n_channels(&self) -> usize {
        self.rows.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    /// Source channel index of each row.
    pub fn channel_ids(&self) -> &[usize] {
        &self.channel_ids
    }

    pub fn pace(&self) -> Pace {
        self.pace
    }

    pub fn is_slow(&self) -> bool {
        self.pace == Pace::Slow
    }

    /// Sample `t` across all rows.
    pub fn sample(&self, t: usize) -> Option<Vec<f64>> {
        self.rows.iter().map(|row| row.get(t).copied()).collect()
    }

    /// Copy of this epoch keeping row `i` only where `mask[i]` is `true`.
    /// Rows past the end of the mask are dropped.
    pub fn masked(&self, mask: &[bool]) -> Epoch {
        let (rows, channel_ids) = self
            .rows
            .iter()
            .zip(&self.channel_ids)
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|((row, id), _)| (row.clone(), *id))
            .unzip();
        Epoch {
            rows,
            channel_ids,
            pace: self.pace,
        }
    }
}
