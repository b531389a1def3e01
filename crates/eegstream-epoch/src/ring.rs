use std::num::NonZeroUsize;

/// Fixed-capacity circular buffer of multi-channel samples.
///
/// Storage is one contiguous channel-major arena allocated up front:
/// slot `s` of channel `c` lives at `c * capacity + s`. Pushing into a full
/// buffer overwrites the oldest sample. Nothing allocates after `new`.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    n_channels: usize,
    capacity: usize,
    data: Vec<f64>,
    /// Slot of the oldest sample.
    head: usize,
    len: usize,
}

impl RingBuffer {
    /// # Panics
    ///
    /// If `n_channels * capacity` overflows `usize`.
    /// [`Windower::new`](crate::Windower::new) checks the size first.
    pub fn new(n_channels: usize, capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        let slots = n_channels
            .checked_mul(capacity)
            .unwrap_or_else(|| panic!("ring of {n_channels} x {capacity} values overflows"));
        Self {
            n_channels,
            capacity,
            data: vec![0.0; slots],
            head: 0,
            len: 0,
        }
    }

    /// Append one sample. Returns `true` if the oldest sample was evicted
    /// to make room.
    ///
    /// `sample` must hold exactly `n_channels` values.
    pub fn push(&mut self, sample: &[f64]) -> bool {
        debug_assert_eq!(sample.len(), self.n_channels);

        let evicted = self.len == self.capacity;
        let slot = if evicted {
            let slot = self.head;
            self.head = (self.head + 1) % self.capacity;
            slot
        } else {
            let slot = (self.head + self.len) % self.capacity;
            self.len += 1;
            slot
        };

        for (channel, value) in sample.iter().enumerate() {
            self.data[channel * self.capacity + slot] = *value;
        }
        evicted
    }

    /// Drop up to `n` of the oldest samples. Returns how many were dropped.
    pub fn pop_front(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        self.head = (self.head + n) % self.capacity;
        self.len -= n;
        n
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    /// Value of `channel` in the `index`-th oldest sample.
    pub fn get(&self, index: usize, channel: usize) -> Option<f64> {
        if index >= self.len || channel >= self.n_channels {
            return None;
        }
        let slot = (self.head + index) % self.capacity;
        Some(self.data[channel * self.capacity + slot])
    }

    /// The `index`-th oldest sample, one value per channel.
    pub fn sample(&self, index: usize) -> Option<Vec<f64>> {
        (0..self.n_channels)
            .map(|channel| self.get(index, channel))
            .collect()
    }

    /// Oldest-to-newest values of one channel.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f64> + '_ {
        let (first, second) = self.channel_slices(channel);
        first.iter().chain(second).copied()
    }

    /// Channel-major copy of the selected channels, oldest sample first.
    ///
    /// Panics if a channel index is out of range.
    pub fn snapshot(&self, channels: &[usize]) -> Vec<Vec<f64>> {
        channels
            .iter()
            .map(|&channel| {
                assert!(channel < self.n_channels, "channel {channel} out of range");
                let (first, second) = self.channel_slices(channel);
                let mut row = Vec::with_capacity(self.len);
                row.extend_from_slice(first);
                row.extend_from_slice(second);
                row
            })
            .collect()
    }

    fn channel_slices(&self, channel: usize) -> (&[f64], &[f64]) {
        if channel >= self.n_channels {
            return (&[], &[]);
        }
        let base = channel * self.capacity;
        let row = &self.data[base..base + self.capacity];
        let end = self.head + self.len;
        if end <= self.capacity {
            (&row[self.head..end], &[])
        } else {
            (&row[self.head..], &row[..end - self.capacity])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n_channels: usize, capacity: usize) -> RingBuffer {
        RingBuffer::new(n_channels, NonZeroUsize::new(capacity).unwrap())
    }

    fn channel0(ring: &RingBuffer) -> Vec<f64> {
        ring.channel(0).collect()
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut ring = ring(2, 5);
        for i in 0..23 {
            ring.push(&[i as f64, -(i as f64)]);
            assert!(ring.len() <= 5);
        }
        assert!(ring.is_full());
    }

    #[test]
    fn overflow_keeps_last_samples_in_order() {
        let mut ring = ring(1, 4);
        let evicted: Vec<bool> = (1..=7).map(|i| ring.push(&[i as f64])).collect();

        assert_eq!(evicted, vec![false, false, false, false, true, true, true]);
        assert_eq!(channel0(&ring), vec![4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn pop_front_drops_oldest() {
        let mut ring = ring(1, 4);
        for i in 1..=4 {
            ring.push(&[i as f64]);
        }

        assert_eq!(ring.pop_front(2), 2);
        assert_eq!(channel0(&ring), vec![3.0, 4.0]);

        ring.push(&[5.0]);
        ring.push(&[6.0]);
        assert_eq!(channel0(&ring), vec![3.0, 4.0, 5.0, 6.0]);

        assert_eq!(ring.pop_front(10), 4);
        assert!(ring.is_empty());
    }

    #[test]
    fn snapshot_is_channel_major_across_wraparound() {
        let mut ring = ring(3, 3);
        for i in 0..5 {
            let t = i as f64;
            ring.push(&[t, t * 10.0, t * 100.0]);
        }

        let rows = ring.snapshot(&[0, 1, 2]);
        assert_eq!(rows[0], vec![2.0, 3.0, 4.0]);
        assert_eq!(rows[1], vec![20.0, 30.0, 40.0]);
        assert_eq!(rows[2], vec![200.0, 300.0, 400.0]);

        assert_eq!(ring.snapshot(&[2, 0]), vec![rows[2].clone(), rows[0].clone()]);
    }

    #[test]
    fn random_access() {
        let mut ring = ring(2, 2);
        ring.push(&[1.0, 2.0]);
        ring.push(&[3.0, 4.0]);
        ring.push(&[5.0, 6.0]);

        assert_eq!(ring.sample(0), Some(vec![3.0, 4.0]));
        assert_eq!(ring.get(1, 1), Some(6.0));
        assert_eq!(ring.get(2, 0), None);
        assert_eq!(ring.get(0, 2), None);
    }

    #[test]
    fn clear_resets() {
        let mut ring = ring(1, 2);
        ring.push(&[1.0]);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.channel(0).count(), 0);
    }
}
