//! Probe statistics, available with the `stats` feature.

use alloc::vec::Vec;

/// Summary of a map's occupancy and probing behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of live entries.
    pub populated: usize,
    /// Number of slots holding a deletion marker.
    pub tombstones: usize,
    /// Total number of slots, which is also the maximum number of entries.
    pub capacity: usize,
    /// Bytes per slot: tag, key and value.
    pub slot_width: usize,
    /// Size of the backing buffer in bytes.
    pub total_bytes: usize,
    /// Load factor (populated / capacity).
    pub load_factor: f64,
    /// Largest distance of any live entry from its home slot.
    pub max_displacement: usize,
    /// Cumulative slot visits past the home slot over all operations.
    pub probe_count: u64,
}

impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Fixed Map Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!("Tombstones: {}", self.tombstones);
        println!(
            "Buffer: {} bytes ({} bytes per slot)",
            self.total_bytes, self.slot_width
        );
        println!("Max displacement: {}", self.max_displacement);
        println!("Probes past home slot: {}", self.probe_count);
    }
}

/// Distribution of live entries by distance from their home slot.
///
/// Bin `d` counts the entries stored `d` slots after the slot their hash maps
/// to. The last bin is always non-empty unless the map is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

impl ProbeHistogram {
    pub(crate) fn record(&mut self, displacement: usize) {
        if self.bins.len() <= displacement {
            self.bins.resize(displacement + 1, 0);
        }
        self.bins[displacement] += 1;
    }

    /// Entry counts indexed by displacement.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Total number of entries recorded.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.total());
        for (distance, &count) in self.bins.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", distance, "█".repeat(width), count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_grows_to_fit() {
        let mut hist = ProbeHistogram::default();
        assert_eq!(hist.total(), 0);

        hist.record(0);
        hist.record(0);
        hist.record(3);
        assert_eq!(hist.bins(), &[2, 0, 0, 1]);
        assert_eq!(hist.total(), 3);
    }
}
