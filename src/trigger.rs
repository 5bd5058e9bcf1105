//! Active-region trigger evaluation
//!
//! Each edge-sensitive entry of a sensitivity list gets one bit of edge memory
//! and one bit in the [`TriggerVector`]. `top` has a single entry, `posedge clk`.

use log::trace;

/// Result of a single rising-edge check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub fired: bool,
    /// Value the caller must store as edge memory for the next step
    pub new_prev: bool,
}

/// Rising edge: current AND NOT previous.
#[inline(always)]
pub fn detect(clock_now: bool, clock_prev: bool) -> Edge {
    Edge { fired: clock_now & !clock_prev, new_prev: clock_now }
}

/// One bit per triggering condition, rebuilt every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerVector {
    bits: u64,
    width: usize,
}

impl TriggerVector {
    pub const MAX_WIDTH: usize = 64;

    pub fn new(width: usize) -> Self {
        assert!(width <= Self::MAX_WIDTH, "trigger vector wider than {} bits", Self::MAX_WIDTH);
        Self { bits: 0, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn set(&mut self, bit: usize, value: bool) {
        debug_assert!(bit < self.width);
        if value {
            self.bits |= 1 << bit;
        } else {
            self.bits &= !(1 << bit);
        }
    }

    #[inline(always)]
    pub fn get(&self, bit: usize) -> bool {
        bit < self.width && (self.bits >> bit) & 1 != 0
    }

    #[inline(always)]
    pub fn any(&self) -> bool {
        self.bits != 0
    }

    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }
}

/// Edge memory for every sensitivity entry
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    /// Human-readable label per entry, e.g. `@(posedge clk)`
    labels: Vec<&'static str>,
    /// Clock values as of the previous step
    prev_clock_values: Vec<bool>,
}

impl TriggerDetector {
    pub fn new(labels: Vec<&'static str>) -> Self {
        assert!(labels.len() <= TriggerVector::MAX_WIDTH);
        let prev_clock_values = vec![false; labels.len()];
        Self { labels, prev_clock_values }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn prev_clock_values(&self) -> &[bool] {
        &self.prev_clock_values
    }

    /// Compute every trigger bit from `clocks`, then update edge memory.
    ///
    /// Memory is written after all bits are computed and on every call, fired or not.
    pub fn eval_triggers(&mut self, clocks: &[bool]) -> TriggerVector {
        debug_assert_eq!(clocks.len(), self.prev_clock_values.len());
        let mut vector = TriggerVector::new(self.labels.len());
        let edges: Vec<Edge> = clocks
            .iter()
            .zip(&self.prev_clock_values)
            .map(|(&now, &prev)| detect(now, prev))
            .collect();

        for (i, edge) in edges.iter().enumerate() {
            vector.set(i, edge.fired);
        }
        for (mem, edge) in self.prev_clock_values.iter_mut().zip(&edges) {
            *mem = edge.new_prev;
        }

        if log::log_enabled!(log::Level::Trace) {
            for (i, label) in self.labels.iter().enumerate() {
                if vector.get(i) {
                    trace!("'act' region trigger index {} is active: {}", i, label);
                }
            }
        }
        vector
    }

    pub fn reset_memory(&mut self) {
        for v in self.prev_clock_values.iter_mut() {
            *v = false;
        }
    }
}
