//! Port table for the `top` module
//!
//! Signals are stored in a flat `Vec` and addressed by index in the hot path;
//! names are only consulted by `poke`/`peek`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// A named port with its current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: &'static str,
    pub direction: Direction,
    pub width: usize,
    value: u64,
}

impl Signal {
    pub const fn new(name: &'static str, direction: Direction, width: usize) -> Self {
        Self { name, direction, width, value: 0 }
    }

    #[inline(always)]
    pub fn value(&self) -> u64 {
        self.value
    }

    #[inline(always)]
    pub fn bit(&self) -> bool {
        self.value & 1 != 0
    }

    /// Store `value`, truncated to the signal width.
    #[inline(always)]
    pub fn set(&mut self, value: u64) {
        self.value = value & compute_mask(self.width);
    }
}

#[inline(always)]
pub fn compute_mask(width: usize) -> u64 {
    if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}

pub const CLK: usize = 0;
pub const RST: usize = 1;
pub const INPUT_DATA: usize = 2;
pub const OUTPUT_DATA: usize = 3;

/// The four ports of `top`, in declaration order.
#[derive(Debug, Clone)]
pub struct SignalTable {
    signals: Vec<Signal>,
    name_to_idx: HashMap<&'static str, usize>,
}

impl SignalTable {
    pub fn new() -> Self {
        let signals = vec![
            Signal::new("clk", Direction::In, 1),
            Signal::new("rst", Direction::In, 1),
            Signal::new("input_data", Direction::In, 8),
            Signal::new("output_data", Direction::Out, 8),
        ];
        let name_to_idx = signals.iter().enumerate().map(|(i, s)| (s.name, i)).collect();
        Self { signals, name_to_idx }
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.name_to_idx
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownSignal(name.to_string()))
    }

    #[inline(always)]
    pub fn get(&self, idx: usize) -> &Signal {
        &self.signals[idx]
    }

    #[inline(always)]
    pub fn set(&mut self, idx: usize, value: u64) {
        self.signals[idx].set(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn input_names(&self) -> Vec<&'static str> {
        self.signals.iter().filter(|s| s.direction == Direction::In).map(|s| s.name).collect()
    }

    pub fn output_names(&self) -> Vec<&'static str> {
        self.signals.iter().filter(|s| s.direction == Direction::Out).map(|s| s.name).collect()
    }

    pub fn clear(&mut self) {
        for sig in self.signals.iter_mut() {
            sig.set(0);
        }
    }
}

impl Default for SignalTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_mask() {
        assert_eq!(compute_mask(1), 0x1);
        assert_eq!(compute_mask(8), 0xFF);
        assert_eq!(compute_mask(64), u64::MAX);
    }

    #[test]
    fn test_set_truncates_to_width() {
        let mut table = SignalTable::new();
        table.set(INPUT_DATA, 0x1_41);
        assert_eq!(table.get(INPUT_DATA).value(), 0x41);
        table.set(CLK, 2);
        assert_eq!(table.get(CLK).value(), 0);
        assert!(!table.get(CLK).bit());
    }

    #[test]
    fn test_port_lookup() {
        let table = SignalTable::new();
        assert_eq!(table.index_of("output_data").unwrap(), OUTPUT_DATA);
        assert!(matches!(table.index_of("data_out"), Err(SimError::UnknownSignal(_))));
        assert_eq!(table.input_names(), vec!["clk", "rst", "input_data"]);
        assert_eq!(table.output_names(), vec!["output_data"]);
    }
}
