//! Sequential block of `top`: `always @(posedge clk)`
//!
//! Synchronous reset, then a priority chain of descending `input_data`
//! thresholds. All arithmetic wraps at 8 bits.

use log::trace;

use crate::coverage::{CoverPoint, CoverageBank};

/// Which arm of the block executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchId {
    Reset,
    /// `input_data == 0x00`
    Range0,
    /// `0x00 < input_data <= 0x40`
    Range1,
    /// `0x40 < input_data <= 0x80`
    Range2,
    /// `0x80 < input_data <= 0xA0`
    Range3,
    /// `0xA0 < input_data <= 0xE0`
    Range4,
    /// `0xE0 < input_data <= 0xF8`
    Range5,
    /// `0xF8 < input_data < 0xFF`
    Range6,
    /// `input_data == 0xFF`
    Range7,
}

impl BranchId {
    pub fn cover_point(self) -> CoverPoint {
        match self {
            BranchId::Reset => CoverPoint::Reset,
            BranchId::Range0 => CoverPoint::Range0,
            BranchId::Range1 => CoverPoint::Range1,
            BranchId::Range2 => CoverPoint::Range2,
            BranchId::Range3 => CoverPoint::Range3,
            BranchId::Range4 => CoverPoint::Range4,
            BranchId::Range5 => CoverPoint::Range5,
            BranchId::Range6 => CoverPoint::Range6,
            BranchId::Range7 => CoverPoint::Range7,
        }
    }
}

/// Next value of `output_data`. First matching arm wins.
#[inline(always)]
pub fn next_output(reset: bool, input_data: u8) -> (u8, BranchId) {
    match input_data {
        _ if reset => (0, BranchId::Reset),
        0xFF => (input_data << 1, BranchId::Range7),
        d if d > 0xF8 => (d.wrapping_add(0x0F), BranchId::Range6),
        d if d > 0xE0 => (d.wrapping_sub(0x10), BranchId::Range5),
        d if d > 0xA0 => (d.wrapping_sub(0x11), BranchId::Range4),
        d if d > 0x80 => (d.wrapping_sub(0x22), BranchId::Range3),
        d if d > 0x40 => (d.wrapping_sub(0x33), BranchId::Range2),
        d if d > 0x00 => (d.wrapping_sub(0x44), BranchId::Range1),
        d => (d, BranchId::Range0),
    }
}

/// Run the block once, recording coverage into `bank`.
pub fn evaluate(reset: bool, input_data: u8, bank: &mut CoverageBank) -> (u8, BranchId) {
    let (output, branch) = next_output(reset, input_data);
    bank.increment(branch.cover_point());
    if branch != BranchId::Reset {
        bank.increment(CoverPoint::NotReset);
    }
    bank.increment(CoverPoint::Block);
    trace!("nba: rst={} input_data={:#04x} -> {:?} output_data={:#04x}", reset as u8, input_data, branch, output);
    (output, branch)
}
