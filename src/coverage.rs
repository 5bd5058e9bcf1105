//! Line/branch coverage for the `top` module
//!
//! The bank holds one counter per instrumented point. Counters start at zero,
//! only ever increase (wrapping at `u32::MAX`), and survive `reset_state`.
//! Per-point metadata is pure description for reporting tools; it is loaded once
//! from JSON and never consulted during evaluation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Number of instrumented points in `top`
pub const NUM_POINTS: usize = 11;

const DEFAULT_POINTS_JSON: &str = include_str!("coverage_points.json");

/// Instrumented point. The discriminant is the counter's bank index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverPoint {
    /// `input_data > 0x00`
    Range1 = 0,
    /// `input_data == 0x00`
    Range0 = 1,
    Range2 = 2,
    Range3 = 3,
    Range4 = 4,
    Range5 = 5,
    Range6 = 6,
    /// `input_data == 0xFF`
    Range7 = 7,
    Reset = 8,
    NotReset = 9,
    /// Unconditional, once per block execution
    Block = 10,
}

impl CoverPoint {
    pub const ALL: [CoverPoint; NUM_POINTS] = [
        CoverPoint::Range1,
        CoverPoint::Range0,
        CoverPoint::Range2,
        CoverPoint::Range3,
        CoverPoint::Range4,
        CoverPoint::Range5,
        CoverPoint::Range6,
        CoverPoint::Range7,
        CoverPoint::Reset,
        CoverPoint::NotReset,
        CoverPoint::Block,
    ];

    /// The eight mutually exclusive data-range points
    pub const RANGES: [CoverPoint; 8] = [
        CoverPoint::Range0,
        CoverPoint::Range1,
        CoverPoint::Range2,
        CoverPoint::Range3,
        CoverPoint::Range4,
        CoverPoint::Range5,
        CoverPoint::Range6,
        CoverPoint::Range7,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

/// Source annotation for one counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverMeta {
    pub index: usize,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub hier: String,
    /// Kind tag, e.g. `v_line/top` or `v_branch/top`
    pub page: String,
    pub comment: String,
    /// Covered line range, e.g. `26-27`
    pub lines: String,
}

/// Parse and validate a cover-point table.
///
/// Entries may appear in any order; the result is sorted by bank index.
pub fn parse_cover_meta(json: &str) -> Result<Vec<CoverMeta>> {
    let mut meta: Vec<CoverMeta> = serde_json::from_str(json)?;
    if meta.len() != NUM_POINTS {
        return Err(SimError::CoverageConfig(format!(
            "expected {} points, found {}",
            NUM_POINTS,
            meta.len()
        )));
    }
    meta.sort_by_key(|m| m.index);
    for (expected, m) in meta.iter().enumerate() {
        if m.index != expected {
            return Err(SimError::CoverageConfig(format!(
                "bank index {} missing or duplicated",
                expected
            )));
        }
    }
    Ok(meta)
}

/// The `top.sv` annotations.
pub fn default_cover_meta() -> Vec<CoverMeta> {
    parse_cover_meta(DEFAULT_POINTS_JSON).unwrap_or_else(|e| panic!("built-in coverage table: {}", e))
}

/// Counter bank owned by one simulator instance
#[derive(Debug, Clone)]
pub struct CoverageBank {
    counts: [u32; NUM_POINTS],
    meta: Vec<CoverMeta>,
}

impl CoverageBank {
    pub fn new() -> Self {
        Self::with_meta(default_cover_meta())
    }

    /// `meta` must already be validated by [`parse_cover_meta`].
    pub fn with_meta(meta: Vec<CoverMeta>) -> Self {
        debug_assert_eq!(meta.len(), NUM_POINTS);
        Self { counts: [0; NUM_POINTS], meta }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::with_meta(parse_cover_meta(json)?))
    }

    #[inline(always)]
    pub fn increment(&mut self, point: CoverPoint) {
        let c = &mut self.counts[point.index()];
        *c = c.wrapping_add(1);
    }

    #[inline(always)]
    pub fn get(&self, point: CoverPoint) -> u32 {
        self.counts[point.index()]
    }

    pub fn counts(&self) -> &[u32; NUM_POINTS] {
        &self.counts
    }

    pub fn meta(&self) -> &[CoverMeta] {
        &self.meta
    }

    /// Number of times the sequential block has executed
    pub fn total_invocations(&self) -> u32 {
        self.get(CoverPoint::Block)
    }

    pub fn snapshot(&self) -> CoverageSnapshot {
        CoverageSnapshot { counts: self.counts.to_vec(), meta: self.meta.clone() }
    }
}

impl Default for CoverageBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned, read-only copy of a bank for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSnapshot {
    pub counts: Vec<u32>,
    pub meta: Vec<CoverMeta>,
}

impl CoverageSnapshot {
    pub fn get(&self, point: CoverPoint) -> u32 {
        self.counts.get(point.index()).copied().unwrap_or(0)
    }

    pub fn hit_points(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Points that never executed, with their annotations
    pub fn uncovered(&self) -> Vec<(CoverPoint, &CoverMeta)> {
        CoverPoint::ALL
            .iter()
            .zip(&self.meta)
            .filter(|(p, _)| self.get(**p) == 0)
            .map(|(p, m)| (*p, m))
            .collect()
    }

    pub fn percent_covered(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        self.hit_points() as f64 * 100.0 / self.counts.len() as f64
    }

    /// Element-wise sum with a snapshot from another instance of the same design.
    pub fn merge(&mut self, other: &CoverageSnapshot) -> Result<()> {
        if self.meta != other.meta || self.counts.len() != other.counts.len() {
            return Err(SimError::MetadataMismatch);
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a = a.wrapping_add(*b);
        }
        Ok(())
    }

    /// Check the structural relations between counters:
    /// `Reset + NotReset == Block` and `sum(ranges) == NotReset`.
    pub fn check_invariants(&self) -> Result<()> {
        if self.counts.len() != NUM_POINTS {
            return Err(SimError::CoverageInvariant(format!(
                "expected {} counters, found {}",
                NUM_POINTS,
                self.counts.len()
            )));
        }
        let reset = self.get(CoverPoint::Reset);
        let not_reset = self.get(CoverPoint::NotReset);
        let block = self.get(CoverPoint::Block);
        if reset.wrapping_add(not_reset) != block {
            return Err(SimError::CoverageInvariant(format!(
                "reset ({}) + not-reset ({}) != block ({})",
                reset, not_reset, block
            )));
        }
        let ranges = CoverPoint::RANGES
            .iter()
            .fold(0u32, |acc, p| acc.wrapping_add(self.get(*p)));
        if ranges != not_reset {
            return Err(SimError::CoverageInvariant(format!(
                "range branches ({}) != not-reset ({})",
                ranges, not_reset
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let meta = default_cover_meta();
        assert_eq!(meta.len(), NUM_POINTS);
        assert_eq!(meta[CoverPoint::Range7.index()].lines, "14-15");
        assert_eq!(meta[CoverPoint::Reset.index()].page, "v_branch/top");
        assert_eq!(meta[CoverPoint::NotReset.index()].comment, "else");
        assert_eq!(meta[CoverPoint::Block.index()].line, 10);
    }

    #[test]
    fn test_index_roundtrip() {
        for (i, p) in CoverPoint::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(CoverPoint::from_index(i), Some(*p));
        }
        assert_eq!(CoverPoint::from_index(NUM_POINTS), None);
    }

    #[test]
    fn test_rejects_short_table() {
        let err = parse_cover_meta("[]").unwrap_err();
        assert!(matches!(err, SimError::CoverageConfig(_)));
    }

    #[test]
    fn test_rejects_duplicate_index() {
        let mut meta = default_cover_meta();
        meta[3].index = 2;
        let json = serde_json::to_string(&meta).unwrap();
        assert!(matches!(parse_cover_meta(&json), Err(SimError::CoverageConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(parse_cover_meta("{"), Err(SimError::Json(_))));
    }

    #[test]
    fn test_accepts_unsorted_table() {
        let mut meta = default_cover_meta();
        meta.reverse();
        let json = serde_json::to_string(&meta).unwrap();
        let parsed = parse_cover_meta(&json).unwrap();
        assert_eq!(parsed, default_cover_meta());
    }

    #[test]
    fn test_snapshot_summary() {
        let mut bank = CoverageBank::new();
        bank.increment(CoverPoint::Reset);
        bank.increment(CoverPoint::Block);
        let snap = bank.snapshot();
        assert_eq!(snap.hit_points(), 2);
        assert_eq!(snap.uncovered().len(), NUM_POINTS - 2);
        assert!((snap.percent_covered() - 200.0 / 11.0).abs() < 1e-9);
        snap.check_invariants().unwrap();
    }

    #[test]
    fn test_invariant_violation_detected() {
        let mut bank = CoverageBank::new();
        bank.increment(CoverPoint::Range3);
        bank.increment(CoverPoint::Block);
        let err = bank.snapshot().check_invariants().unwrap_err();
        assert!(matches!(err, SimError::CoverageInvariant(_)));
    }

    #[test]
    fn test_merge() {
        let mut a = CoverageBank::new();
        a.increment(CoverPoint::Range2);
        let mut b = CoverageBank::new();
        b.increment(CoverPoint::Range2);
        b.increment(CoverPoint::Range7);
        let mut snap = a.snapshot();
        snap.merge(&b.snapshot()).unwrap();
        assert_eq!(snap.get(CoverPoint::Range2), 2);
        assert_eq!(snap.get(CoverPoint::Range7), 1);

        let mut other_meta = default_cover_meta();
        other_meta[0].file = "other.sv".to_string();
        let c = CoverageBank::with_meta(other_meta);
        assert!(matches!(snap.merge(&c.snapshot()), Err(SimError::MetadataMismatch)));
    }

    #[test]
    fn test_snapshot_json() {
        let mut bank = CoverageBank::new();
        bank.increment(CoverPoint::Range0);
        let json = bank.snapshot().to_json().unwrap();
        let back: CoverageSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(CoverPoint::Range0), 1);
        assert_eq!(back.meta[1].lines, "28-29");
    }
}
