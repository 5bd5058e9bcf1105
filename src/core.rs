//! Core simulator for the `top` module
//!
//! One `TopSimulator` owns every piece of state for one instance: ports, edge
//! memory and the coverage bank. Nothing is shared between instances.
//!
//! A step (`eval`) runs the active region and, when any trigger fired, the NBA
//! region. NBA samples every right-hand side before committing, so all reads see
//! pre-edge values.

use log::{debug, trace};

use crate::coverage::{CoverageBank, CoverageSnapshot};
use crate::error::{Result, SimError};
use crate::evaluator::{self, BranchId};
use crate::signal::{Direction, SignalTable, CLK, INPUT_DATA, OUTPUT_DATA, RST};
use crate::trigger::{TriggerDetector, TriggerVector};

/// Trigger bit for `@(posedge clk)`
pub const TRIGGER_POSEDGE_CLK: usize = 0;

/// What happened during one `eval` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub triggered: bool,
    /// Branch taken by the sequential block, if it ran
    pub branch: Option<BranchId>,
}

pub struct TopSimulator {
    /// Port values
    pub signals: SignalTable,
    /// Edge memory and trigger computation
    triggers: TriggerDetector,
    /// Coverage counters
    coverage: CoverageBank,
    /// Total `eval` calls
    steps: u64,
    /// `eval` calls that ran the NBA region
    triggered_steps: u64,
}

impl TopSimulator {
    pub fn new() -> Self {
        Self::with_bank(CoverageBank::new())
    }

    /// Build with a caller-supplied cover-point table.
    pub fn with_coverage_json(json: &str) -> Result<Self> {
        Ok(Self::with_bank(CoverageBank::from_json(json)?))
    }

    fn with_bank(coverage: CoverageBank) -> Self {
        let signals = SignalTable::new();
        let triggers = TriggerDetector::new(vec!["@(posedge clk)"]);
        debug!(
            "top: {} ports, {} trigger(s), {} cover points",
            signals.iter().count(),
            triggers.len(),
            coverage.counts().len()
        );
        Self { signals, triggers, coverage, steps: 0, triggered_steps: 0 }
    }

    pub fn poke(&mut self, name: &str, value: u64) -> Result<()> {
        let idx = self.signals.index_of(name)?;
        if self.signals.get(idx).direction != Direction::In {
            return Err(SimError::NotAnInput(name.to_string()));
        }
        self.signals.set(idx, value);
        Ok(())
    }

    pub fn peek(&self, name: &str) -> Result<u64> {
        let idx = self.signals.index_of(name)?;
        Ok(self.signals.get(idx).value())
    }

    pub fn set_clk(&mut self, value: bool) {
        self.signals.set(CLK, value as u64);
    }

    pub fn set_rst(&mut self, value: bool) {
        self.signals.set(RST, value as u64);
    }

    pub fn set_input_data(&mut self, value: u8) {
        self.signals.set(INPUT_DATA, value as u64);
    }

    pub fn output_data(&self) -> u8 {
        self.signals.get(OUTPUT_DATA).value() as u8
    }

    fn eval_triggers(&mut self) -> TriggerVector {
        let clk = self.signals.get(CLK).bit();
        self.triggers.eval_triggers(&[clk])
    }

    /// NBA region: sample, compute, then commit.
    fn eval_nba(&mut self, triggered: &TriggerVector) -> Option<BranchId> {
        if !triggered.get(TRIGGER_POSEDGE_CLK) {
            return None;
        }
        let rst = self.signals.get(RST).bit();
        let input_data = self.signals.get(INPUT_DATA).value() as u8;

        let (next_output_data, branch) = evaluator::evaluate(rst, input_data, &mut self.coverage);

        self.signals.set(OUTPUT_DATA, next_output_data as u64);
        Some(branch)
    }

    /// Evaluate one step.
    #[inline(always)]
    pub fn eval(&mut self) -> StepOutcome {
        self.steps += 1;
        let triggered = self.eval_triggers();
        if !triggered.any() {
            return StepOutcome { triggered: false, branch: None };
        }
        self.triggered_steps += 1;
        let branch = self.eval_nba(&triggered);
        trace!("step {}: {:?}", self.steps, branch);
        StepOutcome { triggered: true, branch }
    }

    /// Drive one full clock cycle (falling then rising edge).
    ///
    /// Returns the outcome of the rising-edge step.
    pub fn tick(&mut self) -> StepOutcome {
        self.set_clk(false);
        self.eval();
        self.set_clk(true);
        self.eval()
    }

    /// Zero all ports and edge memory. Coverage counters are kept.
    pub fn reset_state(&mut self) {
        self.signals.clear();
        self.triggers.reset_memory();
    }

    pub fn coverage(&self) -> &CoverageBank {
        &self.coverage
    }

    pub fn coverage_snapshot(&self) -> CoverageSnapshot {
        self.coverage.snapshot()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn triggered_steps(&self) -> u64 {
        self.triggered_steps
    }
}

impl Default for TopSimulator {
    fn default() -> Self {
        Self::new()
    }
}
