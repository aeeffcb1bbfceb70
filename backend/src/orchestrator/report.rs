//! Per-cycle reporters and run summaries

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregates read after each completed cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: usize,
    pub insolvencies: usize,
    pub contagion_insolvencies: usize,
    /// Insolvencies normalized by the number of banks
    pub insolvency_rate: f64,
    pub contagion_rate: f64,
    pub total_interbank_debt: f64,
    pub total_real_sector_loans: f64,
    pub central_bank_min_car: f64,
}

impl CycleReport {
    pub fn new(
        cycle: usize,
        number_banks: usize,
        insolvencies: usize,
        contagion_insolvencies: usize,
    ) -> Self {
        let (insolvency_rate, contagion_rate) = if number_banks == 0 {
            (0.0, 0.0)
        } else {
            let n = number_banks as f64;
            (insolvencies as f64 / n, contagion_insolvencies as f64 / n)
        };
        Self {
            cycle,
            insolvencies,
            contagion_insolvencies,
            insolvency_rate,
            contagion_rate,
            total_interbank_debt: 0.0,
            total_real_sector_loans: 0.0,
            central_bank_min_car: 0.0,
        }
    }
}

/// Identity and results of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// SHA-256 of the effective configuration
    pub config_fingerprint: String,
    pub seed: u64,
    pub cycles_run: usize,
    pub cycles: Vec<CycleReport>,
}

impl RunSummary {
    pub fn new(config_fingerprint: String, seed: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config_fingerprint,
            seed,
            cycles_run: 0,
            cycles: Vec::new(),
        }
    }

    pub fn push(&mut self, report: CycleReport) {
        self.cycles_run += 1;
        self.cycles.push(report);
    }

    pub fn total_insolvencies(&self) -> usize {
        self.cycles.iter().map(|c| c.insolvencies).sum()
    }

    pub fn total_contagion_insolvencies(&self) -> usize {
        self.cycles.iter().map(|c| c.contagion_insolvencies).sum()
    }

    /// Mean per-cycle insolvency rate
    pub fn mean_insolvency_rate(&self) -> f64 {
        if self.cycles.is_empty() {
            return 0.0;
        }
        self.cycles.iter().map(|c| c.insolvency_rate).sum::<f64>() / self.cycles.len() as f64
    }
}
