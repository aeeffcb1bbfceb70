//! Clearing house
//!
//! Sole owner of the interbank ledger. Banks never write their interbank
//! position themselves; every change goes through one of the operations
//! here.

use crate::models::bank::Bank;
use crate::models::central_bank::CentralBank;
use crate::models::CycleAgent;
use crate::orchestrator::config::InterbankPriority;
use crate::rng::RngManager;
use tracing::debug;

use super::collateral::{apply_clearing_guarantee, CollateralPledge, GuaranteeTotals};
use super::contagion::propagate;
use super::ledger::InterbankLedger;
use super::matching::{build_queues, match_queues, order_queues, settle_positions, InterbankTrade};

/// Banks newly insolvent through contagion, with their creditors' loss
#[derive(Debug, Clone, PartialEq)]
pub struct ContagionOutcome {
    pub newly_insolvent: Vec<usize>,
    /// Reduction in gross interbank claims caused by the haircuts
    pub claims_written_off: f64,
}

#[derive(Debug, Clone)]
pub struct ClearingHouse {
    ledger: InterbankLedger,
    recovery: Vec<f64>,
    totals: GuaranteeTotals,
    guarantee_available: bool,
    priority: InterbankPriority,
    offering: Vec<usize>,
    needing: Vec<usize>,
}

impl ClearingHouse {
    pub fn new(number_banks: usize, guarantee_available: bool, priority: InterbankPriority) -> Self {
        Self {
            ledger: InterbankLedger::new(number_banks),
            recovery: vec![1.0; number_banks],
            totals: GuaranteeTotals::default(),
            guarantee_available,
            priority,
            offering: Vec::new(),
            needing: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &InterbankLedger {
        &self.ledger
    }

    pub fn recovery(&self) -> &[f64] {
        &self.recovery
    }

    pub fn totals(&self) -> &GuaranteeTotals {
        &self.totals
    }

    pub fn guarantee_available(&self) -> bool {
        self.guarantee_available
    }

    /// Queues of the last matching round, in priority order
    pub fn offering_queue(&self) -> &[usize] {
        &self.offering
    }

    pub fn needing_queue(&self) -> &[usize] {
        &self.needing
    }

    /// Match surplus and deficit banks and book the trades
    pub fn organize_interbank_market(
        &mut self,
        banks: &mut [Bank],
        rng: &mut RngManager,
    ) -> Vec<InterbankTrade> {
        let (mut offering, mut needing) = build_queues(banks);
        order_queues(banks, &mut offering, &mut needing, self.priority, rng);
        let trades = match_queues(&mut self.ledger, banks, &offering, &needing);
        settle_positions(&self.ledger, banks);

        debug!(
            offering = offering.len(),
            needing = needing.len(),
            trades = trades.len(),
            "interbank market cleared"
        );
        self.offering = offering;
        self.needing = needing;
        trades
    }

    /// Collateral waterfall; no-op unless the guarantee facility is on
    pub fn interbank_clearing_guarantee(&mut self, banks: &mut [Bank]) -> Vec<CollateralPledge> {
        if !self.guarantee_available {
            return Vec::new();
        }
        let (totals, pledges) = apply_clearing_guarantee(banks);
        debug!(
            total_debt = totals.total_interbank_debt,
            deficit = totals.total_collateral_deficit,
            surplus = totals.total_collateral_surplus,
            "collateral guarantee applied"
        );
        self.totals = totals;
        pledges
    }

    /// Propagate defaults and punish the banks they sink
    pub fn interbank_contagion(
        &mut self,
        banks: &mut [Bank],
        central_bank: &mut CentralBank,
    ) -> ContagionOutcome {
        let claims_before = self.ledger.gross_claims();
        let guarantee = self.guarantee_available.then_some(&self.totals);
        let newly_insolvent = propagate(&mut self.ledger, banks, &mut self.recovery, guarantee);

        for &position in &newly_insolvent {
            central_bank.punish_contagion_insolvency(&mut banks[position]);
        }
        ContagionOutcome {
            newly_insolvent,
            claims_written_off: claims_before - self.ledger.gross_claims(),
        }
    }

    /// Interbank interest on every position
    pub fn accrue_interest(&mut self, banks: &mut [Bank], interbank_rate: f64) {
        self.ledger.scale(1.0 + interbank_rate);
        for (position, bank) in banks.iter_mut().enumerate() {
            bank.set_interbank_position(self.ledger.row_sum(position));
        }
    }
}

impl CycleAgent for ClearingHouse {
    fn reset_cycle(&mut self) {
        self.ledger.reset();
        self.recovery.iter_mut().for_each(|rate| *rate = 1.0);
        self.totals = GuaranteeTotals::default();
        self.offering.clear();
        self.needing.clear();
    }
}
