//! Orchestrator - main simulation loop
//!
//! Drives the three-period cycle across every agent group. Each period is
//! a barrier: all five groups finish a period, in the fixed group order,
//! before any group starts the next one.
//!
//! # Cycle Structure
//!
//! ```text
//! reset_cycle  -> clear per-cycle state of every agent
//! Setup        -> strategy choice, balance-sheet rebuild, capital rules,
//!                 snapshot of every balance sheet
//! Shock        -> withdrawals, self-funding, interbank market, collateral,
//!                 discount window, fire sales
//! Settle       -> interest, loan collection, bailouts and punishment,
//!                 contagion, profits, utilities, liquidation
//! ```
//!
//! # Example
//!
//! ```rust
//! use banksim_core::{ModelConfig, Orchestrator};
//!
//! let config = ModelConfig {
//!     number_banks: 4,
//!     number_depositors_per_bank: 10,
//!     number_corporate_clients_per_bank: 5,
//!     ..ModelConfig::default()
//! };
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! let summary = orchestrator.run(3).unwrap();
//!
//! assert_eq!(summary.cycles_run, 3);
//! assert_eq!(orchestrator.current_cycle(), 3);
//! ```

use crate::core::identity::IdentityIssuer;
use crate::core::time::{CycleClock, Period};
use crate::models::balance_sheet::Account;
use crate::models::{
    Bailout, Bank, CentralBank, CycleAgent, Event, EventLog, ProfitParams, ShockParams,
};
use crate::orchestrator::config::{CapitalRules, ConfigError, ModelConfig};
use crate::orchestrator::population::build_population;
use crate::orchestrator::report::{CycleReport, RunSummary};
use crate::orchestrator::scenario::ScenarioPreset;
use crate::rng::RngManager;
use crate::settlement::collateral::total_and_biggest_interbank_debt;
use crate::settlement::ClearingHouse;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Errors
// ============================================================================

/// Failures that stop a run
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// An account left the finite range mid-cycle; the run is aborted
    #[error("non-finite {account} on bank {bank} in cycle {cycle}")]
    NonFiniteState {
        cycle: usize,
        bank: usize,
        account: Account,
    },

    /// The run was aborted earlier and cannot advance
    #[error("run aborted in cycle {cycle}")]
    Aborted { cycle: usize },
}

// ============================================================================
// Agent groups
// ============================================================================

/// The five agent groups, in scheduling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Depositors,
    Banks,
    ClearingHouse,
    CentralBank,
    CorporateClients,
}

impl AgentKind {
    pub const ORDER: [AgentKind; 5] = [
        AgentKind::Depositors,
        AgentKind::Banks,
        AgentKind::ClearingHouse,
        AgentKind::CentralBank,
        AgentKind::CorporateClients,
    ];
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Composition root and scheduler of one model instance
#[derive(Debug)]
pub struct Orchestrator {
    config: ModelConfig,
    rules: CapitalRules,
    banks: Vec<Bank>,
    clearing_house: ClearingHouse,
    central_bank: CentralBank,
    rng: RngManager,
    clock: CycleClock,
    event_log: EventLog,
    summary: RunSummary,
    /// Cycle in which the run was aborted
    aborted: Option<usize>,
    cycle_interbank_debt: f64,
    cycle_real_sector_loans: f64,
}

impl Orchestrator {
    /// Validate `config` and build the population
    pub fn new(config: ModelConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut rng = RngManager::new(config.rng_seed);
        let mut ids = IdentityIssuer::new();
        let population = build_population(&config, &mut rng, &mut ids);
        let summary = RunSummary::new(config.fingerprint(), config.rng_seed);

        info!(
            banks = config.number_banks,
            agents = ids.issued(),
            seed = config.rng_seed,
            fingerprint = %summary.config_fingerprint,
            "model constructed"
        );

        Ok(Self {
            rules: config.capital_rules(),
            config,
            banks: population.banks,
            clearing_house: population.clearing_house,
            central_bank: population.central_bank,
            rng,
            clock: CycleClock::new(),
            event_log: EventLog::new(),
            summary,
            aborted: None,
            cycle_interbank_debt: 0.0,
            cycle_real_sector_loans: 0.0,
        })
    }

    /// Build from a named preset with baseline settings otherwise
    pub fn from_preset(preset: ScenarioPreset) -> Result<Self, SimulationError> {
        Self::new(ModelConfig::from_preset(preset))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    /// Mutable access to the banks for test fixtures
    #[cfg(any(test, feature = "test-support"))]
    pub fn banks_mut(&mut self) -> &mut [Bank] {
        &mut self.banks
    }

    pub fn clearing_house(&self) -> &ClearingHouse {
        &self.clearing_house
    }

    pub fn central_bank(&self) -> &CentralBank {
        &self.central_bank
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn reports(&self) -> &[CycleReport] {
        &self.summary.cycles
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Number of cycles started
    pub fn current_cycle(&self) -> usize {
        self.clock.current_cycle()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    // ========================================================================
    // Driver
    // ========================================================================

    /// Run `cycles` cycles and return the summary so far
    pub fn run(&mut self, cycles: usize) -> Result<RunSummary, SimulationError> {
        for _ in 0..cycles {
            self.advance_cycle()?;
        }
        Ok(self.summary.clone())
    }

    /// Run one full cycle: reset, Setup, Shock, Settle
    ///
    /// A cycle either completes or aborts the whole run; after an abort
    /// every further call fails with [`SimulationError::Aborted`].
    pub fn advance_cycle(&mut self) -> Result<CycleReport, SimulationError> {
        if let Some(cycle) = self.aborted {
            return Err(SimulationError::Aborted { cycle });
        }

        self.clock.advance_cycle();
        let cycle = self.clock.current_cycle();
        self.reset_cycle();

        for period in Period::ORDER {
            if let Err(err) = self.run_period(period) {
                warn!(cycle, error = %err, "run aborted");
                self.aborted = Some(cycle);
                self.clock.finish_cycle();
                return Err(err);
            }
        }
        self.clock.finish_cycle();

        let report = self.cycle_report(cycle);
        self.event_log.log(Event::CycleCompleted {
            cycle,
            insolvencies: report.insolvencies,
            contagion_insolvencies: report.contagion_insolvencies,
        });
        info!(
            cycle,
            insolvencies = report.insolvencies,
            contagion = report.contagion_insolvencies,
            interbank_debt = report.total_interbank_debt,
            "cycle completed"
        );
        self.summary.push(report.clone());
        Ok(report)
    }

    fn cycle_report(&self, cycle: usize) -> CycleReport {
        let mut report = CycleReport::new(
            cycle,
            self.banks.len(),
            self.central_bank.insolvency_counter(),
            self.central_bank.contagion_insolvency_counter(),
        );
        report.total_interbank_debt = self.cycle_interbank_debt;
        report.total_real_sector_loans = self.cycle_real_sector_loans;
        report.central_bank_min_car = self.central_bank.minimum_capital_ratio();
        report
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    fn reset_cycle(&mut self) {
        self.cycle_interbank_debt = 0.0;
        self.cycle_real_sector_loans = 0.0;
        for kind in AgentKind::ORDER {
            match kind {
                AgentKind::Depositors => self
                    .banks
                    .iter_mut()
                    .flat_map(|bank| bank.depositors_mut().iter_mut())
                    .for_each(|depositor| depositor.reset_cycle()),
                AgentKind::Banks => self.banks.iter_mut().for_each(|bank| bank.reset_cycle()),
                AgentKind::ClearingHouse => self.clearing_house.reset_cycle(),
                AgentKind::CentralBank => self.central_bank.reset_cycle(),
                AgentKind::CorporateClients => self
                    .banks
                    .iter_mut()
                    .flat_map(|bank| bank.corporate_clients_mut().iter_mut())
                    .for_each(|client| client.reset_cycle()),
            }
        }
    }

    fn run_period(&mut self, period: Period) -> Result<(), SimulationError> {
        self.clock.enter(period);
        debug!(cycle = self.clock.current_cycle(), ?period, "period started");

        for kind in AgentKind::ORDER {
            self.step(kind, period);
        }
        if period == Period::Setup {
            self.banks.iter_mut().for_each(|bank| bank.snapshot_balance_sheet());
        }
        self.check_finite()
    }

    fn step(&mut self, kind: AgentKind, period: Period) {
        match (period, kind) {
            (Period::Setup, AgentKind::Depositors) => self.depositors_setup(),
            (Period::Setup, AgentKind::Banks) => self.banks_setup(),
            (Period::Setup, AgentKind::CentralBank) => self.central_bank_setup(),
            (Period::Shock, AgentKind::Depositors) => self.depositors_shock(),
            (Period::Shock, AgentKind::Banks) => self.banks_shock(),
            (Period::Shock, AgentKind::ClearingHouse) => self.clearing_house_shock(),
            (Period::Shock, AgentKind::CentralBank) => self.central_bank_shock(),
            (Period::Settle, AgentKind::Banks) => self.banks_settle(),
            (Period::Settle, AgentKind::ClearingHouse) => self.clearing_house_settle(),
            (Period::Settle, AgentKind::CentralBank) => self.central_bank_settle(),
            // corporate clients act only through their bank's loan collection
            _ => {}
        }
    }

    fn check_finite(&self) -> Result<(), SimulationError> {
        for (position, bank) in self.banks.iter().enumerate() {
            if let Some(account) = bank.balance_sheet().first_non_finite() {
                return Err(SimulationError::NonFiniteState {
                    cycle: self.clock.current_cycle(),
                    bank: position,
                    account,
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Period 0: Setup
    // ========================================================================

    fn depositors_setup(&mut self) {
        for bank in &mut self.banks {
            for depositor in bank.depositors_mut() {
                depositor.choose_strategy(&mut self.rng);
            }
        }
    }

    fn banks_setup(&mut self) {
        let cycle = self.clock.current_cycle();
        for bank in &mut self.banks {
            if bank.choose_strategy(&mut self.rng).is_some() {
                if let Some(option_index) = bank.strategy().and_then(|pool| pool.chosen_index()) {
                    self.event_log.log(Event::StrategyChosen {
                        cycle,
                        bank: Some(bank.index()),
                        option_index,
                    });
                }
            }
            bank.rebuild_balance_sheet();
        }
    }

    fn central_bank_setup(&mut self) {
        let cycle = self.clock.current_cycle();
        if let Some(minimum) = self.central_bank.choose_policy(&mut self.rng) {
            debug!(cycle, minimum, "central bank policy chosen");
            if let Some(option_index) = self.central_bank.strategy().and_then(|p| p.chosen_index()) {
                self.event_log.log(Event::StrategyChosen {
                    cycle,
                    bank: None,
                    option_index,
                });
            }
        }
        if self.config.is_capital_requirement_active {
            let adjusted = self
                .central_bank
                .observe_banks_capital_adequacy(&mut self.banks, &self.rules);
            for (bank, factor) in adjusted {
                debug!(cycle, bank, factor, "loan book shrunk to meet capital minimum");
            }
        }
    }

    // ========================================================================
    // Period 1: Shock
    // ========================================================================

    fn depositors_shock(&mut self) {
        if !self.config.are_bank_runs_possible {
            return;
        }
        let params = ShockParams {
            amount_withdrawn: self.config.amount_withdrawn,
            probability_of_withdrawal: self.config.probability_of_withdrawal,
        };
        for bank in &mut self.banks {
            let shock = bank.apply_liquidity_shock(params, &self.rules, &mut self.rng);
            debug!(
                bank = bank.index(),
                withdrawn = shock.amount_withdrawn,
                withdrawals = shock.withdrawals,
                "liquidity shock"
            );
        }
    }

    fn banks_shock(&mut self) {
        self.banks
            .iter_mut()
            .for_each(|bank| bank.use_liquid_assets_to_pay_depositors_back());
    }

    fn clearing_house_shock(&mut self) {
        let cycle = self.clock.current_cycle();
        if self.config.interbank_lending_market_available {
            let trades = self
                .clearing_house
                .organize_interbank_market(&mut self.banks, &mut self.rng);
            for trade in trades {
                self.event_log.log(Event::InterbankLoan {
                    cycle,
                    lender: trade.lender,
                    borrower: trade.borrower,
                    amount: trade.amount,
                });
            }

            let pledges = self.clearing_house.interbank_clearing_guarantee(&mut self.banks);
            for pledge in pledges {
                self.event_log.log(Event::CollateralPledged {
                    cycle,
                    bank: pledge.bank,
                    collateral: pledge.collateral,
                    residual: pledge.residual,
                });
            }
        }
        self.cycle_interbank_debt = total_and_biggest_interbank_debt(&self.banks).total_interbank_debt;
    }

    fn central_bank_shock(&mut self) {
        let cycle = self.clock.current_cycle();
        let loans = self
            .central_bank
            .organize_discount_window_lending(&mut self.banks, &mut self.rng);
        for (bank, amount) in loans {
            self.event_log.log(Event::DiscountWindowLoan { cycle, bank, amount });
        }

        if self.config.banks_may_sell_non_liquid_assets_at_discount_prices {
            let sales = CentralBank::make_banks_sell_non_liquid_assets(
                &mut self.banks,
                self.config.illiquid_asset_discount_rate,
            );
            for (bank, amount_sold) in sales {
                self.event_log.log(Event::FireSale {
                    cycle,
                    bank,
                    amount_sold,
                });
            }
        }
    }

    // ========================================================================
    // Period 2: Settle
    // ========================================================================

    fn banks_settle(&mut self) {
        let central_bank_rate = self.central_bank.lending_interest_rate();
        for bank in &mut self.banks {
            bank.accrue_interest(
                central_bank_rate,
                self.config.liquid_assets_interest_rate,
                self.config.deposit_interest_rate,
            );
            bank.collect_loans(&mut self.rng);
        }
    }

    fn clearing_house_settle(&mut self) {
        self.clearing_house
            .accrue_interest(&mut self.banks, self.config.interbank_interest_rate);
    }

    fn central_bank_settle(&mut self) {
        let cycle = self.clock.current_cycle();
        let discount_rate = self.config.illiquid_asset_discount_rate;

        // STEP 1: bailout and punishment
        for bank in &mut self.banks {
            if self.central_bank.is_too_big_to_fail(bank, &mut self.rng) {
                let injected = CentralBank::bailout(bank);
                if injected != Bailout::default() {
                    self.event_log.log(Event::Bailout {
                        cycle,
                        bank: bank.index(),
                        liquidity: injected.liquidity,
                        capital: injected.capital,
                    });
                }
            }
            if !bank.is_liquid() {
                let amount_sold = CentralBank::punish_illiquidity(bank, discount_rate);
                if amount_sold > 0.0 {
                    self.event_log.log(Event::FireSale {
                        cycle,
                        bank: bank.index(),
                        amount_sold,
                    });
                }
            }
            if !bank.is_solvent() {
                self.central_bank.punish_insolvency(bank);
                let capital = bank.balance_sheet().capital();
                warn!(cycle, bank = bank.index(), capital, "bank insolvent");
                self.event_log.log(Event::Insolvency {
                    cycle,
                    bank: bank.index(),
                    capital,
                });
            }
        }

        // STEP 2: contagion
        if self.config.interbank_lending_market_available {
            let outcome = self
                .clearing_house
                .interbank_contagion(&mut self.banks, &mut self.central_bank);
            for &position in &outcome.newly_insolvent {
                let interbank_position = self.banks[position].balance_sheet().interbank_loan;
                warn!(cycle, bank = position, interbank_position, "contagion insolvency");
                self.event_log.log(Event::ContagionInsolvency {
                    cycle,
                    bank: position,
                    interbank_position,
                });
            }
            if outcome.claims_written_off > 0.0 {
                debug!(cycle, written_off = outcome.claims_written_off, "interbank claims haircut");
            }
        }

        // STEP 3: learning signals
        let params = ProfitParams {
            minimum_capital_ratio: self.central_bank.minimum_capital_ratio(),
            capital_requirement_active: self.config.is_capital_requirement_active,
            limited_liability: self.config.banks_have_limited_liability,
            ewa_damping_factor: self.config.ewa_damping_factor,
        };
        for bank in &mut self.banks {
            bank.calculate_profit(params, &self.rules);
        }
        self.cycle_real_sector_loans = CentralBank::total_real_sector_loans(&self.banks);
        let utility = self.central_bank.calculate_final_utility(&self.banks);
        debug!(cycle, utility, "central bank utility");

        // STEP 4: resolution
        for (bank, outcome) in CentralBank::liquidate_insolvent_banks(&mut self.banks) {
            self.event_log.log(Event::Liquidation {
                cycle,
                bank,
                available: outcome.available,
                payout_ratio: outcome.payout_ratio,
            });
        }

        // STEP 5: depositor utilities
        let insurance = self.config.is_deposit_insurance_available;
        let deposit_rate = self.config.deposit_interest_rate;
        for bank in &mut self.banks {
            for depositor in bank.depositors_mut() {
                depositor.settle_final_utility(insurance, deposit_rate);
            }
        }
    }
}
