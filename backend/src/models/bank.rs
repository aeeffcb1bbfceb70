//! Bank model
//!
//! A bank owns its balance sheet, its depositors and its corporate
//! clients. It rebuilds its balance sheet every cycle from the chosen (or
//! fixed) strategy, absorbs the depositors' liquidity shock, and is
//! resolved through the liquidation waterfall if it ends the cycle
//! insolvent.
//!
//! Interbank positions are written only by the clearing house; the bank
//! exposes crate-private setters for that purpose.

use crate::core::identity::AgentId;
use crate::orchestrator::config::CapitalRules;
use crate::rng::RngManager;
use crate::strategy::{BankStrategy, StrategyPool, BANK_ATTRACTION_DECAY};
use serde::{Deserialize, Serialize};

use super::balance_sheet::BalanceSheet;
use super::corporate_client::CorporateClient;
use super::depositor::{Depositor, ShockParams};
use super::CycleAgent;

/// Share of the loan-book drop lost when a bank run occurred
const BANK_RUN_LOAN_LOSS: f64 = 0.02;

/// Per-cycle interbank matching scratch state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InterbankScratch {
    /// Ledger index of the last counterparty matched with
    pub counterparty: Option<usize>,
    /// Position in this bank's matching queue
    pub priority_order: usize,
    /// Signed amount still to lend (positive) or borrow (negative)
    pub amount_left: f64,
}

/// Per-cycle collateral guarantee scratch state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeScratch {
    pub potential_collateral: f64,
    pub feasible_collateral: f64,
    pub outstanding_amount_impact: f64,
    pub residual: f64,
    pub redistributed_collateral: f64,
    pub collateral_adjustment: f64,
}

/// Inputs to a bank's end-of-cycle profit computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitParams {
    pub minimum_capital_ratio: f64,
    pub capital_requirement_active: bool,
    pub limited_liability: bool,
    pub ewa_damping_factor: f64,
}

/// Result of resolving an insolvent bank
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    /// Liquid assets available once loans and interbank claims were sold
    pub available: f64,
    pub paid_discount_window: f64,
    pub paid_interbank: f64,
    pub paid_depositors: f64,
    /// Fraction of each deposit honored
    pub payout_ratio: f64,
}

/// Aggregate effect of one liquidity shock on a bank
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShockSummary {
    pub amount_withdrawn: f64,
    pub withdrawals: usize,
}

/// A balance-sheet-bearing bank
///
/// # Example
/// ```
/// use banksim_core::{Bank, BankStrategy, IdentityIssuer};
///
/// let mut ids = IdentityIssuer::new();
/// let mut bank = Bank::new(ids.issue(), 0, 1.0, BankStrategy::new(0.08, 0.10), false);
/// bank.rebuild_balance_sheet();
///
/// let sheet = bank.balance_sheet();
/// assert!((sheet.liquid_assets - 0.10).abs() < 1e-12);
/// assert!((sheet.capital() + 0.08).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    id: AgentId,
    /// Dense index into the interbank ledger
    index: usize,
    initial_size: f64,
    market_share: f64,
    balance_sheet: BalanceSheet,
    /// Snapshot taken at the end of period 0
    aux_balance_sheet: BalanceSheet,
    /// Positive: surplus to lend. Non-positive: deficit to fund.
    liquidity_needs: f64,
    withdrawals_counter: usize,
    bank_run_occurred: bool,
    interbank: InterbankScratch,
    guarantee: GuaranteeScratch,
    depositors: Vec<Depositor>,
    corporate_clients: Vec<CorporateClient>,
    fixed_strategy: BankStrategy,
    strategy: Option<StrategyPool<BankStrategy>>,
    last_profit: f64,
}

impl Bank {
    pub fn new(
        id: AgentId,
        index: usize,
        initial_size: f64,
        fixed_strategy: BankStrategy,
        is_learning: bool,
    ) -> Self {
        Self {
            id,
            index,
            initial_size,
            market_share: 0.0,
            balance_sheet: BalanceSheet::default(),
            aux_balance_sheet: BalanceSheet::default(),
            liquidity_needs: 0.0,
            withdrawals_counter: 0,
            bank_run_occurred: false,
            interbank: InterbankScratch::default(),
            guarantee: GuaranteeScratch::default(),
            depositors: Vec::new(),
            corporate_clients: Vec::new(),
            fixed_strategy,
            strategy: is_learning.then(|| StrategyPool::new(BANK_ATTRACTION_DECAY)),
            last_profit: 0.0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn initial_size(&self) -> f64 {
        self.initial_size
    }

    pub fn market_share(&self) -> f64 {
        self.market_share
    }

    /// Set normalized size and market share (construction time)
    pub fn set_size(&mut self, initial_size: f64, market_share: f64) {
        self.initial_size = initial_size;
        self.market_share = market_share;
    }

    pub fn balance_sheet(&self) -> &BalanceSheet {
        &self.balance_sheet
    }

    pub(crate) fn sheet_mut(&mut self) -> &mut BalanceSheet {
        &mut self.balance_sheet
    }

    /// Direct balance-sheet access for building test fixtures
    #[cfg(any(test, feature = "test-support"))]
    pub fn balance_sheet_mut(&mut self) -> &mut BalanceSheet {
        &mut self.balance_sheet
    }

    pub fn aux_balance_sheet(&self) -> &BalanceSheet {
        &self.aux_balance_sheet
    }

    pub fn liquidity_needs(&self) -> f64 {
        self.liquidity_needs
    }

    pub fn set_liquidity_needs(&mut self, needs: f64) {
        self.liquidity_needs = needs;
    }

    pub fn withdrawals_counter(&self) -> usize {
        self.withdrawals_counter
    }

    pub fn bank_run_occurred(&self) -> bool {
        self.bank_run_occurred
    }

    pub fn interbank(&self) -> &InterbankScratch {
        &self.interbank
    }

    pub(crate) fn interbank_mut(&mut self) -> &mut InterbankScratch {
        &mut self.interbank
    }

    pub fn guarantee(&self) -> &GuaranteeScratch {
        &self.guarantee
    }

    pub(crate) fn guarantee_mut(&mut self) -> &mut GuaranteeScratch {
        &mut self.guarantee
    }

    pub(crate) fn reset_collateral(&mut self) {
        self.guarantee = GuaranteeScratch::default();
    }

    /// Net interbank position, as read from the clearing-house ledger
    pub(crate) fn set_interbank_position(&mut self, position: f64) {
        self.balance_sheet.interbank_loan = position;
    }

    pub fn depositors(&self) -> &[Depositor] {
        &self.depositors
    }

    pub fn depositors_mut(&mut self) -> &mut [Depositor] {
        &mut self.depositors
    }

    pub fn corporate_clients(&self) -> &[CorporateClient] {
        &self.corporate_clients
    }

    pub fn corporate_clients_mut(&mut self) -> &mut [CorporateClient] {
        &mut self.corporate_clients
    }

    pub fn add_depositor(&mut self, depositor: Depositor) {
        self.depositors.push(depositor);
    }

    pub fn add_corporate_client(&mut self, client: CorporateClient) {
        self.corporate_clients.push(client);
    }

    pub fn is_learning(&self) -> bool {
        self.strategy.is_some()
    }

    pub fn strategy(&self) -> Option<&StrategyPool<BankStrategy>> {
        self.strategy.as_ref()
    }

    /// Strategy in force this cycle: the chosen option, else the fixed one
    pub fn current_strategy(&self) -> BankStrategy {
        self.strategy
            .as_ref()
            .and_then(|pool| pool.chosen().copied())
            .unwrap_or(self.fixed_strategy)
    }

    /// Last realized profit (change in net worth, after penalties)
    pub fn last_profit(&self) -> f64 {
        self.last_profit
    }

    pub fn is_solvent(&self) -> bool {
        self.balance_sheet.is_solvent()
    }

    pub fn is_insolvent(&self) -> bool {
        self.balance_sheet.is_insolvent()
    }

    pub fn offers_liquidity(&self) -> bool {
        self.liquidity_needs > 0.0
    }

    pub fn needs_liquidity(&self) -> bool {
        self.liquidity_needs <= 0.0
    }

    pub fn is_liquid(&self) -> bool {
        self.liquidity_needs >= 0.0
    }

    // ========================================================================
    // Period 0: strategy and balance-sheet rebuild
    // ========================================================================

    /// Learning step: update the menu and pick this cycle's strategy
    pub fn choose_strategy(&mut self, rng: &mut RngManager) -> Option<BankStrategy> {
        let pool = self.strategy.as_mut()?;
        pool.update_probabilities();
        Some(*pool.select(rng))
    }

    /// Rebuild the balance sheet from the strategy in force
    ///
    /// Liquid assets take the liquidity ratio of the bank's size, loans the
    /// rest; deposits fund everything but the capital ratio.
    pub fn rebuild_balance_sheet(&mut self) {
        let strategy = self.current_strategy();
        let size = self.initial_size;
        let liquid_assets = size * strategy.liquidity_ratio;
        self.balance_sheet = BalanceSheet {
            liquid_assets,
            non_financial_sector_loan: size - liquid_assets,
            interbank_loan: 0.0,
            discount_window_loan: 0.0,
            deposits: size * (strategy.capital_ratio - 1.0),
        };
        self.liquidity_needs = 0.0;
        self.distribute_to_clients();
    }

    /// Split loans and deposits equally across clients and depositors
    pub fn distribute_to_clients(&mut self) {
        if !self.corporate_clients.is_empty() {
            let per_client =
                self.balance_sheet.non_financial_sector_loan / self.corporate_clients.len() as f64;
            for client in &mut self.corporate_clients {
                client.set_loan_amount(per_client);
            }
        }
        if !self.depositors.is_empty() {
            let per_depositor = -self.balance_sheet.deposits / self.depositors.len() as f64;
            for depositor in &mut self.depositors {
                depositor.make_deposit(per_depositor);
            }
        }
    }

    pub fn snapshot_balance_sheet(&mut self) {
        self.aux_balance_sheet = self.balance_sheet;
    }

    // ========================================================================
    // Capital adequacy
    // ========================================================================

    /// Risk-weighted corporate loan book
    ///
    /// In the non-standard regime the first client's class decides the
    /// weight and only that client's loan is counted. The other clients
    /// carry no risk weight.
    pub fn real_sector_risk_weighted_assets(&self, rules: &CapitalRules) -> f64 {
        if rules.standard_clients {
            return self.balance_sheet.non_financial_sector_loan * rules.corporate_weight;
        }
        match self.corporate_clients.first() {
            None => 0.0,
            Some(client) => {
                let weight = if client.default_rate() == rules.retail_default_rate {
                    rules.retail_weight
                } else if client.default_rate() == rules.wholesale_default_rate {
                    rules.wholesale_weight
                } else {
                    rules.corporate_weight
                };
                client.loan_amount() * weight
            }
        }
    }

    pub fn total_risk_weighted_assets(&self, rules: &CapitalRules) -> f64 {
        let mut total = self.balance_sheet.liquid_assets * rules.cash_weight
            + self.real_sector_risk_weighted_assets(rules);
        if self.balance_sheet.is_interbank_creditor() {
            total += self.balance_sheet.interbank_loan * rules.interbank_weight;
        }
        total
    }

    /// `-capital / risk-weighted assets`; 0 when insolvent or unweighted
    pub fn capital_adequacy_ratio(&self, rules: &CapitalRules) -> f64 {
        if !self.is_solvent() {
            return 0.0;
        }
        let rwa = self.total_risk_weighted_assets(rules);
        if rwa == 0.0 {
            return 0.0;
        }
        -self.balance_sheet.capital() / rwa
    }

    /// Shrink the loan book until the ratio requirement could be met
    ///
    /// Every client loan is scaled by `current / required`; the freed amount
    /// moves to liquid assets. Returns the factor applied, if any.
    pub fn adjust_capital_ratio(&mut self, minimum_required: f64, rules: &CapitalRules) -> Option<f64> {
        if minimum_required <= 0.0 {
            return None;
        }
        let current = self.capital_adequacy_ratio(rules);
        if current > minimum_required {
            return None;
        }
        let factor = (current / minimum_required).clamp(0.0, 1.0);
        for client in &mut self.corporate_clients {
            let original = client.loan_amount();
            client.scale_loan(factor);
            self.balance_sheet.liquid_assets += original - client.loan_amount();
        }
        self.update_non_financial_sector_loans();
        Some(factor)
    }

    pub fn update_non_financial_sector_loans(&mut self) {
        self.balance_sheet.non_financial_sector_loan =
            self.corporate_clients.iter().map(|c| c.loan_amount()).sum();
    }

    // ========================================================================
    // Period 1: liquidity shock and funding
    // ========================================================================

    /// Let every depositor draw its early-withdrawal shock
    pub fn apply_liquidity_shock(
        &mut self,
        params: ShockParams,
        rules: &CapitalRules,
        rng: &mut RngManager,
    ) -> ShockSummary {
        let car = self.capital_adequacy_ratio(rules);
        let mut summary = ShockSummary::default();
        let mut amounts = Vec::with_capacity(self.depositors.len());
        for depositor in &mut self.depositors {
            let shock = depositor.draw_shock(car, params, rng);
            amounts.push(depositor.withdraw(shock));
        }
        for amount in amounts {
            let taken = self.withdraw_deposit(amount);
            summary.amount_withdrawn += taken;
            if taken > 0.0 {
                summary.withdrawals += 1;
            }
        }
        summary
    }

    /// Register a depositor's early withdrawal against liquidity
    pub fn withdraw_deposit(&mut self, amount: f64) -> f64 {
        if amount > 0.0 {
            self.withdrawals_counter += 1;
        }
        self.liquidity_needs -= amount;
        amount
    }

    /// Pay withdrawals out of liquid assets first
    ///
    /// Afterwards a positive `liquidity_needs` is surplus to lend.
    pub fn use_liquid_assets_to_pay_depositors_back(&mut self) {
        if !self.needs_liquidity() {
            return;
        }
        let original = self.balance_sheet.liquid_assets;
        self.liquidity_needs += original;
        self.balance_sheet.liquid_assets = self.liquidity_needs.max(0.0);
        let total_paid = original - self.balance_sheet.liquid_assets;
        self.balance_sheet.deposits += total_paid;
    }

    /// Book a discount-window loan (`amount` is non-positive)
    pub fn receive_discount_window_loan(&mut self, amount: f64) {
        self.balance_sheet.discount_window_loan = amount;
        self.balance_sheet.deposits -= amount;
        self.liquidity_needs -= amount;
    }

    /// Fire-sell loans at a discount to cover the remaining deficit
    ///
    /// Returns the book value of loans sold.
    pub fn use_non_liquid_assets_to_pay_depositors_back(&mut self, discount_rate: f64) -> f64 {
        if !self.needs_liquidity() {
            return 0.0;
        }
        let liquidity_needed = -self.liquidity_needs;
        let price = 1.0 + discount_rate;
        let total_loans_to_sell = liquidity_needed * price;
        let loan_book = self.balance_sheet.non_financial_sector_loan;

        let amount_sold = if loan_book > total_loans_to_sell {
            self.liquidity_needs = 0.0;
            self.balance_sheet.deposits += liquidity_needed;
            total_loans_to_sell
        } else {
            let raised = loan_book / price;
            self.liquidity_needs += raised;
            self.balance_sheet.deposits += raised;
            loan_book
        };

        let proportion_sold = if loan_book > 0.0 {
            amount_sold / loan_book
        } else {
            0.0
        };
        for client in &mut self.corporate_clients {
            client.scale_loan(1.0 - proportion_sold);
        }
        self.balance_sheet.non_financial_sector_loan -= amount_sold;
        amount_sold
    }

    // ========================================================================
    // Period 2: interest, collection, profit, liquidation
    // ========================================================================

    /// Accrue discount-window, liquid-asset and deposit interest
    pub fn accrue_interest(&mut self, central_bank_rate: f64, liquid_rate: f64, deposit_rate: f64) {
        self.balance_sheet.discount_window_loan *= 1.0 + central_bank_rate;
        self.balance_sheet.liquid_assets *= 1.0 + liquid_rate;
        let factor = 1.0 + deposit_rate;
        self.balance_sheet.deposits *= factor;
        for depositor in &mut self.depositors {
            depositor.accrue_interest(factor);
        }
    }

    /// Collect every client loan; the loan account becomes the amount repaid
    pub fn collect_loans(&mut self, rng: &mut RngManager) {
        self.balance_sheet.non_financial_sector_loan = self
            .corporate_clients
            .iter_mut()
            .map(|client| client.repay(rng))
            .sum();
    }

    /// Change in net worth since the period-0 snapshot
    pub fn profit(&self, limited_liability: bool) -> f64 {
        let mut resulting = self.balance_sheet.net_worth();
        let original = self.aux_balance_sheet.net_worth();
        if limited_liability {
            resulting = resulting.max(0.0);
        }
        resulting - original
    }

    /// Realize this cycle's profit and feed the strategy pool
    ///
    /// A bank run costs learning banks 2% of the loan book they lost; the
    /// loan book of a zero-intelligence bank is left as it is.
    /// Returns the damped return on initial equity that was recorded.
    pub fn calculate_profit(&mut self, params: ProfitParams, rules: &CapitalRules) -> f64 {
        self.bank_run_occurred = self.withdrawals_counter as f64 > self.depositors.len() as f64 / 2.0;
        if self.bank_run_occurred && self.is_learning() {
            let delta = self.aux_balance_sheet.non_financial_sector_loan
                - self.balance_sheet.non_financial_sector_loan;
            if delta > 0.0 {
                self.balance_sheet.non_financial_sector_loan -= delta * BANK_RUN_LOAN_LOSS;
            }
        }

        let mut profit = self.profit(params.limited_liability);
        if params.capital_requirement_active {
            let current = self.capital_adequacy_ratio(rules);
            if current < params.minimum_capital_ratio {
                profit -= params.minimum_capital_ratio - current;
            }
        }
        self.last_profit = profit;

        let initial_capital = self.aux_balance_sheet.capital();
        let return_on_equity = if initial_capital == 0.0 {
            0.0
        } else {
            -profit / initial_capital
        };
        let damped = return_on_equity * params.ewa_damping_factor;
        if let Some(pool) = &mut self.strategy {
            pool.record_profit(damped);
        }
        damped
    }

    /// Resolve an insolvent bank
    ///
    /// Loans and interbank claims are converted to cash. Liabilities are then
    /// paid in seniority order: discount window, interbank, deposits. A tier
    /// that cannot be paid in full absorbs the shortfall and resolution stops.
    /// Depositors share whatever is left pro rata.
    pub fn liquidate(&mut self) -> LiquidationOutcome {
        let sheet = &mut self.balance_sheet;
        sheet.liquid_assets += sheet.non_financial_sector_loan;
        sheet.non_financial_sector_loan = 0.0;
        if sheet.is_interbank_creditor() {
            sheet.liquid_assets += sheet.interbank_loan;
            sheet.interbank_loan = 0.0;
        }

        let mut outcome = LiquidationOutcome {
            available: sheet.liquid_assets,
            ..Default::default()
        };

        let owed = -sheet.discount_window_loan;
        if sheet.liquid_assets >= owed {
            sheet.liquid_assets -= owed;
            sheet.discount_window_loan = 0.0;
            outcome.paid_discount_window = owed;
        } else {
            outcome.paid_discount_window = sheet.liquid_assets;
            sheet.discount_window_loan += sheet.liquid_assets;
            sheet.liquid_assets = 0.0;
        }

        if sheet.is_interbank_debtor() {
            let owed = -sheet.interbank_loan;
            if sheet.liquid_assets >= owed {
                sheet.liquid_assets -= owed;
                sheet.interbank_loan = 0.0;
                outcome.paid_interbank = owed;
            } else {
                outcome.paid_interbank = sheet.liquid_assets;
                sheet.interbank_loan += sheet.liquid_assets;
                sheet.liquid_assets = 0.0;
            }
        }

        let deposits_owed = sheet.deposits.abs();
        let payout_ratio = if deposits_owed == 0.0 {
            1.0
        } else {
            (sheet.liquid_assets / deposits_owed).min(1.0)
        };
        sheet.deposits *= payout_ratio;
        sheet.liquid_assets = 0.0;
        outcome.paid_depositors = deposits_owed * payout_ratio;
        outcome.payout_ratio = payout_ratio;

        for depositor in &mut self.depositors {
            depositor.scale_deposit(payout_ratio);
        }
        for client in &mut self.corporate_clients {
            client.set_loan_amount(0.0);
        }
        outcome
    }
}

impl CycleAgent for Bank {
    fn reset_cycle(&mut self) {
        self.liquidity_needs = 0.0;
        self.bank_run_occurred = false;
        self.withdrawals_counter = 0;
        self.interbank = InterbankScratch::default();
        self.guarantee = GuaranteeScratch::default();
    }
}
