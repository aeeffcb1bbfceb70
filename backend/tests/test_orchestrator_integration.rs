//! Integration tests for the cycle engine
//!
//! Whole runs across presets, checking the invariants that must hold at
//! every cycle boundary and the event trail of scripted shocks.

use banksim_core::{Event, ModelConfig, Orchestrator, ScenarioPreset, SimulationError};

fn small(preset: ScenarioPreset) -> ModelConfig {
    let overrides = serde_json::json!({
        "numberBanks": 6,
        "numberDepositorsPerBank": 20,
        "numberCorporateClientsPerBank": 10,
    });
    ModelConfig::with_overrides(preset, &overrides).unwrap()
}

fn assert_cycle_invariants(orchestrator: &Orchestrator) {
    let house = orchestrator.clearing_house();
    assert!(house.ledger().is_antisymmetric(1e-9));
    assert!(house.ledger().total().abs() < 1e-9);
    for bank in orchestrator.banks() {
        let sheet = bank.balance_sheet();
        assert!(sheet.identity_holds(1e-9));
        assert!(sheet.first_non_finite().is_none());
    }
    assert!(house.recovery().iter().all(|r| (0.0..=1.0).contains(r)));
}

#[test]
fn test_every_preset_runs() {
    for preset in ScenarioPreset::ALL {
        let mut orchestrator = Orchestrator::new(small(preset)).unwrap();
        for _ in 0..5 {
            let report = orchestrator.advance_cycle().unwrap();
            assert!(report.insolvencies <= 6, "preset {}", preset);
            assert!(report.contagion_insolvencies <= report.insolvencies);
            assert!((0.0..=1.0).contains(&report.insolvency_rate));
            assert!(report.total_interbank_debt >= 0.0);
            assert_cycle_invariants(&orchestrator);
        }
        assert_eq!(orchestrator.summary().cycles_run, 5);
    }
}

#[test]
fn test_summary_aggregates_reports() {
    let mut orchestrator = Orchestrator::new(small(ScenarioPreset::HighSpread)).unwrap();
    let summary = orchestrator.run(10).unwrap();

    let insolvencies: usize = summary.cycles.iter().map(|r| r.insolvencies).sum();
    assert_eq!(summary.total_insolvencies(), insolvencies);
    assert_eq!(summary.seed, orchestrator.config().rng_seed);
    assert_eq!(summary.config_fingerprint, orchestrator.config().fingerprint());
    assert!((0.0..=1.0).contains(&summary.mean_insolvency_rate()));
    assert_eq!(
        orchestrator.event_log().events_of_type("Insolvency").len()
            + summary.total_contagion_insolvencies(),
        insolvencies
    );
}

#[test]
fn test_learning_banks_choose_every_cycle() {
    let mut orchestrator = Orchestrator::new(small(ScenarioPreset::HighSpread)).unwrap();
    orchestrator.run(3).unwrap();

    for cycle in 1..=3 {
        let chosen = orchestrator
            .event_log()
            .events_at_cycle(cycle)
            .into_iter()
            .filter(|e| matches!(e, Event::StrategyChosen { bank: Some(_), .. }))
            .count();
        assert_eq!(chosen, 6);
    }
    assert!(orchestrator
        .banks()
        .iter()
        .all(|bank| bank.strategy().and_then(|p| p.chosen_index()).is_some()));
}

#[test]
fn test_regulator_picks_a_minimum_under_basel() {
    let mut orchestrator = Orchestrator::new(small(ScenarioPreset::Basel)).unwrap();
    let summary = orchestrator.run(4).unwrap();

    for report in &summary.cycles {
        assert!((0.01..=0.10 + 1e-12).contains(&report.central_bank_min_car));
    }
    let regulator_choices = orchestrator
        .event_log()
        .events()
        .iter()
        .filter(|e| matches!(e, Event::StrategyChosen { bank: None, .. }))
        .count();
    assert_eq!(regulator_choices, 4);
}

#[test]
fn test_no_withdrawals_means_no_funding_events() {
    let overrides = serde_json::json!({
        "numberBanks": 5,
        "numberDepositorsPerBank": 10,
        "numberCorporateClientsPerBank": 10,
        "probabilityOfWithdrawal": 0.0,
    });
    let config = ModelConfig::with_overrides(ScenarioPreset::HighSpread, &overrides).unwrap();
    let mut orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.run(5).unwrap();

    let log = orchestrator.event_log();
    assert!(log.events_of_type("InterbankLoan").is_empty());
    assert!(log.events_of_type("DiscountWindowLoan").is_empty());
    assert!(log.events_of_type("FireSale").is_empty());
    assert!(orchestrator.reports().iter().all(|r| r.total_interbank_debt == 0.0));
}

#[test]
fn test_system_wide_run_goes_to_the_discount_window() {
    let overrides = serde_json::json!({
        "numberBanks": 4,
        "numberDepositorsPerBank": 10,
        "numberCorporateClientsPerBank": 10,
        "areBanksZeroIntelligenceAgents": true,
        "probabilityOfWithdrawal": 1.0,
        "amountWithdrawn": 1.0,
    });
    let config = ModelConfig::with_overrides(ScenarioPreset::HighSpread, &overrides).unwrap();
    let mut orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.advance_cycle().unwrap();

    let log = orchestrator.event_log();
    let loans = log.events_of_type("DiscountWindowLoan");
    assert_eq!(loans.len(), 4);
    for event in loans {
        match event {
            Event::DiscountWindowLoan { amount, .. } => assert!((amount + 0.82).abs() < 1e-9),
            other => panic!("unexpected event {:?}", other),
        }
    }
    // every bank is short, so nobody lends
    assert!(log.events_of_type("InterbankLoan").is_empty());
    assert!(log.events_of_type("FireSale").is_empty());
    assert!(orchestrator.banks().iter().all(|b| b.bank_run_occurred()));
}

#[test]
fn test_closed_discount_window_forces_fire_sales() {
    let overrides = serde_json::json!({
        "numberBanks": 4,
        "numberDepositorsPerBank": 10,
        "numberCorporateClientsPerBank": 10,
        "areBanksZeroIntelligenceAgents": true,
        "probabilityOfWithdrawal": 1.0,
        "offersDiscountWindowLending": false,
    });
    let config = ModelConfig::with_overrides(ScenarioPreset::HighSpread, &overrides).unwrap();
    let mut orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.advance_cycle().unwrap();

    let log = orchestrator.event_log();
    assert!(log.events_of_type("DiscountWindowLoan").is_empty());
    assert_eq!(log.events_at_cycle(1).iter().filter(|e| e.event_type() == "FireSale").count(), 4);
}

#[test]
fn test_abort_is_sticky() {
    let mut orchestrator = Orchestrator::new(small(ScenarioPreset::HighSpread)).unwrap();
    orchestrator.run(2).unwrap();
    orchestrator.banks_mut()[0].set_size(f64::NAN, 0.1);

    assert!(matches!(
        orchestrator.run(3),
        Err(SimulationError::NonFiniteState { cycle: 3, bank: 0, .. })
    ));
    assert_eq!(
        orchestrator.advance_cycle(),
        Err(SimulationError::Aborted { cycle: 3 })
    );
    assert_eq!(orchestrator.reports().len(), 2);
}
