use super::*;

fn config(trials: u64) -> SimulationConfig {
    SimulationConfig {
        trials,
        seed: 99,
        threads: Some(2),
        ..Default::default()
    }
}

#[test]
fn test_trial_bounds() {
    assert!(matches!(
        config(0).validate(),
        Err(RunError::TrialCount(0))
    ));
    assert!(matches!(
        config(MAX_TRIALS + 1).validate(),
        Err(RunError::TrialCount(_))
    ));
    assert!(config(1).validate().is_ok());
    assert!(config(MAX_TRIALS).validate().is_ok());
}

#[test]
fn test_run_produces_full_report() {
    let runner = SimulationRunner::new(config(250));
    let report = runner.run(&Roster::standard()).unwrap();
    assert_eq!(report.seed(), 99);
    assert_eq!(report.distribution().trials(), 250);
    assert!(!report.distribution().interrupted());
}

#[test]
fn test_thread_count_does_not_change_report() {
    let roster = Roster::champions();
    let single = SimulationRunner::new(SimulationConfig {
        threads: Some(1),
        ..config(300)
    })
    .run(&roster)
    .unwrap();
    let several = SimulationRunner::new(SimulationConfig {
        threads: Some(4),
        ..config(300)
    })
    .run(&roster)
    .unwrap();
    assert_eq!(single.distribution(), several.distribution());
}

#[test]
fn test_invalid_roster_is_rejected() {
    let mut roster = Roster::standard();
    roster.teams.truncate(10);
    let err = SimulationRunner::new(config(10)).run(&roster).unwrap_err();
    assert!(matches!(
        err,
        RunError::Simulation(SwissError::RosterSize { .. })
    ));
}

#[test]
fn test_zero_time_limit_stops_run() {
    let runner = SimulationRunner::new(SimulationConfig {
        time_limit: Some(Duration::ZERO),
        ..config(1_000)
    });
    let report = runner.run(&Roster::standard()).unwrap();
    assert_eq!(report.distribution().trials(), 0);
    assert!(report.distribution().interrupted());
}

#[test]
fn test_replayed_trial_is_counted_in_run() {
    let roster = Roster::champions();
    let runner = SimulationRunner::new(config(1));
    let report = runner.run(&roster).unwrap();
    let outcome = runner.replay_trial(&roster, 0).unwrap();
    for (team, &record) in outcome.records.iter().enumerate() {
        assert_eq!(report.distribution().count(team, record), 1);
    }
}
