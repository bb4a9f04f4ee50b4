use std::fs;

use dialect_drift::scenario::ScenarioLoader;

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn baseline_scenario_matches_reference_parameters() {
    let scenario = scenario_loader()
        .load("scenarios/baseline.yaml")
        .unwrap();
    assert_eq!(scenario.name, "baseline");
    assert_eq!(scenario.seed, None);
    assert_eq!(scenario.years(None), 20);
    assert_eq!(scenario.months(Some(2)), 24);
    assert_eq!(scenario.logging.level, "info");
    assert_eq!(scenario.params.number_locals, 1000);
    assert_eq!(scenario.params.annual_br_inflow, 120);
    assert_eq!(scenario.params.phonetic_influence_rate, 0.15);
}

#[test]
fn seeded_scenario_runs_reproducibly() {
    let scenario = scenario_loader()
        .load("scenarios/small_town.yaml")
        .unwrap();
    assert_eq!(scenario.seed, Some(7));

    let run = || {
        let mut model = scenario.build_model(None).unwrap();
        model.setup().unwrap();
        model.run(scenario.months(None)).unwrap();
        model.results().clone()
    };
    let first = run();
    assert_eq!(first.len(), 24);
    assert_eq!(first, run());
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("minimal.yaml"),
        "name: minimal\nparams:\n  number_locals: 10\n  simulation_years: 5\n",
    )
    .unwrap();

    let scenario = ScenarioLoader::new(dir.path()).load("minimal.yaml").unwrap();
    assert_eq!(scenario.years, 20);
    assert_eq!(scenario.logging.level, "info");
    assert_eq!(scenario.params.number_locals, 10);
    assert_eq!(scenario.params.number_migrants, 100);
    assert_eq!(scenario.params.reveal_share_migrants, 0.7);
}

#[test]
fn non_numeric_parameter_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("broken.yaml"),
        "name: broken\nparams:\n  local_birth_rate: lots\n",
    )
    .unwrap();

    let err = ScenarioLoader::new(dir.path())
        .load("broken.yaml")
        .unwrap_err();
    assert!(format!("{err:#}").contains("broken.yaml"));
}

#[test]
fn out_of_range_parameter_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("invalid.yaml"),
        "name: invalid\nparams:\n  reveal_share_locals: 2.0\n",
    )
    .unwrap();

    let err = ScenarioLoader::new(dir.path())
        .load("invalid.yaml")
        .unwrap_err();
    assert!(format!("{err:#}").contains("reveal_share_locals"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ScenarioLoader::new(dir.path()).load("absent.yaml").is_err());
}
