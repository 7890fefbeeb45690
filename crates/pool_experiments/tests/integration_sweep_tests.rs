use pool_core::pipeline::BatchStatus;
use pool_core::solver::SolverBackend;
use pool_experiments::runner::run_parallel_experiments_with_progress;
use pool_experiments::{
    export_to_csv, export_to_json, find_best_parameters, find_best_result_index, run_single_experiment,
    summarize, ParameterSpace,
};

fn small_space() -> ParameterSpace {
    ParameterSpace::grid()
        .num_requests(vec![3, 4])
        .num_vehicles(vec![2])
        .pooling_bonus(vec![0.5, 1.5])
        .backend(vec![SolverBackend::ExactBruteForce])
}

#[test]
fn parallel_results_keep_input_order() {
    let sets = small_space().generate();
    let results = run_parallel_experiments_with_progress(sets.clone(), Some(2), false);

    assert_eq!(results.len(), sets.len());
    for (result, set) in results.iter().zip(&sets) {
        assert_eq!(result.experiment_id, set.experiment_id);
        assert!(result.status.is_completed());
    }
}

#[test]
fn single_experiment_is_reproducible() {
    let sets = small_space().generate();
    let first = run_single_experiment(&sets[0]);
    let second = run_single_experiment(&sets[0]);
    assert_eq!(first.status, second.status);
    assert_eq!(first.metrics.best_energy, second.metrics.best_energy);
    assert_eq!(first.metrics.vehicle_km, second.metrics.vehicle_km);
    assert_eq!(first.baseline, second.baseline);
}

#[test]
fn sweep_exports_and_picks_best() {
    let sets = small_space().generate();
    let results = run_parallel_experiments_with_progress(sets.clone(), None, false);

    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("results.csv");
    let json_path = dir.path().join("results.json");
    export_to_csv(&results, &sets, &csv_path).expect("csv");
    export_to_json(&results, &json_path).expect("json");

    let mut reader = csv::Reader::from_path(&csv_path).expect("csv reader");
    assert_eq!(reader.records().count(), sets.len());

    let best = find_best_result_index(&results).expect("best");
    if results.iter().any(|r| r.status == BatchStatus::Completed) {
        assert_eq!(results[best].status, BatchStatus::Completed);
    }
    let best_params = find_best_parameters(&results, &sets).expect("best params");
    assert_eq!(best_params.experiment_id, results[best].experiment_id);

    let summary = summarize(&results);
    assert_eq!(summary.runs, sets.len());
    assert_eq!(summary.failed, 0);
}
