use crate::metrics::ExperimentResult;
use crate::parameters::ParameterSet;

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn export_to_csv_impl(
    results: &[ExperimentResult],
    parameter_sets: &[ParameterSet],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    if results.len() != parameter_sets.len() {
        return Err(format!(
            "Results length ({}) doesn't match parameter_sets length ({})",
            results.len(),
            parameter_sets.len()
        )
        .into());
    }

    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "num_requests",
        "num_vehicles",
        "vehicle_capacity",
        "pooling_bonus",
        "assignment_penalty_weight",
        "capacity_penalty_weight",
        "backend",
        "status",
        "attempts",
        "solve_time_ms",
        "num_variables",
        "num_terms",
        "best_energy",
        "feasibility_rate",
        "pooling_rate",
        "assigned",
        "unassigned",
        "dropped",
        "penalty_ratio",
        "vehicle_km",
        "total_detour_km",
        "baseline_vehicle_km",
        "km_saved_ratio",
    ])?;

    for (result, param_set) in results.iter().zip(parameter_sets.iter()) {
        let builder = &param_set.batch.builder;
        let metrics = &result.metrics;
        wtr.write_record([
            result.experiment_id.clone(),
            result.run_id.to_string(),
            param_set.seed.to_string(),
            param_set.scenario.num_requests.to_string(),
            param_set.scenario.num_vehicles.to_string(),
            param_set.scenario.vehicle_capacity.to_string(),
            builder.pooling_bonus.to_string(),
            builder.assignment_penalty_weight.to_string(),
            builder.capacity_penalty_weight.to_string(),
            param_set.batch.solver.backend.label().to_string(),
            result.status.label().to_string(),
            metrics.attempts.to_string(),
            metrics.solve_time_ms.to_string(),
            metrics.num_variables.to_string(),
            metrics.num_terms.to_string(),
            optional(metrics.best_energy),
            metrics.feasibility_rate.to_string(),
            metrics.pooling_rate.to_string(),
            metrics.assigned.to_string(),
            metrics.unassigned.to_string(),
            metrics.dropped.to_string(),
            optional(metrics.penalty_ratio),
            metrics.vehicle_km.to_string(),
            metrics.total_detour_km.to_string(),
            result.baseline.vehicle_km.to_string(),
            result.km_saved_ratio.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
