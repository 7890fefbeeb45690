mod support;

use pool_core::artifact::QuboArtifact;
use pool_core::decode::{decode, decode_samples, select_best, Candidate, ValidationPolicy, Violation};
use pool_core::model::RequestId;
use pool_core::qubo::{build, BuilderParams};
use pool_core::solver::{solve, Sample, SolverBackend, SolverConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use support::batches::{all_bitstrings, pooling_pair, single_vehicle, synthetic_batch};

#[test]
fn one_hot_sample_with_room_is_feasible() {
    let (requests, vehicles) = synthetic_batch(3, 3, 8);
    let model = build(&requests, &vehicles, &BuilderParams::default()).expect("build");

    // First candidate of every request.
    let mut bits = vec![0u8; model.num_variables()];
    for request in &requests {
        let first = model
            .variables
            .candidates_for(request.id)
            .next()
            .expect("every request has a candidate");
        bits[first.index] = 1;
    }
    let (assignment, report) = decode(&bits, &model.variables).expect("decode");
    assert!(report.is_empty());
    assert_eq!(assignment.assigned_count(), 3);
}

#[test]
fn two_slots_for_one_request_name_it() {
    let model = build(
        &pooling_pair(1),
        &single_vehicle(2),
        &BuilderParams::default().with_slots(2, 200),
    )
    .expect("build");
    let bits: Vec<u8> = model
        .variables
        .iter()
        .map(|v| u8::from(v.request == RequestId(1)))
        .collect();
    assert_eq!(bits.iter().filter(|&&b| b == 1).count(), 2);

    let (_, report) = decode(&bits, &model.variables).expect("decode");
    assert_eq!(report.len(), 1);
    assert!(matches!(
        &report.violations()[0],
        Violation::MultipleAssignment { request, .. } if *request == RequestId(1)
    ));
}

#[test]
fn shuffling_samples_does_not_change_best() {
    let model = build(&pooling_pair(1), &single_vehicle(2), &BuilderParams::default())
        .expect("build");
    let samples: Vec<Sample> = all_bitstrings(model.num_variables())
        .into_iter()
        .map(|bits| {
            let energy = model.energy(&bits);
            Sample::new(bits, energy, 1)
        })
        .collect();
    let policy = ValidationPolicy::default();
    let expected = decode_samples(samples.clone(), &model.variables, &policy).expect("rank");

    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..10 {
        let mut shuffled = samples.clone();
        shuffled.shuffle(&mut rng);
        let ranked = decode_samples(shuffled, &model.variables, &policy).expect("rank");
        assert_eq!(ranked, expected);
    }
}

#[test]
fn reloaded_artifact_decodes_without_builder() {
    let (requests, vehicles) = synthetic_batch(4, 2, 17);
    let model = build(&requests, &vehicles, &BuilderParams::default()).expect("build");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("batch.qubo.json");
    QuboArtifact::from_model(&model)
        .expect("artifact")
        .save(&path)
        .expect("save");

    let reloaded = QuboArtifact::load(&path).expect("load").into_model();
    assert_eq!(reloaded.variables, model.variables);
    assert_eq!(reloaded.matrix, model.matrix);

    let config = SolverConfig::default().with_backend(SolverBackend::ExactBruteForce);
    let samples = solve(&reloaded, &config).expect("solve");
    let candidates: Vec<Candidate> = samples
        .into_iter()
        .map(|s| Candidate::from_sample(s, &reloaded.variables, &ValidationPolicy::default()))
        .collect::<Result<_, _>>()
        .expect("decode");
    let best = select_best(candidates).expect("best");
    assert!(best.is_feasible());
    assert_eq!(best.sample.rank, Some(0));
    assert_eq!(best.sample.energy, model.energy(&best.sample.bits));
}
