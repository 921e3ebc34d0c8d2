use boost_tuner::parameter::{IntParam, Parameter};
use boost_tuner::sampler::RandomSampler;
use boost_tuner::{Direction, Error, Study, Trial, TrialState};

/// `1/n + 0.01*d`: more estimators help, depth only costs.
#[test]
fn test_best_trial_has_most_estimators_then_shallowest_depth() {
    let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(2024));
    let n_estimators = IntParam::new(10, 1000).name("n_estimators");
    let max_depth = IntParam::new(1, 10).name("max_depth");

    study
        .optimize(5, |trial: &mut Trial| {
            let n = n_estimators.suggest(trial)?;
            let d = max_depth.suggest(trial)?;
            Ok::<_, Error>(1.0 / n as f64 + 0.01 * d as f64)
        })
        .unwrap();

    let trials = study.trials();
    assert_eq!(trials.len(), 5);
    assert!(trials.iter().all(|t| t.state == TrialState::Complete));

    let best = study.best_trial().unwrap();
    for t in &trials {
        assert!(best.value <= t.value);
    }

    let expected = trials
        .iter()
        .min_by(|a, b| a.value.total_cmp(&b.value))
        .unwrap();
    assert_eq!(best.id, expected.id);
    assert_eq!(best.get(&n_estimators), expected.get(&n_estimators));
    assert_eq!(best.get(&max_depth), expected.get(&max_depth));
}

#[test]
fn test_equal_values_resolve_to_first_trial() {
    let study = Study::new(Direction::Minimize);
    let depth = IntParam::new(1, 10).name("max_depth");

    for d in [4, 2, 2, 7] {
        let mut trial = study.create_trial();
        let _ = depth.suggest(&mut trial);
        study.complete_trial(trial, if d == 2 { 0.1 } else { 0.5 });
    }

    let best = study.best_trial().unwrap();
    assert_eq!(best.id, 1);
}

#[test]
fn test_maximize_ties_also_resolve_to_first_trial() {
    let study = Study::new(Direction::Maximize);
    for v in [0.3, 0.8, 0.8] {
        study.complete_trial(study.create_trial(), v);
    }
    assert_eq!(study.best_trial().unwrap().id, 1);
}
