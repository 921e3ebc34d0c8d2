use boost_tuner::parameter::{FloatParam, Parameter};
use boost_tuner::pruner::MedianPruner;
use boost_tuner::sampler::RandomSampler;
use boost_tuner::{Direction, Error, Study, Trial, TrialState};

/// Learning curve `x / (step + 1)`: trials with a large `x` stay worse than
/// the median at every step.
fn curve_objective(x_param: &FloatParam) -> impl Fn(&mut Trial) -> Result<f64, Error> + '_ {
    move |trial: &mut Trial| {
        let x = x_param.suggest(trial)?;
        let mut last = f64::NAN;
        for step in 0..10_u64 {
            last = x / (step as f64 + 1.0);
            trial.report(step, last);
            if trial.should_prune() {
                return Err(Error::TrialPruned);
            }
        }
        Ok(last)
    }
}

#[test]
fn test_median_pruner_stops_bad_trials() {
    let study = Study::with_sampler_and_pruner(
        Direction::Minimize,
        RandomSampler::with_seed(5),
        MedianPruner::new(Direction::Minimize).n_startup_trials(3),
    );
    let x_param = FloatParam::new(0.0, 1.0);

    study.optimize(40, curve_objective(&x_param)).unwrap();

    assert!(study.n_pruned_trials() > 0, "some trials should be pruned");
    assert_eq!(study.n_trials() + study.n_pruned_trials(), 40);

    // the first three trials run before the pruner has any reference
    for t in &study.trials()[..3] {
        assert_eq!(t.state, TrialState::Complete);
        assert_eq!(t.intermediate_values.len(), 10);
    }
}

#[test]
fn test_pruned_score_is_last_intermediate_value() {
    let study = Study::with_sampler_and_pruner(
        Direction::Minimize,
        RandomSampler::with_seed(17),
        MedianPruner::new(Direction::Minimize).n_startup_trials(2),
    );
    let x_param = FloatParam::new(0.0, 1.0);

    study.optimize(30, curve_objective(&x_param)).unwrap();

    let pruned: Vec<_> = study
        .trials()
        .into_iter()
        .filter(|t| t.state == TrialState::Pruned)
        .collect();
    assert!(!pruned.is_empty());
    for t in pruned {
        let last = t.last_intermediate_value().unwrap();
        assert!((t.value - last).abs() < f64::EPSILON);
        assert!(!t.intermediate_values.is_empty());
    }
}

#[test]
fn test_pruned_trials_never_become_best() {
    let study = Study::with_sampler_and_pruner(
        Direction::Minimize,
        RandomSampler::with_seed(99),
        MedianPruner::new(Direction::Minimize).n_startup_trials(1),
    );
    let x_param = FloatParam::new(0.0, 1.0);

    study.optimize(25, curve_objective(&x_param)).unwrap();

    let best = study.best_trial().unwrap();
    assert_eq!(best.state, TrialState::Complete);
}

#[test]
fn test_pruning_without_pruner_is_a_no_op() {
    let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(1));
    let x_param = FloatParam::new(0.0, 1.0);

    study.optimize(15, curve_objective(&x_param)).unwrap();

    assert_eq!(study.n_pruned_trials(), 0);
    assert_eq!(study.n_trials(), 15);
}
