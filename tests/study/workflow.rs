use boost_tuner::parameter::{FloatParam, IntParam, Parameter};
use boost_tuner::{Direction, Error, Study, Trial, TrialState};

#[test]
fn test_study_basic_workflow() {
    let study = Study::new(Direction::Minimize);
    let x_param = FloatParam::new(-5.0, 5.0);

    study
        .optimize(10, |trial: &mut Trial| {
            let x = x_param.suggest(trial)?;
            Ok::<_, Error>(x * x)
        })
        .expect("optimization should succeed");

    assert_eq!(study.n_trials(), 10);
    let best = study.best_trial().expect("should have best trial");
    assert!(best.value >= 0.0, "x^2 should be non-negative");
}

#[test]
fn test_best_trial_is_no_worse_than_any_complete_trial() {
    for direction in [Direction::Minimize, Direction::Maximize] {
        let study = Study::new(direction);
        let x_param = FloatParam::new(-3.0, 3.0);

        study
            .optimize(30, |trial: &mut Trial| {
                let x = x_param.suggest(trial)?;
                Ok::<_, Error>(x.sin() * x)
            })
            .unwrap();

        let best = study.best_value().unwrap();
        for t in study.trials() {
            match direction {
                Direction::Minimize => assert!(best <= t.value),
                Direction::Maximize => assert!(best >= t.value),
            }
        }
    }
}

#[test]
fn test_failure_aborts_the_search() {
    let study = Study::new(Direction::Minimize);
    let x_param = FloatParam::new(0.0, 1.0);

    let result = study.optimize(10, |trial: &mut Trial| {
        let x = x_param.suggest(trial)?;
        if trial.id() == 3 {
            return Err(Error::Internal("boom"));
        }
        Ok(x)
    });

    match result {
        Err(Error::TrialFailed { trial_id, message }) => {
            assert_eq!(trial_id, 3);
            assert!(message.contains("boom"));
        }
        other => panic!("expected TrialFailed, got {other:?}"),
    }
    let trials = study.trials();
    assert_eq!(trials.len(), 4, "no trial runs after the failure");
    assert_eq!(trials[3].state, TrialState::Failed);
    assert_eq!(study.n_trials(), 3);
}

#[test]
fn test_no_completed_trials_error() {
    let study = Study::new(Direction::Minimize);

    assert!(matches!(study.best_trial(), Err(Error::NoCompletedTrials)));
    assert!(matches!(study.best_params(), Err(Error::NoCompletedTrials)));
}

#[test]
fn test_study_direction() {
    assert_eq!(Study::new(Direction::Minimize).direction(), Direction::Minimize);
    assert_eq!(Study::new(Direction::Maximize).direction(), Direction::Maximize);
}

#[test]
fn test_best_params_are_keyed_by_label() {
    let study = Study::new(Direction::Minimize);
    let lr = FloatParam::new(0.001, 0.5).log_scale().name("learning_rate");
    let leaves = IntParam::new(20, 300).name("num_leaves");

    study
        .optimize(8, |trial: &mut Trial| {
            let a = lr.suggest(trial)?;
            let b = leaves.suggest(trial)?;
            Ok::<_, Error>(a + b as f64)
        })
        .unwrap();

    let params = study.best_params().unwrap();
    assert_eq!(
        params.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["learning_rate", "num_leaves"]
    );
    let best = study.best_trial().unwrap();
    assert_eq!(params["num_leaves"].as_f64(), best.get(&leaves).unwrap() as f64);
}

#[test]
fn test_top_trials_sorted_and_truncated() {
    let study = Study::new(Direction::Maximize);
    for v in [0.2, 0.9, 0.5, 0.9] {
        study.complete_trial(study.create_trial(), v);
    }

    let top = study.top_trials(3);
    let ids: Vec<u64> = top.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 3, 2]);
    assert_eq!(study.top_trials(10).len(), 4);
}
