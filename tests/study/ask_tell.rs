use boost_tuner::parameter::{FloatParam, Parameter};
use boost_tuner::sampler::TpeSampler;
use boost_tuner::{Direction, Error, Study, TrialPruned, TrialState};

#[test]
fn test_ask_and_tell_basic() {
    let study = Study::new(Direction::Minimize);
    let x = FloatParam::new(-5.0, 5.0);

    for _ in 0..5 {
        let mut trial = study.ask();
        let v = x.suggest(&mut trial).unwrap();
        study.tell(trial, Ok::<_, Error>(v * v));
    }

    assert_eq!(study.n_trials(), 5);
    assert!(study.best_value().unwrap() >= 0.0);
}

#[test]
fn test_ask_and_tell_records_every_state() {
    let study = Study::new(Direction::Minimize);

    let trial = study.ask();
    study.tell(trial, Ok::<_, Error>(1.0));

    let mut trial = study.ask();
    trial.report(0, 0.7);
    study.tell(trial, Err::<f64, _>(TrialPruned));

    let trial = study.ask();
    study.tell(trial, Err::<f64, _>("diverged"));

    let states: Vec<TrialState> = study.trials().iter().map(|t| t.state).collect();
    assert_eq!(
        states,
        vec![TrialState::Complete, TrialState::Pruned, TrialState::Failed]
    );
    assert_eq!(study.n_trials(), 1);
    assert_eq!(study.n_pruned_trials(), 1);

    let failed = &study.trials()[2];
    assert!(failed.value.is_nan());
    assert!(failed.user_attr("fail_reason").is_some());
}

#[test]
fn test_ask_and_tell_with_tpe_sampler() {
    let sampler = TpeSampler::builder()
        .n_startup_trials(5)
        .seed(42)
        .build()
        .unwrap();
    let study = Study::with_sampler(Direction::Minimize, sampler);
    let x = FloatParam::new(-5.0, 5.0).name("x");

    for _ in 0..20 {
        let mut trial = study.ask();
        let v = x.suggest(&mut trial).unwrap();
        study.tell(trial, Ok::<_, Error>(v * v));
    }

    assert_eq!(study.n_trials(), 20);
    let ids: Vec<u64> = study.trials().iter().map(|t| t.id).collect();
    assert_eq!(ids, (0..20).collect::<Vec<_>>());
}
