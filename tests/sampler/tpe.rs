use boost_tuner::parameter::{FloatParam, IntParam, Parameter};
use boost_tuner::search_space::SearchSpace;
use boost_tuner::sampler::{RandomSampler, Sampler, TpeSampler};
use boost_tuner::{Direction, Error, Study, Trial};

fn tpe(seed: u64) -> TpeSampler {
    TpeSampler::builder()
        .n_startup_trials(10)
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn test_tpe_beats_its_own_startup_phase() {
    let study = Study::with_sampler(Direction::Minimize, tpe(42));
    let x = FloatParam::new(-10.0, 10.0).name("x");

    study
        .optimize(80, |trial: &mut Trial| {
            let v = x.suggest(trial)?;
            Ok::<_, Error>((v - 2.0).powi(2))
        })
        .unwrap();

    let trials = study.trials();
    let startup_best = trials[..10]
        .iter()
        .map(|t| t.value)
        .fold(f64::INFINITY, f64::min);
    let best = study.best_value().unwrap();
    assert!(best <= startup_best);
    assert!(best < 0.5, "best value {best} should be close to the optimum");
}

fn best_on_shifted_parabola(sampler: impl Sampler + 'static, n_trials: usize) -> f64 {
    let study = Study::with_sampler(Direction::Minimize, sampler);
    let x = FloatParam::new(-10.0, 10.0).name("x");
    study
        .optimize(n_trials, |trial: &mut Trial| {
            let v = x.suggest(trial)?;
            Ok::<_, Error>((v - 2.0).powi(2))
        })
        .unwrap();
    study.best_value().unwrap()
}

#[test]
fn test_tpe_keeps_exploring_after_a_lucky_cluster() {
    // Every seed must refine past its startup best instead of re-sampling
    // one early cluster.
    for seed in 0..10 {
        let best = best_on_shifted_parabola(tpe(seed), 80);
        assert!(best < 0.5, "seed {seed}: best value {best}");
    }
}

#[test]
fn test_tpe_outperforms_random_search_on_average() {
    let seeds = 0..10_u64;
    let n = seeds.clone().count() as f64;
    let tpe_mean = seeds
        .clone()
        .map(|s| best_on_shifted_parabola(tpe(s), 80))
        .sum::<f64>()
        / n;
    let random_mean = seeds
        .map(|s| best_on_shifted_parabola(RandomSampler::with_seed(s), 80))
        .sum::<f64>()
        / n;
    assert!(
        tpe_mean < random_mean,
        "tpe mean best {tpe_mean} vs random mean best {random_mean}"
    );
}

#[test]
fn test_tpe_maximize_moves_toward_high_values() {
    let sampler = TpeSampler::builder()
        .direction(Direction::Maximize)
        .n_startup_trials(10)
        .seed(3)
        .build()
        .unwrap();
    let study = Study::with_sampler(Direction::Maximize, sampler);
    let x = FloatParam::new(0.0, 1.0).name("x");

    study
        .optimize(60, |trial: &mut Trial| {
            let v = x.suggest(trial)?;
            Ok::<_, Error>(v)
        })
        .unwrap();

    let late: Vec<f64> = study.trials()[40..].iter().map(|t| t.value).collect();
    let mean = late.iter().sum::<f64>() / late.len() as f64;
    assert!(mean > 0.6, "late samples average {mean}");
}

#[test]
fn test_tpe_integers_stay_in_range() {
    let study = Study::with_sampler(Direction::Minimize, tpe(11));
    let depth = IntParam::new(1, 10).name("max_depth");

    study
        .optimize(40, |trial: &mut Trial| {
            let d = depth.suggest(trial)?;
            Ok::<_, Error>(((d - 4) as f64).abs())
        })
        .unwrap();

    for t in study.trials() {
        let d = t.get(&depth).unwrap();
        assert!((1..=10).contains(&d));
    }
}

#[test]
fn test_tpe_seeded_search_reproduces_configurations() {
    let space = SearchSpace::booster_default();
    let run = || {
        let study = Study::with_sampler(Direction::Minimize, tpe(42));
        study
            .optimize(25, |trial: &mut Trial| {
                let values = space.suggest(trial)?;
                Ok::<_, Error>(values.values().map(|v| v.as_f64()).sum::<f64>().sin())
            })
            .unwrap();
        study
            .trials()
            .iter()
            .map(|t| t.named_params())
            .collect::<Vec<_>>()
    };

    let a = run();
    let b = run();
    assert_eq!(a.len(), 25);
    assert_eq!(a, b);
}
