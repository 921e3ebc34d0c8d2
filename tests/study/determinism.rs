use boost_tuner::parameter::{FloatParam, IntParam, Parameter};
use boost_tuner::pruner::MedianPruner;
use boost_tuner::sampler::TpeSampler;
use boost_tuner::{Direction, Error, Study, Trial};

fn seeded_study(seed: u64) -> Study {
    let sampler = TpeSampler::builder()
        .n_startup_trials(5)
        .seed(seed)
        .build()
        .unwrap();
    Study::with_sampler_and_pruner(
        Direction::Minimize,
        sampler,
        MedianPruner::new(Direction::Minimize).n_startup_trials(3),
    )
}

fn run(seed: u64) -> Vec<(u64, f64)> {
    let study = seeded_study(seed);
    let lr = FloatParam::new(0.001, 0.5).log_scale().name("learning_rate");
    let depth = IntParam::new(1, 10).name("max_depth");

    study
        .optimize(30, |trial: &mut Trial| {
            let a = lr.suggest(trial)?;
            let d = depth.suggest(trial)?;
            let mut loss = 1.0;
            for step in 0..5_u64 {
                loss = (a - 0.1).abs() + 0.05 * d as f64 + 1.0 / (step as f64 + 2.0);
                trial.report(step, loss);
                if trial.should_prune() {
                    return Err(Error::TrialPruned);
                }
            }
            Ok::<_, Error>(loss)
        })
        .unwrap();

    study
        .trials()
        .iter()
        .map(|t| (t.get(&depth).unwrap() as u64, t.get(&lr).unwrap()))
        .collect()
}

#[test]
fn test_same_seed_reproduces_configuration_sequence() {
    let a = run(42);
    let b = run(42);
    assert_eq!(a.len(), 30);
    assert_eq!(a, b);
}

#[test]
fn test_different_seeds_diverge() {
    assert_ne!(run(42), run(43));
}
