use boost_tuner::parameter::{FloatParam, IntParam, Parameter};
use boost_tuner::sampler::RandomSampler;
use boost_tuner::{Direction, Error, Study, Trial};

fn sampled<P: Parameter>(study: &Study, param: &P) -> Vec<P::Value> {
    study
        .trials()
        .iter()
        .filter_map(|t| t.get(param))
        .collect()
}

#[test]
fn test_random_sampler_uniform_float_quartiles() {
    let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(42));
    let x_param = FloatParam::new(0.0, 1.0);

    study
        .optimize(1000, |trial: &mut Trial| {
            let x = x_param.suggest(trial)?;
            Ok::<_, Error>(x)
        })
        .unwrap();

    let mut samples = sampled(&study, &x_param);
    assert_eq!(samples.len(), 1000);
    assert!(samples.iter().all(|s| (0.0..=1.0).contains(s)));

    samples.sort_by(f64::total_cmp);
    let q1 = samples[250];
    let q2 = samples[500];
    let q3 = samples[750];
    assert!((q1 - 0.25).abs() < 0.1, "Q1 {q1} should be close to 0.25");
    assert!((q2 - 0.5).abs() < 0.1, "median {q2} should be close to 0.5");
    assert!((q3 - 0.75).abs() < 0.1, "Q3 {q3} should be close to 0.75");
}

#[test]
fn test_random_sampler_uniform_int_counts() {
    let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(123));
    let n_param = IntParam::new(1, 10);

    study
        .optimize(5000, |trial: &mut Trial| {
            let n = n_param.suggest(trial)?;
            Ok::<_, Error>(n as f64)
        })
        .unwrap();

    let mut counts = [0_u32; 10];
    for n in sampled(&study, &n_param) {
        assert!((1..=10).contains(&n), "sample {n} out of range [1, 10]");
        counts[(n - 1) as usize] += 1;
    }

    let expected = 500.0;
    for (i, &count) in counts.iter().enumerate() {
        let diff = (f64::from(count) - expected).abs() / expected;
        assert!(diff < 0.2, "value {} appeared {count} times", i + 1);
    }
}

#[test]
fn test_random_sampler_log_uniform_float_spreads_over_decades() {
    let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(7));
    let lr = FloatParam::new(0.001, 0.5).log_scale();

    study
        .optimize(2000, |trial: &mut Trial| {
            let v = lr.suggest(trial)?;
            Ok::<_, Error>(v)
        })
        .unwrap();

    let samples = sampled(&study, &lr);
    assert!(samples.iter().all(|s| (0.001..=0.5).contains(s)));
    // log10 range is [-3, -0.3]: about a third of the mass lies below 0.01
    let below = samples.iter().filter(|&&s| s < 0.01).count() as f64 / samples.len() as f64;
    assert!((below - 1.0 / 2.7).abs() < 0.06, "fraction below 0.01: {below}");
}

#[test]
fn test_random_sampler_same_seed_same_sequence() {
    let run = |seed| {
        let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(seed));
        let x_param = FloatParam::new(0.0, 100.0);
        study
            .optimize(100, |trial: &mut Trial| {
                let x = x_param.suggest(trial)?;
                Ok::<_, Error>(x)
            })
            .unwrap();
        study.trials().iter().map(|t| t.value).collect::<Vec<_>>()
    };

    assert_eq!(run(999), run(999));
    assert_ne!(run(999), run(1000));
}
