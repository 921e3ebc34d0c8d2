use std::collections::HashMap;

use boost_tuner::pruner::{NopPruner, Pruner};
use boost_tuner::sampler::CompletedTrial;

#[test]
fn never_prunes_even_nan() {
    let completed: Vec<CompletedTrial> = (0..10)
        .map(|id| {
            CompletedTrial::with_intermediate_values(
                id,
                HashMap::new(),
                HashMap::new(),
                HashMap::new(),
                0.0,
                vec![(0, 0.0)],
            )
        })
        .collect();
    assert!(!NopPruner.should_prune(10, 0, &[(0, 1e9)], &completed));
    assert!(!NopPruner.should_prune(10, 0, &[(0, f64::NAN)], &completed));
}
