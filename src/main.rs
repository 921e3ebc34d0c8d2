//! Tunes the booster on the synthetic dataset, refits the best
//! configuration and prints its validation scores.
//!
//! Set `RUST_LOG` to change log verbosity (default `info`).

use std::collections::BTreeMap;

use boost_tuner::config::RunConfig;
use boost_tuner::experiment;
use boost_tuner::search_space::SearchSpace;
use boost_tuner::ParamValue;

fn format_params(params: &BTreeMap<String, ParamValue>) -> String {
    let body: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("'{name}': {value}"))
        .collect();
    format!("{{{}}}", body.join(", "))
}

fn main() -> boost_tuner::Result<()> {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::EnvFilter;

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let config = RunConfig::default();
    let space = SearchSpace::booster_default();
    let (train, valid) = experiment::prepare_data(&config)?;

    println!("\nStarting Bayesian Optimization...");
    let study = experiment::run_search(&config, &space, &train, &valid)?;

    println!("\nOptimization Finished.");
    println!("Best trial validation loss: {:.4}", study.best_value()?);
    let best_params = study.best_params()?;
    println!("Best hyperparameters found:");
    println!("{}", format_params(&best_params));

    println!("\nSaving optimization results to HTML files...");
    match experiment::write_reports(&study, &config.output_dir) {
        Ok((history, slice)) => println!(
            "\nPlots saved! Check {} and {}.",
            history.display(),
            slice.display()
        ),
        Err(e) => println!("\nCould not save plots due to an error: {e}"),
    }

    println!("\nTraining final model with best hyperparameters...");
    let booster = experiment::train_final(&config, &best_params, &train, &valid)?;

    println!("\nEvaluating final model...");
    let evaluation = experiment::evaluate(&booster, &valid);

    println!("\nBest Iteration: {}", booster.best_iteration());
    println!("Final Validation Accuracy: {:.4}", evaluation.accuracy);

    println!("\nConfusion Matrix:");
    println!("{}", evaluation.confusion);

    println!("\nClassification Report:");
    println!("{}", evaluation.report);

    Ok(())
}
