use rust_gradient_descent::config::load_config;
use rust_gradient_descent::objective::{ObjectiveFunction, Polynomial};
use rust_gradient_descent::{Result, Trainer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Fit f(x) = a·x² + b·x + c to samples of a known quadratic.
const TRUE_COEFFICIENTS: [f64; 3] = [0.5, -2.0, 3.0];
const X_MIN: f64 = -2.0;
const X_STEP: f64 = 0.5;
const NUM_SAMPLES: usize = 13;
// Used when no config file is given.
const EPOCHS: usize = 5000;

// Evenly spaced inputs and the exact quadratic outputs.
fn synthetic_samples() -> (Vec<f64>, Vec<f64>) {
    let truth = Polynomial::new(TRUE_COEFFICIENTS.to_vec());
    let x: Vec<f64> = (0..NUM_SAMPLES)
        .map(|i| X_MIN + X_STEP * i as f64)
        .collect();
    let y = truth.function(&x);
    (x, y)
}

// Trainer with the library defaults, or configured from a JSON file.
fn build_trainer(config_path: Option<&str>) -> Result<Trainer<Polynomial>> {
    let mut trainer = Trainer::new(Polynomial::with_degree(2));
    match config_path {
        Some(path) => {
            info!(path, "loading training config");
            load_config(path)?.apply(&mut trainer)?;
        }
        None => trainer.set_max_epochs(EPOCHS)?,
    }
    Ok(trainer)
}

fn run(config_path: Option<&str>) -> Result<()> {
    let (x, y) = synthetic_samples();
    let mut trainer = build_trainer(config_path)?;

    println!("Optimizer: {}", trainer.optimizer());
    if let Some(decay) = trainer.decay() {
        println!("Decay: {decay}");
    }
    if let Some(regularization) = trainer.regularization() {
        println!("Regularization: {regularization}");
    }

    let summary = trainer.fit(&x, &y)?;

    println!(
        "Finished after {} epochs (converged: {}), loss = {:.3e}",
        summary.epochs, summary.converged, summary.loss
    );
    for (i, (fitted, expected)) in summary
        .parameters
        .iter()
        .zip(TRUE_COEFFICIENTS)
        .enumerate()
    {
        println!("theta[{i}] = {fitted:.6} (expected {expected})");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_gradient_descent=info,curve_fit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1);
    if let Err(err) = run(config_path.as_deref()) {
        error!(%err, "curve fit failed");
        std::process::exit(1);
    }
}
