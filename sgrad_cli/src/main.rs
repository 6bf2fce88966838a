//! Command-line demo for the scalar autodiff engine.
//!
//! `sgrad train` fits a small MLP to y = sin(x) and prints the learned
//! parameters. `sgrad check` compares engine gradients with finite
//! differences on a fixed expression.

use std::error::Error;
use std::f64::consts::PI;

use clap::{Parser, Subcommand};
use log::{debug, info};
use sgrad_core::{check_gradients, constant, finite_diff_grad, leaf, GradError, Value};
use sgrad_nn::{Activation, LossKind, Mlp, NetworkConfig, Sample, TrainConfig, Trainer};

#[derive(Parser)]
#[command(name = "sgrad")]
#[command(about = "Scalar reverse-mode autodiff and a tiny MLP trainer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an MLP on samples of y = sin(x) over [-pi, pi]
    Train {
        /// Layer widths, input first (input and output must be 1)
        #[arg(long, value_delimiter = ',', default_values_t = [1, 8, 8, 1])]
        layers: Vec<usize>,

        /// Hidden activation: linear, relu, sigmoid or tanh
        #[arg(long, default_value_t = Activation::Tanh)]
        activation: Activation,

        /// Loss: mse or mae
        #[arg(long, default_value_t = LossKind::MeanSquaredError)]
        loss: LossKind,

        #[arg(long, default_value_t = 200)]
        epochs: usize,

        /// Learning rate
        #[arg(long, default_value_t = 0.05)]
        lr: f64,

        #[arg(long, default_value_t = 0.0)]
        momentum: f64,

        /// Seed for the initial weights (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Number of evenly spaced training samples
        #[arg(long, default_value_t = 40)]
        samples: usize,

        /// Print every parameter after training
        #[arg(short, long)]
        params: bool,
    },

    /// Check engine gradients against finite differences
    Check {
        #[arg(long, default_value_t = 1.5)]
        x: f64,

        #[arg(long, default_value_t = 2.5)]
        y: f64,

        /// Finite-difference step
        #[arg(long, default_value_t = 1e-6)]
        eps: f64,

        /// Largest acceptable absolute error
        #[arg(long, default_value_t = 1e-5)]
        tolerance: f64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train {
            layers,
            activation,
            loss,
            epochs,
            lr,
            momentum,
            seed,
            samples,
            params,
        } => {
            let mut builder = NetworkConfig::builder()
                .layer_sizes(layers)
                .hidden_activation(activation)
                .output_activation(Activation::Linear);
            if let Some(seed) = seed {
                builder = builder.seed(seed);
            }
            let network_config = builder.build()?;
            let train_config = TrainConfig {
                learning_rate: lr,
                momentum,
                epochs,
                loss,
            };
            train(&network_config, train_config, samples, params)
        }
        Commands::Check {
            x,
            y,
            eps,
            tolerance,
        } => check(x, y, eps, tolerance),
    }
}

/// `samples` evenly spaced points of sin over [-pi, pi].
fn sine_samples(samples: usize) -> Vec<Sample> {
    match samples {
        0 => Vec::new(),
        1 => vec![Sample::new(0.0, 0.0)],
        n => (0..n)
            .map(|i| {
                let x = -PI + 2.0 * PI * i as f64 / (n - 1) as f64;
                Sample::new(x, x.sin())
            })
            .collect(),
    }
}

fn train(
    network_config: &NetworkConfig,
    train_config: TrainConfig,
    samples: usize,
    show_params: bool,
) -> Result<(), Box<dyn Error>> {
    let network = Mlp::new(network_config)?;
    info!(
        "network {:?}: {} parameters, hidden {}, loss {}",
        network.layer_sizes(),
        network.num_parameters(),
        network_config.hidden_activation,
        train_config.loss
    );

    let data = sine_samples(samples);
    let mut trainer = Trainer::new(network, train_config)?;

    let initial = trainer.evaluate(&data)?;
    println!("Initial loss: {:.6}", initial);

    let reports = trainer.fit(&data)?;
    let last = reports.last().map(|r| r.mean_loss).unwrap_or(initial);
    println!("Final epoch loss: {:.6}", last);
    println!("Evaluation loss:  {:.6}\n", trainer.evaluate(&data)?);

    println!("   x        sin(x)    prediction");
    for x in [-PI / 2.0, -1.0, 0.0, 1.0, PI / 2.0] {
        println!("{:7.3}  {:9.5}  {:11.5}", x, x.sin(), trainer.predict(x)?);
    }

    if show_params {
        println!("\nParameters:");
        for state in trainer.network().parameter_states() {
            println!(
                "  {:<24} value = {:>10.6}  grad = {:>10.6}",
                state.name, state.value, state.gradient
            );
        }
    }
    Ok(())
}

/// z = (x*y + sin(x)) / (y + 2)
fn expression(inputs: &[Value]) -> Result<Value, GradError> {
    match inputs {
        [x, y] => Ok((x * y + x.sin()) / (y + constant(2.0))),
        _ => Err(GradError::DimensionMismatch {
            expected: 2,
            actual: inputs.len(),
        }),
    }
}

fn check(x_val: f64, y_val: f64, eps: f64, tolerance: f64) -> Result<(), Box<dyn Error>> {
    let x = leaf(x_val);
    let y = leaf(y_val);
    let z = expression(&[x.clone(), y.clone()])?;
    z.backward();

    println!("Expression: z = (x*y + sin(x)) / (y + 2)");
    println!("At point:   x = {}, y = {}", x_val, y_val);
    println!("Value:      z = {:.10}\n", z.value());

    println!("Autodiff gradients:");
    println!("  dz/dx = {:.10}", x.grad());
    println!("  dz/dy = {:.10}\n", y.grad());

    let point = [x_val, y_val];
    let fd = finite_diff_grad(
        |p: &[f64]| {
            let leaves: Vec<Value> = p.iter().map(|&v| leaf(v)).collect();
            expression(&leaves).map(|z| z.value()).unwrap_or(f64::NAN)
        },
        &point,
        eps,
    );
    println!("Finite difference gradients (eps={:e}):", eps);
    println!("  dz/dx = {:.10}", fd[0]);
    println!("  dz/dy = {:.10}\n", fd[1]);

    let max_err = check_gradients(expression, &point, eps)?;
    debug!("max gradient error {:e} at {:?}", max_err, point);

    if max_err < tolerance {
        println!("PASS: max error ({:.2e}) < tolerance ({:.2e})", max_err, tolerance);
        Ok(())
    } else {
        Err(format!(
            "max error ({:.2e}) >= tolerance ({:.2e})",
            max_err, tolerance
        )
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_defaults() {
        let cli = Cli::parse_from(["sgrad", "train"]);
        match cli.command {
            Commands::Train {
                layers,
                activation,
                loss,
                seed,
                ..
            } => {
                assert_eq!(layers, vec![1, 8, 8, 1]);
                assert_eq!(activation, Activation::Tanh);
                assert_eq!(loss, LossKind::MeanSquaredError);
                assert_eq!(seed, None);
            }
            Commands::Check { .. } => panic!("expected train"),
        }
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::parse_from([
            "sgrad",
            "train",
            "--layers",
            "1,4,1",
            "--activation",
            "relu",
            "--loss",
            "mae",
            "--seed",
            "42",
        ]);
        match cli.command {
            Commands::Train {
                layers,
                activation,
                loss,
                seed,
                ..
            } => {
                assert_eq!(layers, vec![1, 4, 1]);
                assert_eq!(activation, Activation::Relu);
                assert_eq!(loss, LossKind::MeanAbsoluteError);
                assert_eq!(seed, Some(42));
            }
            Commands::Check { .. } => panic!("expected train"),
        }
    }

    #[test]
    fn test_unknown_activation_is_rejected() {
        assert!(Cli::try_parse_from(["sgrad", "train", "--activation", "swish"]).is_err());
    }

    #[test]
    fn test_sine_samples_span_the_interval() {
        let data = sine_samples(5);
        assert_eq!(data.len(), 5);
        assert_eq!(data[0].input, -PI);
        assert_eq!(data[4].input, PI);
        assert!(data[2].target.abs() < 1e-12);
        assert!(sine_samples(0).is_empty());
    }

    #[test]
    fn test_expression_gradients_pass_check() {
        let err = check_gradients(expression, &[1.5, 2.5], 1e-6).unwrap();
        assert!(err < 1e-5);
    }
}
