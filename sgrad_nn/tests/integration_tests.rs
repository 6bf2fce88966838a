//! Integration tests for networks built on the scalar engine.
//!
//! Exercises hand-built networks with known gradients, topology and arity
//! checks, gradient accumulation, and end-to-end training.

use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use sgrad_core::{topological_order, GradError, Value};
use sgrad_nn::{
    mse_loss, Activation, Layer, LossKind, Mlp, NetworkConfig, NnError, Neuron, Sample,
    TrainConfig, Trainer,
};

// ============================================================================
// Test Utilities
// ============================================================================

/// A 1 -> 1 linear network computing `w * x + b`.
fn affine(w: f64, b: f64) -> Mlp {
    let neuron = Neuron::from_parameters(vec![w], b, Activation::Linear);
    let layer = Layer::from_neurons(vec![neuron]).unwrap();
    Mlp::from_layers(vec![layer]).unwrap()
}

fn seeded(sizes: &[usize], hidden: Activation, seed: u64) -> Mlp {
    let config = NetworkConfig::builder()
        .layer_sizes(sizes.to_vec())
        .hidden_activation(hidden)
        .seed(seed)
        .build()
        .unwrap();
    Mlp::new(&config).unwrap()
}

fn grid(n: usize, lo: f64, hi: f64, f: impl Fn(f64) -> f64) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (n - 1) as f64;
            Sample::new(x, f(x))
        })
        .collect()
}

// ============================================================================
// Test: Known Gradients
// ============================================================================

#[test]
fn test_single_weight_regression_gradients() {
    let mut mlp = affine(2.0, 0.0);
    let x = Value::leaf(3.0);
    let out = mlp.forward_one(&[x.clone()]).unwrap();
    assert_eq!(out.value(), 6.0);

    let loss = mse_loss(&out, 10.0);
    assert_eq!(loss.value(), 16.0);
    loss.backward();

    let params = mlp.parameters();
    assert_eq!(params[0].grad(), -24.0);
    assert_eq!(params[1].grad(), -8.0);
    // The input is a leaf too, so it gets d(loss)/dx = 2 * (6 - 10) * w.
    assert_eq!(x.grad(), -16.0);
}

#[test]
fn test_sigmoid_neuron_gradient_at_zero() {
    let neuron = Neuron::from_parameters(vec![0.0], 0.0, Activation::Sigmoid);
    let layer = Layer::from_neurons(vec![neuron]).unwrap();
    let mut mlp = Mlp::from_layers(vec![layer]).unwrap();

    let out = mlp.forward_scalar(&[5.0]).unwrap().remove(0);
    assert_eq!(out.value(), 0.5);

    out.backward();
    let pre_activation = &out.operands()[0];
    assert_eq!(pre_activation.grad(), 0.25);
}

#[test]
fn test_repeated_backward_doubles_leaf_gradients() {
    let mut mlp = affine(2.0, 0.0);
    let out = mlp.forward_scalar(&[3.0]).unwrap().remove(0);
    let loss = mse_loss(&out, 10.0);

    loss.backward();
    loss.backward();

    let params = mlp.parameters();
    assert_eq!(params[0].grad(), -48.0);
    assert_eq!(params[1].grad(), -16.0);

    mlp.zero_gradients();
    loss.backward();
    assert_eq!(params[0].grad(), -24.0);
}

#[test]
fn test_zeroing_is_idempotent() {
    let mut mlp = seeded(&[2, 4, 1], Activation::Tanh, 5);
    let out = mlp.forward_scalar(&[0.2, -0.4]).unwrap().remove(0);
    let loss = mse_loss(&out, 0.3);

    mlp.zero_gradients();
    loss.backward();
    let first: Vec<f64> = mlp.parameters().iter().map(Value::grad).collect();
    assert!(first.iter().any(|&g| g != 0.0));

    mlp.zero_gradients();
    loss.backward();
    let second: Vec<f64> = mlp.parameters().iter().map(Value::grad).collect();
    assert_eq!(first, second);

    // Without zeroing, the same pass adds on top.
    loss.backward();
    for (g, g0) in mlp.parameters().iter().map(Value::grad).zip(&first) {
        assert_eq!(g, 2.0 * g0);
    }
}

// ============================================================================
// Test: Topology and Arity
// ============================================================================

#[test]
fn test_topology_needs_two_widths() {
    let err = NetworkConfig::builder().layer_sizes([2]).build().unwrap_err();
    assert!(matches!(err, GradError::InvalidTopology(_)));
}

#[test]
fn test_wrong_input_count_is_rejected() {
    let mut mlp = seeded(&[2, 3, 1], Activation::Relu, 1);
    let err = mlp.forward_scalar(&[1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(
        err,
        GradError::DimensionMismatch {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_network_graph_order_is_valid() {
    let mut mlp = seeded(&[2, 3, 2, 1], Activation::Tanh, 9);
    let out = mlp.forward_scalar(&[0.5, 1.5]).unwrap().remove(0);
    let loss = mse_loss(&out, 1.0);

    let order = topological_order(&loss);
    let position: HashMap<_, _> = order.iter().enumerate().map(|(i, v)| (v.id(), i)).collect();
    assert_eq!(position.len(), order.len(), "each node appears once");

    for node in &order {
        for operand in node.operands() {
            assert!(position[&operand.id()] < position[&node.id()]);
        }
    }
    assert_eq!(order.last().map(Value::id), Some(loss.id()));

    // Every parameter is reachable from the loss.
    for p in mlp.parameters() {
        assert!(position.contains_key(&p.id()));
    }
}

#[test]
fn test_parameter_updates_do_not_change_recorded_graph() {
    let mut mlp = seeded(&[1, 3, 1], Activation::Tanh, 2);
    let out = mlp.forward_scalar(&[0.8]).unwrap().remove(0);
    let before = out.value();

    for p in mlp.parameters() {
        p.set_value(p.value() + 1.0);
    }
    assert_eq!(out.value(), before);

    // A fresh forward pass sees the updated parameters.
    let recorded = mlp.forward_scalar(&[0.8]).unwrap().remove(0);
    assert_ne!(recorded.value(), before);
}

// ============================================================================
// Test: Training
// ============================================================================

#[test]
fn test_fit_linear_function() {
    eprintln!("\n=== Fit y = 0.5x + 0.2 with a 1 -> 4 -> 1 tanh network ===");

    let data = grid(21, -1.0, 1.0, |x| 0.5 * x + 0.2);
    let config = TrainConfig {
        learning_rate: 0.05,
        epochs: 200,
        ..TrainConfig::default()
    };
    let mut trainer = Trainer::new(seeded(&[1, 4, 1], Activation::Tanh, 42), config).unwrap();

    let before = trainer.evaluate(&data).unwrap();
    let reports = trainer.fit(&data).unwrap();
    let after = trainer.evaluate(&data).unwrap();

    for report in reports.iter().step_by(50) {
        eprintln!("  Epoch {:4}: loss = {:.6}", report.epoch, report.mean_loss);
    }
    eprintln!("  Before: {:.6}, after: {:.6}", before, after);

    assert_eq!(reports.len(), 200);
    assert!(after < before, "training should reduce loss");
    assert!(after < 0.05, "final loss too high: {}", after);
}

#[test]
fn test_fit_with_momentum_and_relu() {
    eprintln!("\n=== Fit y = |x| with momentum SGD ===");

    let data = grid(17, -1.0, 1.0, f64::abs);
    let config = TrainConfig {
        learning_rate: 0.01,
        momentum: 0.5,
        epochs: 150,
        ..TrainConfig::default()
    };
    let mut trainer = Trainer::new(seeded(&[1, 8, 1], Activation::Relu, 3), config).unwrap();

    let before = trainer.evaluate(&data).unwrap();
    trainer.fit(&data).unwrap();
    let after = trainer.evaluate(&data).unwrap();
    eprintln!("  Before: {:.6}, after: {:.6}", before, after);

    assert!(after.is_finite());
    assert!(after < before, "training should reduce loss");
}

#[test]
fn test_evaluate_matches_manual_loss() {
    let mut trainer = Trainer::new(affine(2.0, 1.0), TrainConfig::default()).unwrap();
    let data = [Sample::new(0.0, 0.0), Sample::new(1.0, 1.0)];
    // predictions 1 and 3 -> squared errors 1 and 4
    assert_abs_diff_eq!(trainer.evaluate(&data).unwrap(), 2.5, epsilon = 1e-12);
    assert_eq!(trainer.predict(2.0).unwrap(), 5.0);
    assert_eq!(trainer.evaluate(&[]).unwrap(), 0.0);
}

#[test]
fn test_trainer_rejects_wide_output() {
    let mlp = seeded(&[1, 2], Activation::Linear, 0);
    let result = Trainer::new(mlp, TrainConfig::default());
    assert!(matches!(result, Err(NnError::InvalidConfig(_))));
}

// ============================================================================
// Test: Configuration Tags
// ============================================================================

#[test]
fn test_parse_tags() {
    assert_eq!("tanh".parse::<Activation>().unwrap(), Activation::Tanh);
    assert_eq!("mae".parse::<LossKind>().unwrap(), LossKind::MeanAbsoluteError);
    assert!(matches!(
        "swish".parse::<Activation>(),
        Err(NnError::UnknownActivation(_))
    ));
    assert!(matches!(
        "huber".parse::<LossKind>(),
        Err(NnError::UnknownLoss(_))
    ));
}
