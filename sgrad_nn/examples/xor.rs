//! XOR problem training example.
//!
//! Demonstrates training a simple MLP to learn the XOR function.
//! XOR is a classic non-linearly separable problem that requires hidden layers.
//!
//! The trainer only handles single-input networks, so this example runs the
//! zero-grad, forward, loss, backward, step sequence by hand.

use sgrad_nn::{mse_loss, Activation, Mlp, NetworkConfig, Sgd};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // XOR dataset
    let inputs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    let targets = [0.0, 1.0, 1.0, 0.0];

    // 2 -> 8 -> 1, tanh hidden, sigmoid output
    let config = NetworkConfig::builder()
        .layer_sizes([2, 8, 1])
        .hidden_activation(Activation::Tanh)
        .output_activation(Activation::Sigmoid)
        .seed(1)
        .build()?;
    let mut mlp = Mlp::new(&config)?;
    let params = mlp.parameters();

    let mut opt = Sgd::with_momentum(0.5, 0.9);

    println!("Training XOR network ({} parameters)...\n", params.len());

    for epoch in 0..2000 {
        let mut total_loss = 0.0;

        for (input, &target) in inputs.iter().zip(targets.iter()) {
            opt.zero_grad(&params);

            let pred = mlp.forward_scalar(input)?.remove(0);
            let loss = mse_loss(&pred, target);
            total_loss += loss.value();

            loss.backward();
            opt.step(&params);
        }

        if epoch % 200 == 0 || epoch == 1999 {
            println!("Epoch {:4}: avg loss = {:.6}", epoch, total_loss / 4.0);
        }
    }

    // Test the trained network
    println!("\nTesting trained network:");
    println!("========================");

    let mut correct = 0;
    for (input, &target) in inputs.iter().zip(targets.iter()) {
        let output = mlp.forward_scalar(input)?[0].value();
        println!(
            "Input: [{:.0}, {:.0}] -> Output: {:.4} (target: {:.0})",
            input[0], input[1], output, target
        );

        let predicted_class = if output > 0.5 { 1.0 } else { 0.0 };
        if predicted_class == target {
            correct += 1;
        }
    }

    println!("\nAccuracy: {}/4", correct);
    if correct == 4 {
        println!("Successfully learned XOR!");
    }
    Ok(())
}
