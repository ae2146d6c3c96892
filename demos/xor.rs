//! Trains a small network on XOR and prints its predictions.

use mlp::{Activation, Cost, LayerSpec, Network, Topology};

const XOR: [([f64; 2], [f64; 1]); 4] = [
    ([0.0, 0.0], [0.0]),
    ([0.0, 1.0], [1.0]),
    ([1.0, 0.0], [1.0]),
    ([1.0, 1.0], [0.0]),
];

fn main() {
    // Route the network's diagnostics to stderr
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let topology = Topology::new(2, Cost::Quadratic)
        .with_layer(LayerSpec::new(3, Activation::Sigmoid))
        .with_layer(LayerSpec::new(1, Activation::Sigmoid));
    let mut network = Network::new(topology).unwrap();

    for epoch in 0..5000 {
        let mut loss = 0.0;
        for (input, desired) in &XOR {
            loss += network.train(input, desired).unwrap();
        }

        if epoch % 1000 == 0 {
            println!("epoch {}: loss {:.6}", epoch, loss);
        }
    }

    for (input, desired) in &XOR {
        let output = network.predict(input).unwrap();
        println!("{:?} -> {:.4} (expected {})", input, output[0], desired[0]);
    }
}
