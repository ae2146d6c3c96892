//! An example of saving and loading a network to/from a file.

use mlp::Network;

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Weights, biases and learning rules come from the saved XOR network
    let mut network = Network::<f64>::load_file("test_data/xor_v1.json").unwrap();

    println!("inputs: {}", network.num_inputs());
    println!("layers: {}", network.layers().len());

    let output = network.predict(&[1.0, 0.0]).unwrap();
    println!("output before training: {:?}", output);

    for _ in 0..100 {
        network.train(&[1.0, 0.0], &[1.0]).unwrap();
    }

    let output = network.predict(&[1.0, 0.0]).unwrap();
    println!("output after training: {:?}", output);

    // Missing directories are created before writing
    network
        .to_file("test_output/xor_trained.json", true)
        .unwrap();
}
