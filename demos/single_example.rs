use backprop::{Activator, Logging, Loss, Network, Parameters, Topology, Trainer};
use ndarray::arr1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ops::ControlFlow;

fn describe(name: &str, network: &Network, input: &backprop::Vector) {
    match network.run(input) {
        Ok(output) => println!("{} prediction: {}", name, output),
        Err(e) => println!("{} prediction failed: {}", name, e),
    }
}

fn main() -> backprop::Result<()> {
    let topology = Topology::from_parts(2, &[5, 5], 2)?;
    let params = Parameters::random(&topology, &mut StdRng::seed_from_u64(1))?;
    let network = Network::with_topology(
        &topology,
        &params,
        Activator::Sigmoid,
        Loss::CrossEntropy,
        0.3,
    )?;
    let target = arr1(&[1.0, 0.0]);

    // Training mutates in place; keep the untrained network around.
    let mut trained = network.clone();
    let report = Trainer::new(&mut trained)
        .epochs(5_000)
        .logging(Logging::Silent)
        .train_with(&params.inputs, &target, |progress| {
            if progress.epoch % 1_000 == 0 {
                println!("epoch {}:\tloss={:.6}", progress.epoch, progress.loss);
            }
            if progress.loss < 1e-3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;

    println!();
    println!(
        "Ran {} epochs{}.",
        report.loss_history.len(),
        if report.interrupted { " (stopped early)" } else { "" }
    );
    describe("Untrained", &network, &params.inputs);
    describe("Trained", &trained, &params.inputs);
    Ok(())
}
