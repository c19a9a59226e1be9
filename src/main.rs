// Mixture-of-splines clustering of time-course expression data: simulate a
// labeled dataset, fit the EM model, report the recovered classes, and write
// diagnostic plots.
//
// Build: `cargo run --release`

use rand::rngs::StdRng;
use rand::SeedableRng;
use timefit::*;

/// Fraction of genes whose fitted class agrees with the true labels under the
/// best per-class majority mapping.
fn cluster_purity(true_labels: &[usize], fitted: &[usize], num_classes: usize) -> f64 {
    let mut correct = 0usize;
    for j in 0..num_classes {
        let mut counts = vec![0usize; num_classes];
        for (i, &f) in fitted.iter().enumerate() {
            if f == j {
                counts[true_labels[i]] += 1;
            }
        }
        correct += counts.iter().max().copied().unwrap_or(0);
    }
    correct as f64 / true_labels.len() as f64
}

fn main() {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(42);
    let times: Vec<f64> = linspace(0.0, 48.0, 12).to_vec();
    let num_classes = 3;

    let sim = simulate_classes(&mut rng, 150, &times, num_classes, 0.3);
    println!(
        "Simulated {} genes over {} time points, {} classes",
        sim.dataset.num_genes(),
        sim.dataset.num_time_points(),
        num_classes
    );

    let before = "plots/dataset_true_classes.png";
    plot_dataset_by_class(&sim.dataset, &sim.labels, before);
    println!("Wrote plot: {}", before);

    let config = FitConfig {
        num_classes,
        seed: 42,
        ..FitConfig::default()
    };
    let model = match fit(&sim.dataset, &config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("fit failed: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "EM finished after {} iterations (converged: {}), log-likelihood {:.2}, variance {:.4}",
        model.iterations, model.converged, model.log_likelihood, model.variance
    );

    println!("Final class sizes (nonzero):");
    for (j, c) in model.class_sizes().iter().enumerate() {
        if *c > 0 {
            println!("  class {:02}: {}", j, c);
        }
    }
    println!(
        "Cluster purity vs. simulation labels: {:.3}",
        cluster_purity(&sim.labels, &model.gene_class, num_classes)
    );

    // Continuous queries off the measurement grid for one example gene.
    let gene = 0;
    println!(
        "Gene {} ({}) in class {}:",
        gene, model.gene_names[gene], model.gene_class[gene]
    );
    for t in [6.0, 18.0, 30.0, 42.0] {
        println!("  value at {:5.1}h: {:+.4}", t, model.evaluate(gene, t));
    }

    let after = "plots/dataset_fitted_classes.png";
    plot_dataset_by_class(&sim.dataset, &model.gene_class, after);
    println!("Wrote plot: {}", after);

    let curves = "plots/class_mean_curves.png";
    plot_class_curves(&model, curves);
    println!("Wrote plot: {}", curves);

    let traces = "plots/em_traces.png";
    plot_em_traces(&model.trace, traces);
    println!("Wrote plot: {}", traces);
}
