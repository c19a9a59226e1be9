use plotters::prelude::*;
use std::fs::create_dir_all;

/// Per-iteration EM monitoring: the convergence quantities a caller may want
/// to inspect after the fit, including the iteration-cap case.
#[derive(Clone, Default)]
pub struct EmTrace {
    pub iterations: Vec<usize>,
    pub log_likelihood: Vec<f64>,
    pub ratio: Vec<f64>,
    pub degenerate_genes: Vec<usize>,
    pub occupied_classes: Vec<usize>,
}

impl EmTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        iteration: usize,
        log_likelihood: f64,
        ratio: f64,
        degenerate_genes: usize,
        occupied_classes: usize,
    ) {
        self.iterations.push(iteration);
        self.log_likelihood.push(log_likelihood);
        self.ratio.push(ratio);
        self.degenerate_genes.push(degenerate_genes);
        self.occupied_classes.push(occupied_classes);
    }

    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    let pad = 0.05 * (hi - lo).max(1e-6);
    (lo - pad, hi + pad)
}

/// Plot EM trace plots: log-likelihood, convergence ratio, occupied classes,
/// and degenerate-gene counts over the iterations.
pub fn plot_em_traces(trace: &EmTrace, out_path: &str) {
    if trace.is_empty() {
        return;
    }
    if let Some(parent) = std::path::Path::new(out_path).parent() {
        let _ = create_dir_all(parent);
    }

    let root = BitMapBackend::new(out_path, (1600, 800)).into_drawing_area();
    root.fill(&WHITE).unwrap();
    let areas = root.split_evenly((2, 2));

    let x_start = trace.iterations[0] as f64;
    let x_end = (*trace.iterations.last().unwrap()).max(trace.iterations[0] + 1) as f64;

    // 1. Log-likelihood over the iterations
    let (lo, hi) = padded_range(&trace.log_likelihood);
    let mut chart1 = ChartBuilder::on(&areas[0])
        .margin(15)
        .set_left_and_bottom_label_area_size(60)
        .caption("Log-likelihood", ("sans-serif", 16))
        .build_cartesian_2d(x_start..x_end, lo..hi)
        .unwrap();
    chart1.configure_mesh().x_desc("iteration").draw().unwrap();
    chart1
        .draw_series(LineSeries::new(
            trace
                .iterations
                .iter()
                .zip(trace.log_likelihood.iter())
                .map(|(&i, &v)| (i as f64, v)),
            &BLUE,
        ))
        .unwrap();

    // 2. Convergence ratio with the target line at 1
    let (lo, hi) = padded_range(&trace.ratio);
    let mut chart2 = ChartBuilder::on(&areas[1])
        .margin(15)
        .set_left_and_bottom_label_area_size(60)
        .caption("Likelihood ratio", ("sans-serif", 16))
        .build_cartesian_2d(x_start..x_end, lo.min(0.9)..hi.max(1.1))
        .unwrap();
    chart2.configure_mesh().x_desc("iteration").draw().unwrap();
    chart2
        .draw_series(LineSeries::new(
            trace
                .iterations
                .iter()
                .zip(trace.ratio.iter())
                .map(|(&i, &v)| (i as f64, v)),
            &RED,
        ))
        .unwrap();
    chart2
        .draw_series(LineSeries::new(
            [(x_start, 1.0), (x_end, 1.0)],
            &BLACK.mix(0.4),
        ))
        .unwrap();

    // 3. Occupied classes
    let max_occ = *trace.occupied_classes.iter().max().unwrap() as f64;
    let mut chart3 = ChartBuilder::on(&areas[2])
        .margin(15)
        .set_left_and_bottom_label_area_size(60)
        .caption("Occupied classes", ("sans-serif", 16))
        .build_cartesian_2d(x_start..x_end, 0.0..(max_occ + 2.0))
        .unwrap();
    chart3.configure_mesh().x_desc("iteration").draw().unwrap();
    chart3
        .draw_series(LineSeries::new(
            trace
                .iterations
                .iter()
                .zip(trace.occupied_classes.iter())
                .map(|(&i, &v)| (i as f64, v as f64)),
            &GREEN,
        ))
        .unwrap();

    // 4. Genes that needed the uniform-responsibility fallback
    let max_deg = *trace.degenerate_genes.iter().max().unwrap() as f64;
    let mut chart4 = ChartBuilder::on(&areas[3])
        .margin(15)
        .set_left_and_bottom_label_area_size(60)
        .caption("Degenerate genes", ("sans-serif", 16))
        .build_cartesian_2d(x_start..x_end, 0.0..(max_deg + 1.0))
        .unwrap();
    chart4.configure_mesh().x_desc("iteration").draw().unwrap();
    chart4
        .draw_series(LineSeries::new(
            trace
                .iterations
                .iter()
                .zip(trace.degenerate_genes.iter())
                .map(|(&i, &v)| (i as f64, v as f64)),
            &MAGENTA,
        ))
        .unwrap();

    root.present().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_columns_aligned() {
        let mut trace = EmTrace::new();
        trace.record(1, -120.0, 1.4, 0, 3);
        trace.record(2, -100.0, 0.83, 2, 3);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.iterations, vec![1, 2]);
        assert_eq!(trace.degenerate_genes, vec![0, 2]);
        assert_eq!(trace.occupied_classes, vec![3, 3]);
    }
}
