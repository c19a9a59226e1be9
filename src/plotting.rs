use plotters::prelude::*;
use plotters::style::Palette99;
use std::fs::create_dir_all;

use crate::data_structures::TimeSeriesDataset;
use crate::fit::TimeFit;
use crate::utils::linspace;

fn y_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
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

/// Plot every gene's observed time course, colored by class label.
pub fn plot_dataset_by_class(ds: &TimeSeriesDataset, labels: &[usize], out_path: &str) {
    if let Some(parent) = std::path::Path::new(out_path).parent() {
        let _ = create_dir_all(parent);
    }

    let times = ds.times();
    let n = ds.num_time_points();
    let (y_min, y_max) = y_range(ds.y.iter().copied());

    let root = BitMapBackend::new(out_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE).unwrap();

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .set_left_and_bottom_label_area_size(40)
        .caption(
            format!("{} genes by class", ds.num_genes()),
            ("sans-serif", 18),
        )
        .build_cartesian_2d(times[0]..times[n - 1], y_min..y_max)
        .unwrap();
    chart
        .configure_mesh()
        .x_desc("t")
        .y_desc("signal")
        .label_style(("sans-serif", 12))
        .draw()
        .unwrap();

    for (i, &label) in labels.iter().enumerate() {
        let color = Palette99::pick(label).mix(0.6);
        chart
            .draw_series(LineSeries::new(
                (0..n).map(|t| (times[t], ds.y[(t, i)])),
                color.stroke_width(1),
            ))
            .unwrap();
    }

    root.present().unwrap();
}

/// Plot the fitted class-mean curves, sampled densely over the time domain.
pub fn plot_class_curves(model: &TimeFit, out_path: &str) {
    if let Some(parent) = std::path::Path::new(out_path).parent() {
        let _ = create_dir_all(parent);
    }

    let first = model.basis.control_points[0];
    let last = model.basis.control_points[model.basis.q() - 1];
    let ts = linspace(first, last, 200);

    let curves: Vec<Vec<(f64, f64)>> = (0..model.num_classes())
        .map(|j| {
            let curve = model.class_curve(j);
            ts.iter().map(|&t| (t, curve.evaluate(t))).collect()
        })
        .collect();
    let (y_min, y_max) = y_range(curves.iter().flatten().map(|&(_, v)| v));

    let root = BitMapBackend::new(out_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE).unwrap();

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .set_left_and_bottom_label_area_size(40)
        .caption("Fitted class-mean curves", ("sans-serif", 18))
        .build_cartesian_2d(first..last, y_min..y_max)
        .unwrap();
    chart
        .configure_mesh()
        .x_desc("t")
        .y_desc("signal")
        .label_style(("sans-serif", 12))
        .draw()
        .unwrap();

    let sizes = model.class_sizes();
    for (j, pts) in curves.into_iter().enumerate() {
        let color = Palette99::pick(j);
        chart
            .draw_series(LineSeries::new(pts, color.stroke_width(3)))
            .unwrap()
            .label(format!("class {} ({} genes)", j, sizes[j]))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], Palette99::pick(j).stroke_width(3))
            });
    }
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .unwrap();

    root.present().unwrap();
}
