use std::path::Path;

use plotters::prelude::*;

use crate::error::Error;

/// Mean of the first `i + 1` rewards for every episode `i`.
pub fn running_mean(rewards: &[f32]) -> Vec<f64> {
    let mut total = 0.0f64;
    rewards
        .iter()
        .enumerate()
        .map(|(idx, &reward)| {
            total += reward as f64;
            total / (idx + 1) as f64
        })
        .collect()
}

/// Draws the running-mean episode reward against the (1-based) episode index as a PNG.
pub fn render_reward_plot(path: &Path, rewards: &[f32], title: &str) -> Result<(), Error> {
    let means = running_mean(rewards);
    let max_value = means.iter().cloned().fold(0.0_f64, f64::max).max(1.0);
    let episodes = means.len().max(1);

    let root = BitMapBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| Error::Plot(format!("{e}")))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(1..episodes + 1, 0.0f64..max_value * 1.05)
        .map_err(|e| Error::Plot(format!("{e}")))?;

    chart
        .configure_mesh()
        .x_desc("episodes")
        .y_desc("average episode reward")
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()
        .map_err(|e| Error::Plot(format!("{e}")))?;

    chart
        .draw_series(LineSeries::new(
            means.iter().enumerate().map(|(idx, mean)| (idx + 1, *mean)),
            &BLUE,
        ))
        .map_err(|e| Error::Plot(format!("{e}")))?;

    root.present().map_err(|e| Error::Plot(format!("{e}")))?;
    Ok(())
}
