//! Example: Drive a synchronized spectrum + waterfall pair from synthetic
//! frames and save the waterfall as a PNG.
//!
//! Run with:
//!     cargo run --example waterfall_demo [config.json] [output.png]

use std::path::PathBuf;

use anyhow::Context;
use specview::frame::synth::sweep;
use specview::{
    Axis, ChartConfig, ChartView, KeepMode, MarkerLine, RgbaSurface, SpectrumView, SyncGroup,
    WaterfallView,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Specview - Waterfall Demo");
    println!("=========================\n");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ChartConfig::from_path(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => ChartConfig {
            frame_length: 2048,
            cache_count: 300,
            keep_mode: KeepMode::Avg,
            data_freq_range: (0.0, 24_000.0),
            ..ChartConfig::default()
        },
    };
    let output = PathBuf::from(args.next().unwrap_or_else(|| "waterfall_demo.png".to_string()));

    println!("Configuration:");
    println!("  Frame length: {} bins", config.frame_length);
    println!("  History depth: {} frames", config.cache_count);
    println!("  Keep mode: {}", config.keep_mode.name());
    println!(
        "  Frequency range: {} - {} Hz",
        config.data_freq_range.0, config.data_freq_range.1
    );
    println!("  Widget: {}x{}\n", config.width, config.height);

    let mut group: SyncGroup<ChartView> = SyncGroup::new();
    let spectrum = group.connect(SpectrumView::new(&config)?.into());
    let waterfall = group.connect(WaterfallView::new(&config)?.into());

    // Feed a tone sweeping across the band
    let frames = sweep(config.frame_length, config.cache_count, -110.0, -15.0, 20);
    println!("Ingesting {} frames...", frames.len());
    for frame in frames {
        for id in [spectrum, waterfall] {
            match group.member_mut(id) {
                Some(ChartView::Spectrum(view)) => {
                    view.update(frame.clone())?;
                }
                Some(ChartView::Waterfall(view)) => {
                    view.update(frame.clone())?;
                }
                None => {}
            }
        }
    }

    if let Some(ChartView::Spectrum(view)) = group.member_mut(spectrum) {
        view.set_marker_line(MarkerLine::new("threshold", -40.0));
        if let Some((freq, level)) = view.peak_in_view() {
            let name = view.add_marker(freq, None);
            println!("  Peak: {:.1} dB at {:.1} Hz ({})", level, freq, name);
        }
    }

    // Zoom the spectrum into the lower half; the waterfall follows
    let (start, end) = config.data_freq_range;
    let centre = start + (end - start) / 4.0;
    group
        .update(spectrum, |chart| match chart {
            ChartView::Spectrum(view) => view.zoom_around_point(centre, 0.5, Axis::Freq),
            ChartView::Waterfall(view) => view.zoom_around_point(centre, 0.5, Axis::Freq),
        })
        .context("Spectrum chart missing from group")??;

    let Some(ChartView::Waterfall(view)) = group.member(waterfall) else {
        anyhow::bail!("Waterfall chart missing from group");
    };
    let request = view.blit_request();
    let freq = view.viewport().view_space().freq;
    println!("\nWaterfall view: {:.1} - {:.1} Hz", freq.start, freq.end);
    println!(
        "  Blit: {:.1}x{:.1} source px -> {}x{} plot px",
        request.src.width, request.src.height, request.dest.width, request.dest.height
    );

    let mut plot = RgbaSurface::new(request.dest.width, request.dest.height);
    view.render(&mut plot)?;
    let plot_path = output.with_extension("view.png");
    plot.to_image()
        .save(&plot_path)
        .with_context(|| format!("Failed to write {}", plot_path.display()))?;

    view.save_snapshot(&output)?;
    println!("\nSaved:");
    println!("  Full buffer: {}", output.display());
    println!("  Zoomed view: {}", plot_path.display());

    Ok(())
}
