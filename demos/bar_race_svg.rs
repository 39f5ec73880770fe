use motion_chart_rs::{ChartConfig, ChartEngine, Dataset, SvgRenderer, Viewport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dataset = Dataset::from_json_str(include_str!("population.json"))?;
    let config = ChartConfig::bar_race("Largest cities in Lebanon")
        .with_top_n(5)
        .with_label_divisor(1_000_000.0)
        .with_label_precision(2)
        .with_autoplay(true);
    let mut engine = ChartEngine::new(SvgRenderer::new(), config, dataset)?;

    let first = engine.mount(Viewport::new(800.0, 400.0), 0)?;
    eprintln!("mounted at frame {first}");

    // Drain the autoplay chain by jumping the clock to each deadline.
    let mut fired = 0usize;
    while let Some(deadline) = engine.next_deadline() {
        fired += engine.run_due_timers(deadline)?;
    }
    eprintln!(
        "timers fired: {fired}, final frame: {:?}",
        engine.current_frame()
    );

    println!("{}", engine.renderer_mut().document()?);
    Ok(())
}
