use motion_chart_rs::{
    AxisBounds, ChartConfig, ChartEngine, DataPoint, Dataset, RecordingRenderer, Viewport,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let points: Vec<DataPoint> = (0..60i64)
        .map(|i| {
            let t = i as f64;
            DataPoint::new(format!("sample-{i:02}"), i / 20, t)
                .with_xy(t % 20.0, 8.0 + (t / 4.0).sin() * 6.0)
        })
        .collect();
    let bounds = AxisBounds {
        min_x: Some(0.0),
        max_x: Some(20.0),
        min_y: Some(0.0),
        max_y: Some(16.0),
    };
    let config = ChartConfig::scatter("Sensor sweep")
        .with_bounds(bounds)
        .with_radius(4.0);
    let mut engine = ChartEngine::new(RecordingRenderer::new(), config, Dataset::new(points))?;

    engine.mount(Viewport::new(640.0, 480.0), 0)?;
    engine.advance_to(1, 1_000)?;
    engine.advance_to(2, 2_000)?;

    let plan = engine.renderer().last_plan().ok_or("no plan recorded")?;
    let (enters, updates, exits) = plan.op_counts();
    println!("last advance: enters={enters} updates={updates} exits={exits}");
    println!("{}", engine.snapshot_json_pretty()?);

    Ok(())
}
