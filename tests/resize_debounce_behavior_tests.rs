use motion_chart_rs::{
    ChartConfig, ChartEngine, ChartError, DataPoint, Dataset, RecordingRenderer,
    RESIZE_DEBOUNCE_MS, Viewport,
};

fn race_dataset() -> Dataset {
    Dataset::new(vec![
        DataPoint::new("a", 2000, 9000.0),
        DataPoint::new("b", 2000, 5000.0),
        DataPoint::new("c", 2000, 3000.0),
        DataPoint::new("a", 2001, 4000.0),
        DataPoint::new("b", 2001, 8000.0),
        DataPoint::new("c", 2001, 6000.0),
    ])
}

fn mounted_engine(config: ChartConfig) -> ChartEngine<RecordingRenderer> {
    let mut engine =
        ChartEngine::new(RecordingRenderer::new(), config, race_dataset()).expect("engine init");
    engine
        .mount(Viewport::new(640.0, 400.0), 0)
        .expect("mount");
    engine
}

#[test]
fn relayout_waits_for_the_debounce_window() {
    let mut engine = mounted_engine(ChartConfig::bar_race("t"));
    engine.notify_resize(800.0, 1_000).expect("notify");

    assert_eq!(engine.next_deadline(), Some(1_000 + RESIZE_DEBOUNCE_MS));
    assert_eq!(engine.renderer().plans.len(), 1);
    assert_eq!(engine.viewport(), Some(Viewport::new(640.0, 400.0)));

    assert_eq!(engine.run_due_timers(1_049).expect("early pump"), 0);
    assert_eq!(engine.run_due_timers(1_050).expect("due pump"), 1);
    assert_eq!(engine.viewport(), Some(Viewport::new(800.0, 400.0)));
}

#[test]
fn burst_notifications_coalesce_to_the_last_width() {
    let mut engine = mounted_engine(ChartConfig::bar_race("t"));
    engine.notify_resize(700.0, 0).expect("first notify");
    engine.notify_resize(750.0, 20).expect("second notify");
    engine.notify_resize(800.0, 40).expect("third notify");

    assert_eq!(engine.pending_timers(), 1);
    assert_eq!(engine.next_deadline(), Some(40 + RESIZE_DEBOUNCE_MS));

    engine.run_due_timers(90).expect("pump");
    assert_eq!(engine.viewport(), Some(Viewport::new(800.0, 400.0)));
    // One mount plan plus exactly one relayout for the burst.
    assert_eq!(engine.renderer().plans.len(), 2);
    assert_eq!(engine.renderer().clears, 1);
}

#[test]
fn relayout_rebuilds_the_scene_from_scratch() {
    let mut engine = mounted_engine(ChartConfig::bar_race("t"));
    engine.notify_resize(800.0, 100).expect("notify");
    engine.run_due_timers(150).expect("pump");

    let plan = engine.renderer().last_plan().expect("relayout plan");
    assert!(plan.rebuild);
    assert_eq!(plan.viewport, Viewport::new(800.0, 400.0));
    assert_eq!(plan.op_counts(), (3, 0, 0));
    // Axes snap into place on a rebuild; only the nodes animate.
    assert!(plan.axes.iter().all(|axis| axis.duration_ms == 0));
    assert_eq!(engine.renderer().clears, 1);
    assert_eq!(engine.current_frame(), Some(2000));
}

#[test]
fn unchanged_width_applies_at_most_one_relayout() {
    let mut engine = mounted_engine(ChartConfig::bar_race("t"));

    // Same width as the mount viewport: the timer fires but nothing redraws.
    engine.notify_resize(640.0, 100).expect("notify unchanged");
    assert_eq!(engine.run_due_timers(150).expect("pump"), 1);
    assert_eq!(engine.renderer().plans.len(), 1);
    assert_eq!(engine.renderer().clears, 0);

    engine.notify_resize(800.0, 200).expect("notify changed");
    engine.run_due_timers(250).expect("pump");
    assert_eq!(engine.renderer().plans.len(), 2);

    engine.notify_resize(800.0, 300).expect("notify changed again");
    engine.run_due_timers(350).expect("pump");
    assert_eq!(engine.renderer().plans.len(), 2);
    assert_eq!(engine.renderer().clears, 1);
}

#[test]
fn degenerate_widths_are_rejected_and_recoverable() {
    let mut engine = mounted_engine(ChartConfig::bar_race("t"));

    for width in [0.0, -120.0, f64::NAN] {
        let err = engine
            .notify_resize(width, 100)
            .err()
            .expect("degenerate width should be rejected");
        assert!(matches!(err, ChartError::LayoutUnavailable { .. }));
    }
    assert_eq!(engine.pending_timers(), 0);
    assert_eq!(engine.viewport(), Some(Viewport::new(640.0, 400.0)));

    // The next real measurement goes through.
    engine.notify_resize(720.0, 200).expect("valid notify");
    engine.run_due_timers(250).expect("pump");
    assert_eq!(engine.viewport(), Some(Viewport::new(720.0, 400.0)));
}

#[test]
fn relayout_retires_the_stale_advance_and_rearms() {
    let mut engine = mounted_engine(ChartConfig::bar_race("t").with_autoplay(true));
    assert_eq!(engine.next_deadline(), Some(200));

    engine.notify_resize(800.0, 100).expect("notify");
    engine.run_due_timers(150).expect("pump relayout");

    // The advance scheduled against the old geometry is gone; a fresh one
    // is armed from the relayout instant.
    assert_eq!(engine.pending_timers(), 1);
    assert_eq!(engine.next_deadline(), Some(350));
    assert_eq!(engine.current_frame(), Some(2000));

    engine.run_due_timers(350).expect("pump advance");
    assert_eq!(engine.current_frame(), Some(2001));
    let frames: Vec<i64> = engine.renderer().plans.iter().map(|plan| plan.frame).collect();
    assert_eq!(frames, vec![2000, 2000, 2001]);
}

#[test]
fn height_stays_fixed_across_relayouts() {
    let mut engine = mounted_engine(ChartConfig::bar_race("t").with_height(320.0));
    // The config height wins over the mount viewport height from here on.
    engine.notify_resize(900.0, 0).expect("notify");
    engine.run_due_timers(50).expect("pump");
    assert_eq!(engine.viewport(), Some(Viewport::new(900.0, 320.0)));
}
