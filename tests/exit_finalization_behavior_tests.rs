use motion_chart_rs::core::{BandScale, LinearScale};
use motion_chart_rs::{
    ChartConfig, ChartEngine, DataPoint, Dataset, NodeShape, RecordingRenderer, Viewport,
};

// Two keys fighting over a single visible rank: X leads in 2000, Y in 2001.
fn churn_dataset() -> Dataset {
    Dataset::new(vec![
        DataPoint::new("X", 2000, 9000.0),
        DataPoint::new("Y", 2000, 5000.0),
        DataPoint::new("X", 2001, 4000.0),
        DataPoint::new("Y", 2001, 8000.0),
    ])
}

fn churn_engine() -> ChartEngine<RecordingRenderer> {
    let config = ChartConfig::bar_race("t").with_top_n(1);
    let mut engine =
        ChartEngine::new(RecordingRenderer::new(), config, churn_dataset()).expect("engine init");
    engine
        .mount(Viewport::new(640.0, 400.0), 0)
        .expect("mount");
    engine
}

#[test]
fn exit_is_finalized_once_the_settle_window_elapses() {
    let mut engine = churn_engine();
    engine.advance_to(2001, 1_000).expect("advance");

    let plan = engine.renderer().last_plan().expect("advance plan");
    assert_eq!(plan.op_counts(), (1, 0, 1));
    assert_eq!(plan.exits[0].key, "X");
    assert_eq!(engine.next_deadline(), Some(1_200));

    assert_eq!(engine.run_due_timers(1_199).expect("early pump"), 0);
    assert!(engine.renderer().removed_keys().is_empty());

    assert_eq!(engine.run_due_timers(1_200).expect("due pump"), 1);
    assert_eq!(engine.renderer().removed_keys(), vec!["X"]);
}

#[test]
fn churn_passes_through_the_staging_slot() {
    let mut engine = churn_engine();
    engine.advance_to(2001, 1_000).expect("advance");
    let plan = engine.renderer().last_plan().expect("advance plan");

    // top_n 1 leaves one visible rank; rank 1 is the off-screen staging slot.
    let value = LinearScale::new((0.0, 8000.0), (20.0, 620.0)).rounded();
    let band = BandScale::new(2, (40.0, 400.0), 0.1).rounded();

    let enter = &plan.enters[0];
    assert_eq!(enter.key, "Y");
    assert_eq!(enter.from_opacity, 0.0);
    let NodeShape::Bar { y: enter_from_y, .. } = enter.from else {
        panic!("expected a bar");
    };
    assert_eq!(enter_from_y, band.position(1));

    assert_eq!(plan.exits[0].staging, Some((value.map(0.0), band.position(1))));
}

#[test]
fn reentering_before_finalization_keeps_the_node() {
    let mut engine = churn_engine();
    engine.advance_to(2001, 1_000).expect("advance to 2001");
    engine.advance_to(2000, 1_100).expect("advance back to 2000");

    // X re-entered before its removal fired; only Y may be taken down.
    assert_eq!(engine.run_due_timers(1_200).expect("pump for X"), 1);
    assert!(engine.renderer().removed_keys().is_empty());

    assert_eq!(engine.run_due_timers(1_300).expect("pump for Y"), 1);
    assert_eq!(engine.renderer().removed_keys(), vec!["Y"]);
}

#[test]
fn pausing_does_not_drop_pending_finalizations() {
    let config = ChartConfig::bar_race("t").with_top_n(1).with_autoplay(true);
    let mut engine =
        ChartEngine::new(RecordingRenderer::new(), config, churn_dataset()).expect("engine init");
    engine
        .mount(Viewport::new(640.0, 400.0), 0)
        .expect("mount");

    engine.run_due_timers(200).expect("autoplay advance");
    assert_eq!(engine.current_frame(), Some(2001));
    engine.pause().expect("pause");

    // The advance chain is gone but the faded bar still gets removed.
    assert_eq!(engine.pending_timers(), 1);
    engine.run_due_timers(400).expect("pump finalization");
    assert_eq!(engine.renderer().removed_keys(), vec!["X"]);
}

#[test]
fn finalization_survives_an_interleaved_relayout() {
    let mut engine = churn_engine();
    engine.advance_to(2001, 1_000).expect("advance");
    engine.notify_resize(800.0, 1_050).expect("notify");

    // Relayout at 1100 rebuilds the scene; the removal due at 1200 must
    // still fire for the exited key.
    assert_eq!(engine.run_due_timers(1_100).expect("pump relayout"), 1);
    assert_eq!(engine.run_due_timers(1_200).expect("pump finalization"), 1);
    assert_eq!(engine.renderer().removed_keys(), vec!["X"]);
}

#[test]
fn empty_frame_exits_the_whole_scene() {
    let config = ChartConfig::bar_race("t").with_top_n(5);
    let dataset = Dataset::new(vec![
        DataPoint::new("a", 2000, 9000.0),
        DataPoint::new("b", 2000, 5000.0),
        DataPoint::new("c", 2000, 2000.0),
    ]);
    let mut engine =
        ChartEngine::new(RecordingRenderer::new(), config, dataset).expect("engine init");
    engine
        .mount(Viewport::new(640.0, 400.0), 0)
        .expect("mount");

    engine.advance_to(1995, 1_000).expect("advance to frameless key");
    let plan = engine.renderer().last_plan().expect("plan");
    assert_eq!(plan.op_counts(), (0, 0, 3));

    engine.run_due_timers(1_200).expect("pump finalization");
    let mut removed = engine.renderer().removed_keys();
    removed.sort();
    assert_eq!(removed, vec!["a", "b", "c"]);

    let snapshot = engine.snapshot().expect("snapshot");
    assert!(snapshot.entries.is_empty());
    assert_eq!(snapshot.domains.value, Some((0.0, 9000.0)));
}

#[test]
fn dispose_drops_pending_finalizations() {
    let mut engine = churn_engine();
    engine.advance_to(2001, 1_000).expect("advance");
    assert_eq!(engine.pending_timers(), 1);

    engine.dispose().expect("dispose");
    assert_eq!(engine.run_due_timers(2_000).expect("pump after dispose"), 0);
    // The scene was cleared wholesale; no per-key removal happened.
    assert!(engine.renderer().removed_keys().is_empty());
    assert_eq!(engine.renderer().clears, 1);
}
