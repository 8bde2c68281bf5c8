//! Integration tests for the focus session controller.
//!
//! Drives the controller through whole sessions with a recording tick source
//! and checks rewards, task completion and break routing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use studygarden_core::{
    Config, CoreError, Currency, Event, MemoryStore, Notifier, RewardLedger, SessionPhase,
    StudyGarden, Tick, TickSource, TimerMode, Toggle,
};

#[derive(Debug, Default)]
struct TickLog {
    armed: Option<u64>,
    arms: usize,
    double_arms: usize,
}

/// Tick source that records arm/disarm calls instead of spawning anything.
#[derive(Clone, Default)]
struct RecordingTicks(Arc<Mutex<TickLog>>);

impl TickSource for RecordingTicks {
    fn arm(&mut self, generation: u64) {
        let mut log = self.0.lock().unwrap();
        if log.armed.is_some() {
            log.double_arms += 1;
        }
        log.armed = Some(generation);
        log.arms += 1;
    }

    fn disarm(&mut self) {
        self.0.lock().unwrap().armed = None;
    }
}

#[derive(Clone, Default)]
struct CountingNotifier(Arc<AtomicUsize>);

impl Notifier for CountingNotifier {
    fn countdown_finished(&mut self, _mode: TimerMode) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    app: StudyGarden,
    ticks: RecordingTicks,
    alerts: CountingNotifier,
    store: MemoryStore,
}

fn harness() -> Harness {
    let store = MemoryStore::new();
    let ticks = RecordingTicks::default();
    let alerts = CountingNotifier::default();
    let app = StudyGarden::open(Box::new(store.clone()), &Config::default())
        .unwrap()
        .with_ticks(Box::new(ticks.clone()))
        .with_notifier(Box::new(alerts.clone()));
    Harness {
        app,
        ticks,
        alerts,
        store,
    }
}

/// Tick the armed source until the countdown stops.
fn run_to_expiry(app: &mut StudyGarden) {
    let generation = app.session().generation();
    let mut guard = 0u64;
    while app.session().is_running() {
        app.on_tick(Tick { generation }).unwrap();
        guard += 1;
        assert!(guard <= 24 * 3600, "countdown never expired");
    }
}

#[test]
fn write_report_scenario() {
    let Harness {
        mut app, alerts, ..
    } = harness();
    let task = app.add_task("Write report", 30).unwrap();
    app.select_task(&task.id).unwrap();
    assert_eq!(app.phase(), SessionPhase::Selected);
    assert_eq!(app.session().remaining_secs(), 30 * 60);

    app.start().unwrap();
    assert_eq!(app.phase(), SessionPhase::Running);
    app.drain_events();
    run_to_expiry(&mut app);

    assert!(app.tasks().get(&task.id).unwrap().completed);
    assert_eq!(app.session().completed_focus_count(), 1);
    assert_eq!(app.session().mode(), TimerMode::ShortBreak);
    assert_eq!(app.session().remaining_secs(), 5 * 60);
    assert!(app.session().selected_task_id().is_none());
    assert_eq!(alerts.0.load(Ordering::SeqCst), 1);

    let events = app.drain_events();
    let grants: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::RewardGranted { reward, .. } => Some((reward.currency, reward.amount)),
            _ => None,
        })
        .collect();
    // Session reward (>= 25 min) then task completion reward (>= 30 min).
    assert_eq!(
        grants,
        vec![(Currency::Sunlight, 3), (Currency::Sunlight, 2)]
    );
    assert_eq!(app.ledger().sunlight_points, 5);
    assert_eq!(app.ledger().water_drops, 0);
}

#[test]
fn short_task_session_rewards() {
    let Harness { mut app, .. } = harness();
    let task = app.add_task("Flashcards", 10).unwrap();
    app.select_task(&task.id).unwrap();
    app.start().unwrap();
    run_to_expiry(&mut app);
    assert_eq!(app.ledger().sunlight_points, 2);
    assert_eq!(app.ledger().water_drops, 1);
}

#[test]
fn fourth_focus_session_routes_to_long_break() {
    let Harness { mut app, .. } = harness();
    let mut breaks = Vec::new();
    for (i, minutes) in [1i64, 40, 5, 25].into_iter().enumerate() {
        let task = app.add_task(&format!("task {i}"), minutes).unwrap();
        app.select_task(&task.id).unwrap();
        app.start().unwrap();
        run_to_expiry(&mut app);
        assert_eq!(app.session().completed_focus_count(), i as u32 + 1);
        breaks.push(app.session().mode());

        // Let the break run out so the next focus session starts cleanly.
        app.start().unwrap();
        run_to_expiry(&mut app);
        assert_eq!(app.session().mode(), TimerMode::Focus);
        assert_eq!(app.phase(), SessionPhase::Idle);
    }
    assert_eq!(
        breaks,
        vec![
            TimerMode::ShortBreak,
            TimerMode::ShortBreak,
            TimerMode::ShortBreak,
            TimerMode::LongBreak
        ]
    );
}

#[test]
fn start_without_task_fails_and_leaves_ledger() {
    let Harness { mut app, ticks, .. } = harness();
    let before = *app.ledger();
    assert!(matches!(app.start(), Err(CoreError::NoActiveTask)));
    assert_eq!(*app.ledger(), before);
    assert!(!app.session().is_running());
    assert_eq!(ticks.0.lock().unwrap().arms, 0);
}

#[test]
fn breaks_start_without_a_task() {
    let Harness { mut app, .. } = harness();
    app.switch_mode(TimerMode::LongBreak).unwrap();
    app.start().unwrap();
    assert_eq!(app.phase(), SessionPhase::OnBreak);
    run_to_expiry(&mut app);
    assert_eq!(app.session().mode(), TimerMode::Focus);
    assert_eq!(app.session().remaining_secs(), 25 * 60);
    assert_eq!(app.session().completed_focus_count(), 0);
    assert_eq!(*app.ledger(), RewardLedger::default());
}

#[test]
fn break_end_restores_selected_task_duration() {
    let Harness { mut app, .. } = harness();
    let task = app.add_task("Lab notes", 40).unwrap();
    app.select_task(&task.id).unwrap();
    app.switch_mode(TimerMode::ShortBreak).unwrap();
    app.start().unwrap();
    run_to_expiry(&mut app);
    assert_eq!(app.session().mode(), TimerMode::Focus);
    assert_eq!(app.session().selected_task_id(), Some(task.id.as_str()));
    assert_eq!(app.session().remaining_secs(), 40 * 60);
}

#[test]
fn deleting_selected_task_returns_to_idle() {
    let Harness { mut app, ticks, .. } = harness();
    let task = app.add_task("Slides", 45).unwrap();
    app.select_task(&task.id).unwrap();
    app.start().unwrap();

    assert!(!app.delete_task(&task.id, |_| false).unwrap());
    assert!(app.session().is_running());

    assert!(app.delete_task(&task.id, |t| t.text == "Slides").unwrap());
    assert_eq!(app.phase(), SessionPhase::Idle);
    assert!(app.session().selected_task_id().is_none());
    assert_eq!(app.session().remaining_secs(), 25 * 60);
    assert!(ticks.0.lock().unwrap().armed.is_none());
    assert!(app.tasks().is_empty());
}

#[test]
fn completing_selected_task_clears_selection() {
    let Harness { mut app, .. } = harness();
    let task = app.add_task("Read paper", 50).unwrap();
    app.select_task(&task.id).unwrap();
    assert!(matches!(
        app.complete_task(&task.id).unwrap(),
        Toggle::Completed(_)
    ));
    assert_eq!(app.phase(), SessionPhase::Idle);
    assert_eq!(app.ledger().sunlight_points, 2);

    // Reopening is free and does not reselect.
    assert!(matches!(
        app.complete_task(&task.id).unwrap(),
        Toggle::Reopened(_)
    ));
    assert_eq!(app.ledger().sunlight_points, 2);
    assert!(app.session().selected_task_id().is_none());
}

#[test]
fn completing_selected_task_during_break_returns_to_idle() {
    let Harness { mut app, ticks, .. } = harness();
    let task = app.add_task("Outline", 20).unwrap();
    app.select_task(&task.id).unwrap();
    app.switch_mode(TimerMode::ShortBreak).unwrap();
    app.start().unwrap();
    let generation = app.session().generation();

    app.complete_task(&task.id).unwrap();
    assert!(!app.session().is_running());
    assert_eq!(app.phase(), SessionPhase::Idle);
    assert_eq!(app.session().mode(), TimerMode::Focus);
    assert_eq!(app.session().remaining_secs(), 25 * 60);
    assert!(app.session().selected_task_id().is_none());
    assert!(ticks.0.lock().unwrap().armed.is_none());

    // A tick already queued by the break is dropped.
    app.on_tick(Tick { generation }).unwrap();
    assert_eq!(app.session().remaining_secs(), 25 * 60);
}

#[test]
fn selecting_completed_or_missing_task_is_rejected() {
    let Harness { mut app, .. } = harness();
    let done = app.add_task("Done already", 15).unwrap();
    let open = app.add_task("Still open", 15).unwrap();
    app.complete_task(&done.id).unwrap();
    app.select_task(&open.id).unwrap();

    assert!(matches!(
        app.select_task(&done.id),
        Err(CoreError::InvalidSelection(_))
    ));
    assert_eq!(app.phase(), SessionPhase::Idle);
    assert!(matches!(
        app.select_task("missing"),
        Err(CoreError::InvalidSelection(_))
    ));
    let notices = app
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, Event::Notice { .. }))
        .count();
    assert!(notices >= 2);
}

#[test]
fn restarting_while_running_arms_once() {
    let Harness { mut app, ticks, .. } = harness();
    let task = app.add_task("Essay", 25).unwrap();
    app.select_task(&task.id).unwrap();
    app.start().unwrap();
    app.start().unwrap();
    app.pause().unwrap();
    app.start().unwrap();
    let log = ticks.0.lock().unwrap();
    assert_eq!(log.arms, 2);
    assert_eq!(log.double_arms, 0);
}

#[test]
fn pause_and_reset_drop_queued_ticks() {
    let Harness { mut app, .. } = harness();
    let task = app.add_task("Essay", 25).unwrap();
    app.select_task(&task.id).unwrap();
    app.start().unwrap();
    let generation = app.session().generation();
    app.on_tick(Tick { generation }).unwrap();
    assert_eq!(app.session().remaining_secs(), 25 * 60 - 1);

    app.pause().unwrap();
    app.on_tick(Tick { generation }).unwrap();
    assert_eq!(app.session().remaining_secs(), 25 * 60 - 1);

    app.start().unwrap();
    // A tick from the first run is still stale after resuming.
    app.on_tick(Tick { generation }).unwrap();
    assert_eq!(app.session().remaining_secs(), 25 * 60 - 1);

    app.reset().unwrap();
    assert_eq!(app.session().remaining_secs(), 25 * 60);
    assert!(!app.session().is_running());
}

#[test]
fn switch_mode_keeps_focus_count() {
    let Harness { mut app, .. } = harness();
    let task = app.add_task("Quiz", 5).unwrap();
    app.select_task(&task.id).unwrap();
    app.start().unwrap();
    run_to_expiry(&mut app);
    app.switch_mode(TimerMode::Focus).unwrap();
    app.switch_mode(TimerMode::LongBreak).unwrap();
    assert_eq!(app.session().completed_focus_count(), 1);
    assert_eq!(app.session().remaining_secs(), 15 * 60);
}

#[test]
fn countdown_events_are_mm_ss() {
    let Harness { mut app, .. } = harness();
    app.switch_mode(TimerMode::ShortBreak).unwrap();
    app.start().unwrap();
    app.drain_events();
    let generation = app.session().generation();
    app.on_tick(Tick { generation }).unwrap();
    let events = app.drain_events();
    assert!(matches!(
        &events[..],
        [Event::Countdown { display, .. }] if display == "04:59"
    ));
}

#[test]
fn insufficient_funds_plants_nothing() {
    let Harness { mut app, .. } = harness();
    for i in 0..3 {
        let t = app.add_task(&format!("chore {i}"), 5).unwrap();
        app.complete_task(&t.id).unwrap();
    }
    assert_eq!(app.ledger().water_drops, 3);
    let err = app.spend(Currency::Water, 5).unwrap_err();
    assert!(matches!(err, CoreError::InsufficientFunds { .. }));
    assert_eq!(app.ledger().water_drops, 3);
    assert!(app.garden().items().is_empty());
}

#[test]
fn state_survives_reopen() {
    let Harness {
        mut app, store, ..
    } = harness();
    let keep = app.add_task("Keep me", 35).unwrap();
    let other = app.add_task("Other", 10).unwrap();
    app.complete_task(&other.id).unwrap();
    app.select_task(&keep.id).unwrap();
    app.start().unwrap();
    let generation = app.session().generation();
    app.on_tick(Tick { generation }).unwrap();
    drop(app);

    let app = StudyGarden::open(Box::new(store), &Config::default()).unwrap();
    assert_eq!(app.tasks().len(), 2);
    assert_eq!(app.ledger().water_drops, 1);
    assert_eq!(app.session().selected_task_id(), Some(keep.id.as_str()));
    assert!(!app.session().is_running());
    assert_eq!(app.session().remaining_secs(), 35 * 60 - 1);
}

#[test]
fn first_open_selects_first_active_task() {
    let store = MemoryStore::new();
    let seeded = r#"[
        {"id":"a","text":"Finished","timeAllocated":10,"completed":true},
        {"id":"b","text":"Next up","timeAllocated":45,"completed":false}
    ]"#;
    {
        use studygarden_core::KvStore;
        let mut s = store.clone();
        s.set("tasks", seeded).unwrap();
    }
    let app = StudyGarden::open(Box::new(store), &Config::default()).unwrap();
    assert_eq!(app.session().selected_task_id(), Some("b"));
    assert_eq!(app.session().remaining_secs(), 45 * 60);
    assert_eq!(app.phase(), SessionPhase::Selected);
}

#[test]
fn reopen_drops_selection_of_completed_task() {
    use studygarden_core::KvStore;

    let store = MemoryStore::new();
    {
        let mut s = store.clone();
        s.set(
            "tasks",
            r#"[{"id":"a","text":"Finished","timeAllocated":40,"completed":true}]"#,
        )
        .unwrap();
        s.set(
            "session",
            r#"{"mode":"shortBreak","selectedTaskId":"a","remainingSeconds":100,
                "running":true,"completedFocusCount":2}"#,
        )
        .unwrap();
    }

    let app = StudyGarden::open(Box::new(store.clone()), &Config::default()).unwrap();
    assert_eq!(app.phase(), SessionPhase::Idle);
    assert!(app.session().selected_task_id().is_none());
    assert!(app.active_task().is_none());
    assert_eq!(app.session().mode(), TimerMode::Focus);
    assert_eq!(app.session().remaining_secs(), 25 * 60);
    assert_eq!(app.session().completed_focus_count(), 2);
    assert!(!app.session().is_running());

    let saved = store.raw("session").unwrap();
    assert!(saved.contains(r#""selectedTaskId":null"#), "{saved}");
}

#[test]
fn configured_defaults_drive_durations() {
    let mut config = Config::default();
    config.update("timer.short_break_minutes", "3").unwrap();
    config.update("timer.long_break_every", "2").unwrap();
    let mut app = StudyGarden::open(Box::new(MemoryStore::new()), &config).unwrap();
    for i in 0..2 {
        let t = app.add_task(&format!("t{i}"), 1).unwrap();
        app.select_task(&t.id).unwrap();
        app.start().unwrap();
        run_to_expiry(&mut app);
    }
    assert_eq!(app.session().mode(), TimerMode::LongBreak);
    app.switch_mode(TimerMode::ShortBreak).unwrap();
    assert_eq!(app.session().remaining_secs(), 3 * 60);
}
