use std::{
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};

use chrono::NaiveTime;
use roosty_alarms::{
    audio::AudioPlayer,
    notify::{dispatch, AudioSink},
    AlarmError, AlarmRegistry, AlarmState, FixedClock, NotifyError, Scheduler, TickDriver,
};

fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

fn scheduler(now: NaiveTime, audio_dir: &str) -> Scheduler<FixedClock> {
    let audio_dir = PathBuf::from(audio_dir);
    Scheduler::new(
        FixedClock::new(now),
        AlarmRegistry::new(3, move |i| audio_dir.join(format!("audio{}.mp3", i + 1))),
    )
}

#[test]
fn alarm_five_seconds_out_fires_on_third_pass() {
    let mut scheduler = scheduler(hms(9, 0, 0), "audio");
    let mut driver = TickDriver::new(Duration::from_secs(2));
    scheduler.arm(0, hms(9, 0, 5)).unwrap();

    let start = Instant::now();
    driver.request_now(start);
    let mut reports = Vec::new();
    for pass in 0..3u32 {
        let at = start + Duration::from_secs(u64::from(pass) * 3);
        assert!(driver.should_tick(at));
        let report = scheduler.run_once();
        driver.schedule(&report, at);
        reports.push(report);
        scheduler.clock().advance(3);
    }

    assert!(reports[0].still_pending && reports[0].events.is_empty());
    assert!(reports[1].still_pending && reports[1].events.is_empty());
    assert_eq!(reports[2].events.len(), 1);
    assert_eq!(reports[2].events[0].index, 0);
    assert_eq!(reports[2].events[0].fired_at_display_time, hms(9, 0, 5));
    assert!(!reports[2].still_pending);
    assert!(driver.is_idle());
}

#[test]
fn arming_one_second_ago_is_rejected() {
    let mut scheduler = scheduler(hms(9, 0, 0), "audio");
    let err = scheduler.arm(1, hms(8, 59, 59)).unwrap_err();
    assert!(matches!(err, AlarmError::RejectedPastTime { index: 1, .. }));
    assert_eq!(scheduler.registry().get(1).unwrap().state(), AlarmState::Idle);
    assert!(!scheduler.run_once().still_pending);
}

#[test]
fn rearming_before_firing_replaces_the_time() {
    let mut scheduler = scheduler(hms(9, 0, 0), "audio");
    scheduler.arm(2, hms(9, 0, 4)).unwrap();
    scheduler.arm(2, hms(9, 0, 10)).unwrap();

    scheduler.clock().advance(5);
    let report = scheduler.run_once();
    assert!(report.events.is_empty());
    assert!(report.still_pending);

    scheduler.clock().advance(5);
    let report = scheduler.run_once();
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].fired_at_display_time, hms(9, 0, 10));
}

#[test]
fn simultaneous_alarms_fire_in_index_order_once() {
    let mut scheduler = scheduler(hms(9, 0, 0), "audio");
    for index in [2, 0, 1] {
        scheduler.arm(index, hms(9, 0, 2)).unwrap();
    }
    scheduler.clock().advance(2);
    let indices: Vec<_> = scheduler.run_once().events.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    for _ in 0..3 {
        scheduler.clock().advance(2);
        assert!(scheduler.run_once().events.is_empty());
    }
}

#[test]
fn missing_sound_does_not_stop_other_alarms() {
    let mut scheduler = scheduler(hms(9, 0, 0), "/nonexistent/roosty_alarms");
    scheduler.arm(0, hms(9, 0, 1)).unwrap();
    scheduler.arm(1, hms(9, 0, 1)).unwrap();
    scheduler.clock().advance(1);

    let report = scheduler.run_once();
    let (tx, _rx) = mpsc::channel();
    let mut sink = AudioSink::new(AudioPlayer::with_channel(tx), 100.0);
    let errors = dispatch(&report.events, &mut sink);

    assert_eq!(report.events.len(), 2);
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, NotifyError::MissingSoundResource { .. })));
    for index in 0..2 {
        assert!(scheduler.registry().get(index).unwrap().is_fired());
    }
    assert!(!report.still_pending);
}

#[test]
fn out_of_range_index() {
    let mut scheduler = scheduler(hms(9, 0, 0), "audio");
    assert_eq!(
        scheduler.arm(3, hms(10, 0, 0)),
        Err(AlarmError::IndexOutOfRange { index: 3, count: 3 })
    );
}
