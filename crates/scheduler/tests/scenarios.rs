//! End-to-end scheduling scenarios through the public `Scheduler` facade.
//!
//! Every test drives the clock by hand with `Scheduler::tick` so the
//! outcome is deterministic.

use coresched_core::{CoreCatalog, JobSpec, Priority, SchedulerConfig};
use coresched_scheduler::{Admission, Completion, Scheduler, SchedulerError, StatusSnapshot};

fn scheduler(catalog: &str) -> Scheduler {
    Scheduler::new(CoreCatalog::parse(catalog).unwrap(), SchedulerConfig::default())
}

fn spec(s: &Scheduler, class: &str, priority: u8, work: u32) -> JobSpec {
    JobSpec {
        remaining_work: work,
        priority: Priority::new(priority).unwrap(),
        core_class: s.catalog().lookup(class).unwrap(),
    }
}

fn assert_capacity_conserved(s: &Scheduler, status: &StatusSnapshot) {
    for (class, units) in &status.available_by_class {
        let running = status
            .running
            .iter()
            .filter(|j| j.running_on.as_deref() == Some(class.as_str()))
            .count() as u32;
        assert_eq!(
            units.available + running,
            units.capacity,
            "capacity broken on {}",
            class
        );
    }
    s.check_invariants().unwrap();
}

#[test]
fn scenario_a_urgent_job_preempts() {
    let s = scheduler("4GHz:1:4");
    s.submit_spec("X", spec(&s, "4GHz", 5, 100)).unwrap();
    let y = s.submit_spec("Y", spec(&s, "4GHz", 2, 100)).unwrap();

    let placement = y.admission.placement().unwrap();
    assert!(placement.is_preemption());

    let status = s.status().unwrap();
    assert_eq!(status.running.len(), 1);
    assert_eq!(status.running[0].name, "Y");
    assert_eq!(status.running[0].running_on.as_deref(), Some("4GHz"));
    assert_eq!(status.waiting.len(), 1);
    assert_eq!(status.waiting[0].name, "X");
    assert_capacity_conserved(&s, &status);
}

#[test]
fn scenario_b_completes_after_ceil_work_over_rate() {
    let s = scheduler("5GHz:1:5");
    s.submit_spec("solo", spec(&s, "5GHz", 8, 10)).unwrap();

    s.tick().unwrap();
    assert!(s.status().unwrap().is_running("solo"));

    let report = s.tick().unwrap();
    assert_eq!(report.tick, 2);
    assert_eq!(report.finished.len(), 1);

    let status = s.status().unwrap();
    assert!(!status.is_running("solo"));
    assert_eq!(status.available("5GHz"), Some(1));

    let completed = s.completed().unwrap();
    assert_eq!(completed[0].job.name, "solo");
    assert_eq!(completed[0].outcome, Completion::Finished);
    assert_eq!(completed[0].tick, 2);
}

#[test]
fn scenario_c_overflow_queues_by_priority() {
    let s = scheduler("4GHz:2:4");
    for (i, priority) in [3u8, 5, 7, 9, 11].iter().enumerate() {
        s.submit_spec(&format!("job-{}", i), spec(&s, "4GHz", *priority, 100)).unwrap();
    }

    let status = s.status().unwrap();
    let running: Vec<&str> = status.running.iter().map(|j| j.name.as_str()).collect();
    let waiting: Vec<u8> = status.waiting.iter().map(|j| j.priority).collect();
    assert_eq!(running, vec!["job-0", "job-1"]);
    assert_eq!(waiting, vec![7, 9, 11]);
    assert_capacity_conserved(&s, &status);
}

#[test]
fn completion_timing_matches_rate() {
    for (work, rate, expected) in [(1u32, 4u32, 1u64), (4, 4, 1), (5, 4, 2), (100, 3, 34), (7, 2, 4)] {
        let s = scheduler(&format!("core:1:{}", rate));
        s.submit_spec("job", spec(&s, "core", 1, work)).unwrap();

        let mut ticks = 0;
        while s.status().unwrap().is_running("job") {
            s.tick().unwrap();
            ticks += 1;
        }
        assert_eq!(ticks, expected, "work {} at rate {}", work, rate);
    }
}

#[test]
fn waiting_queue_is_ordered_by_priority_then_work() {
    let s = scheduler("4GHz:1:4");
    s.submit_spec("blocker", spec(&s, "4GHz", 1, 500)).unwrap();
    s.submit_spec("p4-long", spec(&s, "4GHz", 4, 300)).unwrap();
    s.submit_spec("p2", spec(&s, "4GHz", 2, 200)).unwrap();
    s.submit_spec("p4-short", spec(&s, "4GHz", 4, 60)).unwrap();
    s.submit_spec("p9", spec(&s, "4GHz", 9, 50)).unwrap();

    let status = s.status().unwrap();
    let order: Vec<(u8, u32)> = status
        .waiting
        .iter()
        .map(|j| (j.priority, j.remaining_work))
        .collect();
    assert_eq!(order, vec![(2, 200), (4, 60), (4, 300), (9, 50)]);
}

#[test]
fn preempted_job_keeps_its_attributes() {
    let s = scheduler("4GHz:1:4");
    s.submit_spec("victim", spec(&s, "4GHz", 12, 100)).unwrap();
    s.tick().unwrap();
    s.tick().unwrap();
    s.tick().unwrap();

    s.submit_spec("urgent", spec(&s, "4GHz", 3, 100)).unwrap();
    let status = s.status().unwrap();
    let victim = &status.waiting[0];
    assert_eq!(victim.name, "victim");
    assert_eq!(victim.priority, 12);
    assert_eq!(victim.wanted, "4GHz");
    assert_eq!(victim.remaining_work, 88);
}

#[test]
fn equal_priority_never_preempts() {
    let s = scheduler("4GHz:1:4");
    s.submit_spec("first", spec(&s, "4GHz", 6, 100)).unwrap();
    let second = s.submit_spec("second", spec(&s, "4GHz", 6, 10)).unwrap();

    assert_eq!(second.admission, Admission::Queued);
    assert!(s.status().unwrap().is_running("first"));
}

#[test]
fn fallback_runs_on_slower_class_at_its_rate() {
    let s = scheduler("4GHz:1:4,3GHz:1:3,2GHz:1:2");
    s.submit_spec("a", spec(&s, "3GHz", 5, 100)).unwrap();
    let b = s.submit_spec("b", spec(&s, "3GHz", 5, 9)).unwrap();
    assert_eq!(s.catalog().name(b.admission.placement().unwrap().class()), "2GHz");

    // 9 units at rate 2.
    for _ in 0..4 {
        s.tick().unwrap();
    }
    assert!(s.status().unwrap().is_running("b"));
    s.tick().unwrap();
    assert!(!s.status().unwrap().is_running("b"));
}

#[test]
fn termination_is_idempotent() {
    let s = scheduler("4GHz:2:4");
    s.submit_spec("keep", spec(&s, "4GHz", 2, 100)).unwrap();
    s.submit_spec("doomed", spec(&s, "4GHz", 3, 4)).unwrap();
    s.tick().unwrap();

    let before = s.status().unwrap();
    assert!(!s.terminate("doomed").unwrap());
    assert!(!s.terminate("ghost").unwrap());
    let after = s.status().unwrap();
    assert_eq!(before.available_by_class, after.available_by_class);
    assert_eq!(before.running, after.running);

    assert!(s.terminate("keep").unwrap());
    assert!(!s.terminate("keep").unwrap());
    assert_eq!(s.status().unwrap().available("4GHz"), Some(2));
}

#[test]
fn terminated_unit_goes_to_most_urgent_waiter() {
    let s = scheduler("4GHz:1:4");
    s.submit_spec("running", spec(&s, "4GHz", 1, 100)).unwrap();
    s.submit_spec("later", spec(&s, "4GHz", 8, 100)).unwrap();
    s.submit_spec("sooner", spec(&s, "4GHz", 4, 100)).unwrap();

    assert!(s.terminate("running").unwrap());
    let status = s.status().unwrap();
    assert!(status.is_running("sooner"));
    assert!(status.is_waiting("later"));
}

#[test]
fn duplicate_names_are_refused_while_live() {
    let s = scheduler("4GHz:1:4");
    s.submit_spec("job", spec(&s, "4GHz", 1, 100)).unwrap();
    s.submit_spec("queued", spec(&s, "4GHz", 5, 100)).unwrap();

    assert!(matches!(
        s.submit_spec("job", spec(&s, "4GHz", 1, 1)),
        Err(SchedulerError::DuplicateJob(_))
    ));
    assert!(matches!(
        s.submit_spec("queued", spec(&s, "4GHz", 1, 1)),
        Err(SchedulerError::DuplicateJob(_))
    ));
}

#[test]
fn capacity_is_conserved_through_a_long_run() {
    let s = Scheduler::new(
        CoreCatalog::standard(),
        SchedulerConfig {
            seed: Some(42),
            ..SchedulerConfig::default()
        },
    );

    for round in 0..60 {
        for i in 0..3 {
            s.submit(&format!("r{}-{}", round, i)).unwrap();
        }
        if round % 4 == 0 {
            s.terminate(&format!("r{}-0", round / 2)).unwrap();
        }
        s.tick().unwrap();
        assert_capacity_conserved(&s, &s.status().unwrap());
    }

    while !s.status().unwrap().running.is_empty() {
        s.tick().unwrap();
    }
    let status = s.status().unwrap();
    assert!(status.waiting.is_empty());
    assert_eq!(status.completed_count, 180);

    let metrics = s.metrics().unwrap();
    assert_eq!(metrics.completed + metrics.terminated, 180);
}
