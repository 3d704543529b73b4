//! Unit tests for sw-schedule.

#[cfg(test)]
mod registry {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;
    use sw_core::{Tick, ZoneName};

    use crate::{DelayPayload, DelayedTaskRegistry, Resolved, ScheduleError};

    /// Zone stand-in: a log of the payload data each callback saw.
    type Log = Vec<String>;

    fn zones(names: &[&str]) -> BTreeMap<ZoneName, Log> {
        names.iter().map(|n| (ZoneName::new(*n), Log::new())).collect()
    }

    #[test]
    fn fires_once_at_its_tick() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.register_callback("x", move |zone, _, _task, _rearm| {
            assert!(zone.is_found());
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        reg.schedule("x", DelayPayload::new("Z1"), Tick(10)).unwrap();
        reg.seal().unwrap();
        let mut z = zones(&["Z1"]);

        assert_eq!(reg.drain_due(Tick(9), &mut z, &mut ()).unwrap().fired, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(reg.drain_due(Tick(10), &mut z, &mut ()).unwrap().fired, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(reg.drain_due(Tick(11), &mut z, &mut ()).unwrap().fired, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn callback_gets_the_named_zone() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.register_callback("note", |zone, _, task, _| {
            if let Resolved::Zone(log) = zone {
                log.push(task.payload.data["msg"].as_str().unwrap_or_default().to_string());
            }
            Ok(())
        })
        .unwrap();
        reg.schedule("note", DelayPayload::new("Z2").with_data(json!({"msg": "hi"})), Tick(1)).unwrap();
        reg.seal().unwrap();
        let mut z = zones(&["Z1", "Z2"]);
        reg.drain_due(Tick(1), &mut z, &mut ()).unwrap();
        assert!(z[&ZoneName::new("Z1")].is_empty());
        assert_eq!(z[&ZoneName::new("Z2")], vec!["hi".to_string()]);
    }

    #[test]
    fn missing_zone_is_reported_not_fatal() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.register_callback("x", |zone, _, _, _| {
            assert!(matches!(zone, Resolved::NotFound(name) if name.as_str() == "gone"));
            Ok(())
        })
        .unwrap();
        reg.schedule("x", DelayPayload::new("gone"), Tick(0)).unwrap();
        reg.seal().unwrap();
        let report = reg.drain_due(Tick(0), &mut zones(&["Z1"]), &mut ()).unwrap();
        assert_eq!(report.fired, 1);
        assert_eq!(report.missing_zone, 1);
    }

    #[test]
    fn shared_state_is_lent_to_every_callback() {
        let mut reg: DelayedTaskRegistry<Log, Vec<String>> = DelayedTaskRegistry::new();
        reg.register_callback("count", |zone, seen, task, _| {
            let tag = if zone.is_found() { "found" } else { "missing" };
            seen.push(format!("{}:{tag}", task.payload.zone));
            Ok(())
        })
        .unwrap();
        reg.schedule("count", DelayPayload::new("Z1"), Tick(1)).unwrap();
        reg.schedule("count", DelayPayload::new("gone"), Tick(2)).unwrap();
        reg.seal().unwrap();

        let mut seen = Vec::new();
        reg.drain_due(Tick(2), &mut zones(&["Z1"]), &mut seen).unwrap();
        assert_eq!(seen, vec!["Z1:found".to_string(), "gone:missing".to_string()]);
    }

    #[test]
    fn fires_in_tick_then_insertion_order() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.register_callback("tag", |zone, _, task, _| {
            if let Resolved::Zone(log) = zone {
                log.push(task.payload.data.as_str().unwrap_or_default().to_string());
            }
            Ok(())
        })
        .unwrap();
        reg.schedule("tag", DelayPayload::new("Z1").with_data(json!("c")), Tick(5)).unwrap();
        reg.schedule("tag", DelayPayload::new("Z1").with_data(json!("a")), Tick(3)).unwrap();
        reg.schedule("tag", DelayPayload::new("Z1").with_data(json!("b")), Tick(3)).unwrap();
        reg.schedule("tag", DelayPayload::new("Z1").with_data(json!("later")), Tick(9)).unwrap();
        reg.seal().unwrap();
        let mut z = zones(&["Z1"]);
        reg.drain_due(Tick(5), &mut z, &mut ()).unwrap();
        assert_eq!(z[&ZoneName::new("Z1")], vec!["a", "b", "c"]);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.next_fire_at(), Some(Tick(9)));
    }

    #[test]
    fn rearm_never_fires_in_same_drain() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.register_callback("loop", |_, _, task, rearm| {
            // Asking for "now" is clamped to the next tick.
            rearm.repeat(task, 0);
            Ok(())
        })
        .unwrap();
        reg.schedule("loop", DelayPayload::new("Z1"), Tick(2)).unwrap();
        reg.seal().unwrap();
        let mut z = zones(&["Z1"]);

        let report = reg.drain_due(Tick(2), &mut z, &mut ()).unwrap();
        assert_eq!(report.fired, 1);
        assert_eq!(report.rearmed, 1);
        assert_eq!(reg.next_fire_at(), Some(Tick(3)));
        assert_eq!(reg.drain_due(Tick(3), &mut z, &mut ()).unwrap().fired, 1);
    }

    #[test]
    fn failing_callback_is_counted() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.register_callback("bad", |_, _, _, _| Err("boom".into())).unwrap();
        reg.schedule("bad", DelayPayload::new("Z1"), Tick(0)).unwrap();
        reg.seal().unwrap();
        let report = reg.drain_due(Tick(0), &mut zones(&["Z1"]), &mut ()).unwrap();
        assert_eq!(report.failed, 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn registration_closes_at_seal() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.register_callback("a", |_, _, _, _| Ok(())).unwrap();
        assert!(matches!(
            reg.register_callback("a", |_, _, _, _| Ok(())),
            Err(ScheduleError::DuplicateCallback(_))
        ));
        reg.seal().unwrap();
        assert!(matches!(
            reg.register_callback("b", |_, _, _, _| Ok(())),
            Err(ScheduleError::RegistrationClosed(name)) if name == "b"
        ));
    }

    #[test]
    fn seal_rejects_unbound_tasks() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.schedule("orphan", DelayPayload::new("Z1"), Tick(4)).unwrap();
        reg.schedule("orphan", DelayPayload::new("Z1"), Tick(6)).unwrap();
        match reg.seal() {
            Err(ScheduleError::UnboundTasks(names)) => assert_eq!(names, vec!["orphan".to_string()]),
            other => panic!("expected UnboundTasks, got {other:?}"),
        }
        assert!(!reg.is_sealed());
        reg.register_callback("orphan", |_, _, _, _| Ok(())).unwrap();
        reg.seal().unwrap();
    }

    #[test]
    fn unknown_name_after_seal() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        reg.seal().unwrap();
        assert!(matches!(
            reg.schedule("nope", DelayPayload::new("Z1"), Tick(1)),
            Err(ScheduleError::UnknownCallback(_))
        ));
    }

    #[test]
    fn drain_requires_seal() {
        let mut reg: DelayedTaskRegistry<Log> = DelayedTaskRegistry::new();
        assert!(matches!(reg.drain_due(Tick(0), &mut zones(&[]), &mut ()), Err(ScheduleError::NotSealed)));
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use serde_json::{json, Value};
    use sw_core::Tick;

    use crate::{load_delayed_reader, ScheduleError};

    #[test]
    fn parses_rows_in_order() {
        let csv = "name,zone,fire_at,data\n\
                   refill,W1N1,10,\n\
                   resign,W1N1,1500,\"{\"\"text\"\":\"\"outpost\"\"}\"\n";
        let tasks = load_delayed_reader(Cursor::new(csv)).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name, "refill");
        assert_eq!(tasks[0].fire_at, Tick(10));
        assert_eq!(tasks[0].payload.data, Value::Null);
        assert_eq!(tasks[1].payload.zone.as_str(), "W1N1");
        assert_eq!(tasks[1].payload.data, json!({"text": "outpost"}));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let csv = "name,zone,fire_at,data\nx,W1N1,1,{oops\n";
        assert!(matches!(load_delayed_reader(Cursor::new(csv)), Err(ScheduleError::Parse(_))));
    }

    #[test]
    fn bad_tick_is_a_parse_error() {
        let csv = "name,zone,fire_at,data\nx,W1N1,soon,\n";
        assert!(matches!(load_delayed_reader(Cursor::new(csv)), Err(ScheduleError::Parse(_))));
    }
}
