#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use actors::{EventLog, OfficeResult, run_office};
use post_core::{ActorId, LogLine, OfficeConfig, OfficeEvent, RunReport, ServiceKind};

/// Upper bound for any single simulated day in these tests.
const RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// Run one office day against an in-memory log.
pub async fn run_day(config: OfficeConfig) -> (OfficeResult<RunReport>, Vec<LogLine>) {
    let (log, memory) = EventLog::in_memory();
    let result = tokio::time::timeout(RUN_TIMEOUT, run_office(config, log))
        .await
        .expect("office day deadlocked");
    let lines = memory.lines().expect("log lines parse");
    (result, lines)
}

/// Events of one actor, in log order.
pub fn events_of(lines: &[LogLine], actor: ActorId) -> Vec<OfficeEvent> {
    lines
        .iter()
        .filter(|line| line.actor == Some(actor))
        .map(|line| line.event)
        .collect()
}

/// Number of the first line where `actor` logged `event`.
pub fn seq_of(lines: &[LogLine], actor: ActorId, event: OfficeEvent) -> Option<u64> {
    lines
        .iter()
        .find(|line| line.actor == Some(actor) && line.event == event)
        .map(|line| line.seq)
}

/// Check every property a finished, successful office day must have.
pub fn assert_day_is_consistent(config: &OfficeConfig, report: &RunReport, lines: &[LogLine]) {
    // Gapless, ordered numbering.
    assert_eq!(lines.len() as u64, report.events);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line.seq, i as u64 + 1, "line {} out of order", line);
    }

    // Exactly one closing line, before every worker goes home.
    let closings: Vec<_> = lines.iter().filter(|l| l.actor.is_none()).collect();
    assert_eq!(closings.len(), 1);
    assert_eq!(closings[0].event, OfficeEvent::Closing);
    let closing_seq = closings[0].seq;

    for number in 1..=config.workers {
        let worker = ActorId::worker(number);
        let events = events_of(lines, worker);
        assert_eq!(events.first(), Some(&OfficeEvent::Started), "{worker}");
        assert_eq!(events.last(), Some(&OfficeEvent::GoingHome), "{worker}");
        assert_eq!(
            events.iter().filter(|e| **e == OfficeEvent::Started).count(),
            1
        );
        assert_eq!(
            events.iter().filter(|e| **e == OfficeEvent::GoingHome).count(),
            1
        );

        // Serving and breaks come in pairs.
        let middle = &events[1..events.len() - 1];
        for pair in middle.chunks(2) {
            match pair {
                [OfficeEvent::Serving { .. }, OfficeEvent::ServiceFinished] => {}
                [OfficeEvent::TakingBreak, OfficeEvent::BreakFinished] => {}
                other => panic!("{worker} has unpaired events {other:?}"),
            }
        }

        let home = seq_of(lines, worker, OfficeEvent::GoingHome).unwrap();
        assert!(closing_seq < home, "{worker} went home before closing");
    }

    for number in 1..=config.clients {
        let client = ActorId::client(number);
        match events_of(lines, client).as_slice() {
            [
                OfficeEvent::Started,
                OfficeEvent::Entering { .. },
                OfficeEvent::Called,
                OfficeEvent::GoingHome,
            ] => {}
            [OfficeEvent::Started, OfficeEvent::GoingHome] => {}
            other => panic!("{client} has unexpected events {other:?}"),
        }
    }

    assert!(report.is_balanced(), "{report:?}");
    assert_eq!(report.released_at_close, 0);
    assert_rendezvous_order(lines);
}

/// For every service, the n-th client to be called is preceded by at least
/// n workers serving that service.
pub fn assert_rendezvous_order(lines: &[LogLine]) {
    let mut queue_of: HashMap<ActorId, ServiceKind> = HashMap::new();
    let mut serving: HashMap<ServiceKind, Vec<u64>> = HashMap::new();
    let mut called: HashMap<ServiceKind, Vec<u64>> = HashMap::new();

    for line in lines {
        let Some(actor) = line.actor else { continue };
        match line.event {
            OfficeEvent::Entering { service } => {
                queue_of.insert(actor, service);
            }
            OfficeEvent::Serving { service } => serving.entry(service).or_default().push(line.seq),
            _ => {}
        }
    }
    for line in lines {
        if let (Some(actor), OfficeEvent::Called) = (line.actor, line.event) {
            let service = queue_of[&actor];
            called.entry(service).or_default().push(line.seq);
        }
    }

    for service in ServiceKind::ALL {
        let serving = serving.remove(&service).unwrap_or_default();
        let called = called.remove(&service).unwrap_or_default();
        assert_eq!(serving.len(), called.len(), "service {service}");
        for (served, call) in serving.iter().zip(&called) {
            assert!(served < call, "service {service}: called at {call} before serving");
        }
    }
}
