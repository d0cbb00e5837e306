//! Event types written to the office log.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ServiceKind;

/// Which kind of actor emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Worker,
}

impl Role {
    /// Single-character tag used in log lines.
    pub fn tag(self) -> char {
        match self {
            Role::Client => 'Z',
            Role::Worker => 'U',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'Z' => Some(Role::Client),
            'U' => Some(Role::Worker),
            _ => None,
        }
    }
}

/// Identity of a client or worker. Numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId {
    pub role: Role,
    pub number: u32,
}

impl ActorId {
    pub fn client(number: u32) -> Self {
        Self {
            role: Role::Client,
            number,
        }
    }

    pub fn worker(number: u32) -> Self {
        Self {
            role: Role::Worker,
            number,
        }
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.role.tag(), self.number)
    }
}

/// Everything that can happen in the office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OfficeEvent {
    // Shared by clients and workers
    /// The actor began running.
    Started,
    /// The actor is leaving for good.
    GoingHome,

    // Client events
    /// A client joined the queue for a service.
    Entering { service: ServiceKind },
    /// A client was called to a counter.
    Called,

    // Worker events
    /// A worker committed to serve one client of a service.
    Serving { service: ServiceKind },
    /// A worker finished serving.
    ServiceFinished,
    /// A worker found nobody waiting while the office was open.
    TakingBreak,
    /// A worker came back from a break.
    BreakFinished,

    // Coordinator events
    /// The office stopped admitting clients.
    Closing,
}

impl OfficeEvent {
    fn parse_message(message: &str) -> Option<Self> {
        let service = |number: &str| number.parse().ok().and_then(ServiceKind::from_number);
        let event = match message {
            "started" => OfficeEvent::Started,
            "going home" => OfficeEvent::GoingHome,
            "called by office worker" => OfficeEvent::Called,
            "service finished" => OfficeEvent::ServiceFinished,
            "taking break" => OfficeEvent::TakingBreak,
            "break finished" => OfficeEvent::BreakFinished,
            "closing" => OfficeEvent::Closing,
            other => {
                if let Some(n) = other.strip_prefix("entering office for a service ") {
                    OfficeEvent::Entering {
                        service: service(n)?,
                    }
                } else if let Some(n) = other.strip_prefix("serving a service of type ") {
                    OfficeEvent::Serving {
                        service: service(n)?,
                    }
                } else {
                    return None;
                }
            }
        };
        Some(event)
    }
}

impl std::fmt::Display for OfficeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfficeEvent::Started => write!(f, "started"),
            OfficeEvent::GoingHome => write!(f, "going home"),
            OfficeEvent::Entering { service } => {
                write!(f, "entering office for a service {}", service)
            }
            OfficeEvent::Called => write!(f, "called by office worker"),
            OfficeEvent::Serving { service } => write!(f, "serving a service of type {}", service),
            OfficeEvent::ServiceFinished => write!(f, "service finished"),
            OfficeEvent::TakingBreak => write!(f, "taking break"),
            OfficeEvent::BreakFinished => write!(f, "break finished"),
            OfficeEvent::Closing => write!(f, "closing"),
        }
    }
}

/// One numbered line of the event log.
///
/// Actor lines render as `12: Z 3: going home`; the coordinator has no actor
/// id and renders as `40: closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Position in the global event order, starting at 1.
    pub seq: u64,
    /// Emitting actor, `None` for the coordinator.
    pub actor: Option<ActorId>,
    pub event: OfficeEvent,
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.actor {
            Some(actor) => write!(f, "{}: {}: {}", self.seq, actor, self.event),
            None => write!(f, "{}: {}", self.seq, self.event),
        }
    }
}

/// A log line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineParseError {
    #[error("Missing sequence number in '{0}'")]
    MissingSeq(String),
    #[error("Malformed actor id in '{0}'")]
    BadActor(String),
    #[error("Unknown event in '{0}'")]
    UnknownEvent(String),
}

impl FromStr for LogLine {
    type Err = LineParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end();
        let (seq, rest) = line
            .split_once(": ")
            .ok_or_else(|| LineParseError::MissingSeq(line.to_string()))?;
        let seq = seq
            .parse()
            .map_err(|_| LineParseError::MissingSeq(line.to_string()))?;

        let (actor, message) = match rest.split_once(": ") {
            Some((actor, message)) => (Some(parse_actor(actor, line)?), message),
            None => (None, rest),
        };

        let event = OfficeEvent::parse_message(message)
            .ok_or_else(|| LineParseError::UnknownEvent(line.to_string()))?;

        Ok(Self { seq, actor, event })
    }
}

fn parse_actor(text: &str, line: &str) -> Result<ActorId, LineParseError> {
    let bad = || LineParseError::BadActor(line.to_string());
    let (tag, number) = text.split_once(' ').ok_or_else(bad)?;
    let mut chars = tag.chars();
    let role = match (chars.next(), chars.next()) {
        (Some(c), None) => Role::from_tag(c).ok_or_else(bad)?,
        _ => return Err(bad()),
    };
    let number = number.parse().map_err(|_| bad())?;
    Ok(ActorId { role, number })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_actor_and_coordinator_lines() {
        let line = LogLine {
            seq: 7,
            actor: Some(ActorId::client(3)),
            event: OfficeEvent::Entering {
                service: ServiceKind::Parcels,
            },
        };
        assert_eq!(line.to_string(), "7: Z 3: entering office for a service 2");

        let closing = LogLine {
            seq: 12,
            actor: None,
            event: OfficeEvent::Closing,
        };
        assert_eq!(closing.to_string(), "12: closing");
    }

    #[test]
    fn parses_every_worker_message() {
        let lines = [
            "1: U 1: started",
            "2: U 1: serving a service of type 3",
            "3: U 1: service finished",
            "4: U 1: taking break",
            "5: U 1: break finished",
            "6: U 1: going home",
        ];
        for text in lines {
            let parsed: LogLine = text.parse().unwrap();
            assert_eq!(parsed.actor, Some(ActorId::worker(1)));
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn parses_closing_line() {
        let parsed: LogLine = "40: closing\n".parse().unwrap();
        assert_eq!(parsed.seq, 40);
        assert_eq!(parsed.actor, None);
        assert_eq!(parsed.event, OfficeEvent::Closing);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(
            "x: Z 1: started".parse::<LogLine>(),
            Err(LineParseError::MissingSeq(_))
        ));
        assert!(matches!(
            "1: Q 1: started".parse::<LogLine>(),
            Err(LineParseError::BadActor(_))
        ));
        assert!(matches!(
            "1: Z 1: dancing".parse::<LogLine>(),
            Err(LineParseError::UnknownEvent(_))
        ));
        assert!(matches!(
            "1: Z 1: entering office for a service 4".parse::<LogLine>(),
            Err(LineParseError::UnknownEvent(_))
        ));
    }
}
