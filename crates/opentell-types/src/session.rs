use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::thresholds::{ANALYZED_FINGERPRINT_CAP, TOOL_EVENT_BUFFER_CAP};
use crate::tool_event::ToolEvent;

/// Ephemeral per-session structure (spec.md §3). Persisted as
/// `session-buffer.json`, cleared at session-start and session-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBuffer {
    pub session_id: String,
    #[serde(default)]
    pub tool_events: VecDeque<ToolEvent>,
    #[serde(default)]
    pub last_stop_ts: Option<DateTime<Utc>>,
    /// Bounded dedup cache of recently analyzed pair fingerprints.
    #[serde(default)]
    pub analyzed: VecDeque<String>,
}

impl SessionBuffer {
    pub fn new(session_id: impl Into<String>) -> Self {
        SessionBuffer {
            session_id: session_id.into(),
            tool_events: VecDeque::new(),
            last_stop_ts: None,
            analyzed: VecDeque::new(),
        }
    }

    pub fn push_tool_event(&mut self, event: ToolEvent) {
        self.tool_events.push_back(event);
        while self.tool_events.len() > TOOL_EVENT_BUFFER_CAP {
            self.tool_events.pop_front();
        }
    }

    pub fn mark_analyzed(&mut self, fingerprint: String) {
        if self.analyzed.contains(&fingerprint) {
            return;
        }
        self.analyzed.push_back(fingerprint);
        while self.analyzed.len() > ANALYZED_FINGERPRINT_CAP {
            self.analyzed.pop_front();
        }
    }

    pub fn is_analyzed(&self, fingerprint: &str) -> bool {
        self.analyzed.iter().any(|f| f == fingerprint)
    }

    /// Tool events emitted strictly after `last_stop_ts` — the current turn's
    /// events, per spec.md §4.4 / §5 ordering guarantee.
    pub fn events_since_last_stop(&self) -> Vec<&ToolEvent> {
        match self.last_stop_ts {
            Some(ts) => self.tool_events.iter().filter(|e| e.ts > ts).collect(),
            None => self.tool_events.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_event::ToolEventKind;

    #[test]
    fn tool_event_buffer_caps_at_100() {
        let mut buf = SessionBuffer::new("s1");
        for i in 0..150 {
            buf.push_tool_event(ToolEvent {
                ts: Utc::now(),
                kind: ToolEventKind::Bash {
                    command: format!("echo {i}"),
                },
            });
        }
        assert_eq!(buf.tool_events.len(), TOOL_EVENT_BUFFER_CAP);
    }

    #[test]
    fn analyzed_cache_caps_at_200_and_dedups() {
        let mut buf = SessionBuffer::new("s1");
        for i in 0..250 {
            buf.mark_analyzed(format!("fp{i}"));
        }
        assert_eq!(buf.analyzed.len(), ANALYZED_FINGERPRINT_CAP);
        buf.mark_analyzed("fp249".to_string());
        assert_eq!(buf.analyzed.len(), ANALYZED_FINGERPRINT_CAP);
    }
}
