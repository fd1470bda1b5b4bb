//! Session summaries exported as JSON for CI artifacts.

use crate::recorder::EventRecord;
use anyhow::Result;
use raydesk_interaction::{FrameReport, PointerOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Overall session verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionResult {
    /// Script played to the end.
    Pass,
    /// Script stopped early.
    Fail,
}

/// Per-pointer frame outcome tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Frames where the ray reached an overlay.
    pub hits: u64,
    /// Frames spent carrying an overlay.
    pub grabbing: u64,
    /// Frames claimed by a custom interaction.
    pub custom: u64,
    /// Frames where nothing happened.
    pub misses: u64,
}

impl OutcomeCounts {
    fn add(&mut self, outcome: PointerOutcome) {
        match outcome {
            PointerOutcome::Hit { .. } => self.hits += 1,
            PointerOutcome::Grabbing { .. } => self.grabbing += 1,
            PointerOutcome::Custom => self.custom += 1,
            PointerOutcome::Miss => self.misses += 1,
        }
    }
}

/// Summary of a headless session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Session identifier (script name).
    pub session: String,
    /// When the report was created (ISO 8601).
    pub timestamp: String,
    /// Frames simulated.
    pub frames: u64,
    /// Verdict.
    pub result: SessionResult,
    /// Left pointer outcomes.
    pub left: OutcomeCounts,
    /// Right pointer outcomes.
    pub right: OutcomeCounts,
    /// Overlay event counts by kind.
    pub events: BTreeMap<String, usize>,
}

impl SessionReport {
    /// Empty passing report stamped with the current time.
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            frames: 0,
            result: SessionResult::Pass,
            left: OutcomeCounts::default(),
            right: OutcomeCounts::default(),
            events: BTreeMap::new(),
        }
    }

    /// Tally one engine frame.
    pub fn record_frame(&mut self, report: &FrameReport) {
        self.frames = self.frames.max(report.frame);
        self.left.add(report.outcomes[0]);
        self.right.add(report.outcomes[1]);
    }

    /// Tally overlay events.
    pub fn record_events<'a>(&mut self, records: impl IntoIterator<Item = &'a EventRecord>) {
        for record in records {
            *self
                .events
                .entry(record.event.kind().to_string())
                .or_default() += 1;
        }
    }

    /// Count of events of `kind`.
    pub fn event_count(&self, kind: &str) -> usize {
        self.events.get(kind).copied().unwrap_or(0)
    }

    /// Persist as pretty JSON, creating parent dirs if needed.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::OverlayEvent;
    use raydesk_input::Hand;

    #[test]
    fn tallies_frames_and_events() {
        let mut report = SessionReport::new("unit");
        report.record_frame(&FrameReport {
            frame: 3,
            outcomes: [PointerOutcome::Custom, PointerOutcome::Miss],
        });
        report.record_events(&[
            EventRecord {
                frame: 3,
                overlay: "a".into(),
                event: OverlayEvent::Left { hand: Hand::Right },
            },
            EventRecord {
                frame: 3,
                overlay: "b".into(),
                event: OverlayEvent::Left { hand: Hand::Left },
            },
        ]);

        assert_eq!(report.frames, 3);
        assert_eq!(report.left.custom, 1);
        assert_eq!(report.right.misses, 1);
        assert_eq!(report.event_count("left"), 2);
        assert_eq!(report.event_count("hover"), 0);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"result\":\"pass\""));
    }
}
