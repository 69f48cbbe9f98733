//! Recorded live sessions.
//!
//! A session is an append-only JSONL log of everything the acquisition
//! controller was fed: detections, missed detections, posture samples and
//! host commands. An optional first line `# {header json}` carries metadata.
//! Replaying a session through a fresh controller reproduces its outcomes.

use serde::{Deserialize, Serialize};

use hammertrack_common::error::{HammertrackError, HammertrackResult};

use crate::detection::DetectedPoint;
use crate::posture::PostureSample;

/// Current session schema version.
pub const SESSION_SCHEMA_VERSION: &str = "1.0";

/// Session metadata stored in the `#` header line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at recording start (RFC 3339).
    pub recorded_at: String,

    /// Nominal frame rate of the source stream (Hz).
    pub frame_rate_hz: f64,

    /// Free-form description of the camera or video file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Host commands sent to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Start,
    Stop,
    Reset,
    Acknowledge,
}

/// One line of a recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionRecord {
    /// Detector found the hammer.
    Detection(DetectedPoint),

    /// Detector ran but found nothing.
    Miss {
        #[serde(rename = "frame")]
        frame_number: u64,
    },

    /// Pose estimator output.
    Posture(PostureSample),

    /// Host command.
    Command { command: Command },
}

impl SessionRecord {
    /// Frame the record refers to, if any.
    pub fn frame_number(&self) -> Option<u64> {
        match self {
            SessionRecord::Detection(point) => Some(point.frame_number),
            SessionRecord::Miss { frame_number } => Some(*frame_number),
            SessionRecord::Posture(sample) => Some(sample.frame_number),
            SessionRecord::Command { .. } => None,
        }
    }
}

/// A parsed session file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedSession {
    pub header: Option<SessionHeader>,
    pub records: Vec<SessionRecord>,
}

impl RecordedSession {
    /// Number of detection and miss records (detector attempts).
    pub fn detector_attempts(&self) -> usize {
        self.records
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    SessionRecord::Detection(_) | SessionRecord::Miss { .. }
                )
            })
            .count()
    }
}

/// Parse a session from JSONL content.
///
/// The header is read from the first `#` line if it contains JSON; other
/// comment lines are ignored.
pub fn parse_session(content: &str) -> HammertrackResult<RecordedSession> {
    let mut session = RecordedSession::default();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim();
            if session.header.is_none() && session.records.is_empty() && comment.starts_with('{')
            {
                let header = serde_json::from_str(comment)
                    .map_err(|e| HammertrackError::parse(line_no, format!("bad header: {e}")))?;
                session.header = Some(header);
            }
            continue;
        }
        let record = serde_json::from_str(line)
            .map_err(|e| HammertrackError::parse(line_no, e.to_string()))?;
        session.records.push(record);
    }

    Ok(session)
}

/// Serialize a session to JSONL, header first.
pub fn serialize_session(session: &RecordedSession) -> HammertrackResult<String> {
    let mut output = String::new();
    if let Some(header) = &session.header {
        output.push_str("# ");
        output.push_str(&serde_json::to_string(header)?);
        output.push('\n');
    }
    for record in &session.records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posture::{Joint, Skeleton};

    const SESSION: &str = r#"# {"schema_version":"1.0","recorded_at":"2025-10-21T09:00:00Z","frame_rate_hz":30.0}
{"type":"command","command":"start"}
{"type":"posture","frame":0,"t":0.0,"joints":{"right_wrist":{"x":0.6,"y":0.2,"confidence":0.9}}}
{"type":"detection","frame":3,"t":0.1,"x":0.4,"y":0.5,"confidence":0.8}
{"type":"miss","frame":6}
"#;

    #[test]
    fn test_parse_session_with_header() {
        let session = parse_session(SESSION).unwrap();
        let header = session.header.as_ref().unwrap();
        assert_eq!(header.schema_version, SESSION_SCHEMA_VERSION);
        assert_eq!(header.frame_rate_hz, 30.0);
        assert_eq!(session.records.len(), 4);
        assert_eq!(
            session.records[0],
            SessionRecord::Command {
                command: Command::Start
            }
        );
        match &session.records[2] {
            SessionRecord::Detection(point) => {
                assert_eq!(point.frame_number, 3);
                assert!((point.position.x - 0.4).abs() < 1e-12);
                assert_eq!(point.confidence, 0.8);
            }
            other => panic!("expected detection, got {other:?}"),
        }
        assert_eq!(session.records[3].frame_number(), Some(6));
        assert_eq!(session.detector_attempts(), 2);
    }

    #[test]
    fn test_parse_session_reports_bad_line() {
        let content = "{\"type\":\"command\",\"command\":\"start\"}\n{\"type\":\"teleport\"}\n";
        match parse_session(content) {
            Err(HammertrackError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_serialize_then_parse_preserves_records() {
        let session = RecordedSession {
            header: Some(SessionHeader {
                schema_version: SESSION_SCHEMA_VERSION.to_string(),
                recorded_at: "2025-10-21T09:00:00Z".to_string(),
                frame_rate_hz: 60.0,
                source: Some("ring camera".to_string()),
            }),
            records: vec![
                SessionRecord::Command {
                    command: Command::Start,
                },
                SessionRecord::Posture(PostureSample::new(
                    1,
                    0.016,
                    Skeleton {
                        right_elbow: Some(Joint::new(0.5, 0.3, 0.7)),
                        ..Default::default()
                    },
                )),
                SessionRecord::Detection(DetectedPoint::new(2, 0.033, 0.25, 0.5, 0.5)),
                SessionRecord::Miss { frame_number: 3 },
            ],
        };
        let jsonl = serialize_session(&session).unwrap();
        assert!(jsonl.starts_with("# {"));
        assert_eq!(parse_session(&jsonl).unwrap(), session);
    }
}
