use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::AnalysisResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateEvent {
    Progress {
        #[serde(default)]
        message: String,
    },
    BatchComplete {
        #[serde(default, rename = "batchIndex")]
        batch_index: u32,
        #[serde(default, rename = "totalBatches")]
        total_batches: u32,
        #[serde(default)]
        data: AnalysisResult,
    },
    AnalysisComplete {
        #[serde(default)]
        data: AnalysisResult,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}

impl UpdateEvent {
    pub fn data(&self) -> Option<&AnalysisResult> {
        match self {
            Self::BatchComplete { data, .. } | Self::AnalysisComplete { data } => Some(data),
            Self::Progress { .. } | Self::Error { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::BatchComplete { .. } => "batch_complete",
            Self::AnalysisComplete { .. } => "analysis_complete",
            Self::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read event stream: {0}")]
    Io(#[from] io::Error),

    #[error("malformed event on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes one line of the stream. Blank lines and SSE comments yield `None`;
/// an optional SSE `data:` prefix is accepted.
pub fn parse_event_line(line: &str, line_number: usize) -> Result<Option<UpdateEvent>, IngestError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return Ok(None);
    }

    let payload = trimmed
        .strip_prefix("data:")
        .map(str::trim_start)
        .unwrap_or(trimmed);
    serde_json::from_str(payload)
        .map(Some)
        .map_err(|source| IngestError::Json {
            line: line_number,
            source,
        })
}

pub struct EventReader<R> {
    lines: io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<UpdateEvent, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(error) => return Some(Err(error.into())),
            };
            self.line_number += 1;

            match parse_event_line(&line, self.line_number) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(error) => return Some(Err(error)),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventSource {
    Stdin,
    File(PathBuf),
}

impl EventSource {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        match self {
            Self::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            Self::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open event stream {}", path.display()))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReplayMessage {
    Event(UpdateEvent),
    Finished,
    Failed(String),
}

pub fn replay_into<R: BufRead>(reader: R, interval: Duration, tx: &Sender<ReplayMessage>) -> Result<()> {
    let mut delivered = 0usize;
    let mut skipped = 0usize;

    for item in EventReader::new(reader) {
        let event = match item {
            Ok(event) => event,
            Err(IngestError::Json { line, source }) => {
                warn!(line, error = %source, "skipping malformed event");
                skipped += 1;
                continue;
            }
            Err(error) => return Err(error).context("event stream interrupted"),
        };

        if event.data().is_some() && !interval.is_zero() {
            thread::sleep(interval);
        }
        if tx.send(ReplayMessage::Event(event)).is_err() {
            info!(delivered, "replay receiver dropped, stopping");
            return Ok(());
        }
        delivered += 1;
    }

    info!(delivered, skipped, "event stream finished");
    Ok(())
}

pub fn spawn_replay(source: EventSource, interval: Duration) -> Receiver<ReplayMessage> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = source
            .open()
            .and_then(|reader| replay_into(reader, interval, &tx));
        let message = match result {
            Ok(()) => ReplayMessage::Finished,
            Err(error) => {
                warn!(source = %source.label(), error = %format!("{error:#}"), "replay failed");
                ReplayMessage::Failed(format!("{error:#}"))
            }
        };
        let _ = tx.send(message);
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharacterRecord, InteractionRecord};

    #[test]
    fn decodes_every_event_kind() {
        let progress = parse_event_line(r#"{"type":"progress","message":"chapter 3"}"#, 1)
            .unwrap()
            .unwrap();
        assert_eq!(progress, UpdateEvent::Progress { message: "chapter 3".to_owned() });

        let batch = parse_event_line(
            r#"{"type":"batch_complete","batchIndex":2,"totalBatches":5,"data":{"characters":[{"name":"Alice","mentions":10,"description":"curious"}],"interactions":[{"source":"Alice","target":"Bob","weight":5,"contexts":["tea party"]}]}}"#,
            2,
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            batch,
            UpdateEvent::BatchComplete {
                batch_index: 2,
                total_batches: 5,
                data: AnalysisResult::new(
                    vec![CharacterRecord::new("Alice", 10).with_description("curious")],
                    vec![InteractionRecord::new("Alice", "Bob", 5).with_context("tea party")],
                ),
            }
        );

        let complete = parse_event_line(
            r#"{"type":"analysis_complete","data":{"characters":[],"interactions":[]}}"#,
            3,
        )
        .unwrap()
        .unwrap();
        assert_eq!(complete.kind(), "analysis_complete");
        assert!(complete.data().is_some());

        let error = parse_event_line(r#"{"type":"error","message":"quota"}"#, 4)
            .unwrap()
            .unwrap();
        assert_eq!(error, UpdateEvent::Error { message: "quota".to_owned() });
        assert!(error.data().is_none());
    }

    #[test]
    fn missing_data_decodes_as_incomplete_snapshot() {
        let event = parse_event_line(r#"{"type":"batch_complete","batchIndex":1,"totalBatches":2}"#, 1)
            .unwrap()
            .unwrap();
        let data = event.data().unwrap();
        assert!(data.characters.is_none());
        assert!(data.interactions.is_none());
    }

    #[test]
    fn null_contexts_keep_the_batch() {
        let event = parse_event_line(
            r#"{"type":"batch_complete","batchIndex":1,"totalBatches":1,"data":{"characters":[{"name":"Alice","mentions":3,"description":null}],"interactions":[{"source":"Alice","target":"Bob","weight":2,"contexts":null}]}}"#,
            1,
        )
        .unwrap()
        .unwrap();
        let data = event.data().unwrap();
        assert_eq!(data.characters.as_ref().map(Vec::len), Some(1));
        assert_eq!(data.interactions.as_ref().unwrap()[0].contexts, Vec::<String>::new());
    }

    #[test]
    fn accepts_sse_framing_and_skips_blank_lines() {
        assert_eq!(parse_event_line("", 1).unwrap(), None);
        assert_eq!(parse_event_line(": keep-alive", 2).unwrap(), None);
        let event = parse_event_line(r#"data: {"type":"progress","message":"hi"}"#, 3)
            .unwrap()
            .unwrap();
        assert_eq!(event.kind(), "progress");
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let error = parse_event_line(r#"{"type":"unknown"}"#, 7).unwrap_err();
        assert!(matches!(error, IngestError::Json { line: 7, .. }));
        assert!(error.to_string().contains("line 7"));
    }

    #[test]
    fn replay_skips_bad_lines_and_keeps_order() {
        let stream = concat!(
            "{\"type\":\"progress\",\"message\":\"start\"}\n",
            "not json\n",
            "\n",
            "{\"type\":\"error\",\"message\":\"boom\"}\n",
        );
        let (tx, rx) = mpsc::channel();
        replay_into(stream.as_bytes(), Duration::ZERO, &tx).unwrap();
        drop(tx);

        let kinds = rx
            .iter()
            .map(|message| match message {
                ReplayMessage::Event(event) => event.kind(),
                other => panic!("unexpected {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(kinds, ["progress", "error"]);
    }

    #[test]
    fn replay_stops_when_receiver_hangs_up() {
        let stream = "{\"type\":\"progress\",\"message\":\"a\"}\n{\"type\":\"progress\",\"message\":\"b\"}\n";
        let (tx, rx) = mpsc::channel();
        drop(rx);
        assert!(replay_into(stream.as_bytes(), Duration::ZERO, &tx).is_ok());
    }

    #[test]
    fn source_from_arg() {
        assert_eq!(EventSource::from_arg("-"), EventSource::Stdin);
        assert_eq!(
            EventSource::from_arg("run.jsonl"),
            EventSource::File(PathBuf::from("run.jsonl"))
        );
    }
}
