//! asciicast v3 writer and reader
//!
//! Reference: https://docs.asciinema.org/manual/asciicast/v3/
//!
//! The cast renderer only needs a small slice of the format: a header with
//! the terminal size and title, and output events whose times are intervals
//! since the previous event. Parsing is kept so recordings can be checked
//! after they are written.

mod util;

use std::io::{BufRead, BufReader, Write};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub use util::Quantizer;

/// asciicast v3 header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub version: u8,
    pub term: TermInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Header {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            version: 3,
            term: TermInfo {
                cols,
                rows,
                term_type: None,
            },
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = (!title.is_empty()).then_some(title);
        self
    }
}

/// Terminal information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermInfo {
    pub cols: u32,
    pub rows: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub term_type: Option<String>,
}

/// Event type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Data written to the terminal
    Output,
    /// Annotation
    Marker,
}

impl EventType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "o" => Some(EventType::Output),
            "m" => Some(EventType::Marker),
            _ => None,
        }
    }

    pub fn to_code(self) -> &'static str {
        match self {
            EventType::Output => "o",
            EventType::Marker => "m",
        }
    }
}

/// An event in the asciicast file
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Seconds since the previous event
    pub time: f64,
    pub event_type: EventType,
    pub data: String,
}

impl Event {
    pub fn output(time: f64, data: impl Into<String>) -> Self {
        Self {
            time,
            event_type: EventType::Output,
            data: data.into(),
        }
    }

    /// Parse an event from a JSON line
    pub fn from_json(line: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(line).context("Failed to parse event JSON")?;
        let arr = value.as_array().context("Event must be a JSON array")?;
        if arr.len() < 3 {
            bail!("Event array must have at least 3 elements");
        }

        let time = arr[0].as_f64().context("Event time must be a number")?;
        let code = arr[1].as_str().context("Event type must be a string")?;
        let event_type =
            EventType::from_code(code).with_context(|| format!("Unknown event type: {}", code))?;
        let data = arr[2]
            .as_str()
            .context("Event data must be a string")?
            .to_string();

        Ok(Event {
            time,
            event_type,
            data,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&serde_json::json!([
            self.time,
            self.event_type.to_code(),
            self.data
        ]))
        .context("Failed to serialize event")
    }
}

/// Complete asciicast file representation
#[derive(Debug, Clone, PartialEq)]
pub struct AsciicastFile {
    pub header: Header,
    pub events: Vec<Event>,
}

impl AsciicastFile {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Parse an asciicast v3 document from a reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .context("File is empty")?
            .context("Failed to read header line")?;
        let header: Header =
            serde_json::from_str(&header_line).context("Failed to parse header")?;
        if header.version != 3 {
            bail!(
                "Only asciicast v3 format is supported (got version {})",
                header.version
            );
        }

        let mut events = Vec::new();
        for (line_num, line_result) in lines.enumerate() {
            let line =
                line_result.with_context(|| format!("Failed to read line {}", line_num + 2))?;
            if line.trim().is_empty() {
                continue;
            }
            let event = Event::from_json(&line)
                .with_context(|| format!("Failed to parse event on line {}", line_num + 2))?;
            events.push(event);
        }

        Ok(AsciicastFile { header, events })
    }

    pub fn parse_str(content: &str) -> Result<Self> {
        Self::parse_reader(BufReader::new(content.as_bytes()))
    }

    /// Write header and events as newline-delimited JSON
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let header_json =
            serde_json::to_string(&self.header).context("Failed to serialize header")?;
        writeln!(writer, "{}", header_json)?;
        for event in &self.events {
            writeln!(writer, "{}", event.to_json()?)?;
        }
        Ok(())
    }

    pub fn to_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Total playback time in seconds.
    pub fn duration(&self) -> f64 {
        self.events.iter().map(|e| e.time).sum()
    }
}
