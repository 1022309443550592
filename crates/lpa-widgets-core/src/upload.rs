//! Upload scan progress
//!
//! `UploadSession` turns stream messages and cancel clicks into a list of
//! effects for the DOM layer to apply. Once a terminal effect has been emitted
//! the session ignores everything else, so each hidden form is submitted at
//! most once.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::WidgetError;

/// One server-push message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMessage {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub scanned_count: Option<u32>,
    #[serde(default)]
    pub finished_scanning: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub close_connection: bool,
}

impl ScanMessage {
    /// Validate and decode a message payload
    pub fn decode(raw: &str) -> Result<Self, WidgetError> {
        serde_json::from_str(raw).map_err(|e| WidgetError::MalformedMessage(e.to_string()))
    }
}

/// A count that is not a whole number in `u32` range is dropped rather than
/// failing the message, so the terminal flags beside it still apply
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::Null => None,
        other => {
            debug!(value = %other, "skipping non-numeric scannedCount");
            None
        }
    };
    Ok(count)
}

/// The server sends `closeConnection` as either a boolean or `"1"`
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Number(n) => n != 0,
        Flag::Text(s) => matches!(s.as_str(), "1" | "true"),
    })
}

/// Hidden forms the page renders for each way a scan can end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenForm {
    ScanResults,
    CloseConnection,
    CancelUpload,
}

impl HiddenForm {
    /// Value of the form's `action` field as read by the server
    pub fn action(&self) -> &'static str {
        match self {
            HiddenForm::ScanResults => "scanResults",
            HiddenForm::CloseConnection => "closeConnection",
            HiddenForm::CancelUpload => "cancelUpload",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEffect {
    OpenDialog,
    OpenConnection,
    UpdateCounter(u32),
    CloseConnection,
    Submit(HiddenForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    Finished,
    ConnectionClosed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning { scanned: u32 },
    Terminal(TerminalReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    state: ScanState,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self {
            state: ScanState::Idle,
        }
    }
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ScanState::Terminal(_))
    }

    /// Begin tracking a scan that is already running server-side
    pub fn start(&mut self) -> Vec<ScanEffect> {
        match self.state {
            ScanState::Idle => {
                self.state = ScanState::Scanning { scanned: 0 };
                debug!("upload scan started");
                vec![ScanEffect::OpenDialog, ScanEffect::OpenConnection]
            }
            _ => Vec::new(),
        }
    }

    /// Apply a raw stream payload
    ///
    /// Malformed payloads leave the state untouched.
    pub fn on_message(&mut self, raw: &str) -> Result<Vec<ScanEffect>, WidgetError> {
        let message = ScanMessage::decode(raw)?;
        Ok(self.apply(&message))
    }

    pub fn apply(&mut self, message: &ScanMessage) -> Vec<ScanEffect> {
        let ScanState::Scanning { scanned } = self.state else {
            debug!(state = ?self.state, "ignoring scan message outside a scan");
            return Vec::new();
        };

        let mut effects = Vec::new();
        let scanned = match message.scanned_count {
            Some(count) => {
                effects.push(ScanEffect::UpdateCounter(count));
                count
            }
            None => scanned,
        };

        self.state = if message.finished_scanning {
            effects.push(ScanEffect::CloseConnection);
            effects.push(ScanEffect::Submit(HiddenForm::ScanResults));
            ScanState::Terminal(TerminalReason::Finished)
        } else if message.close_connection {
            effects.push(ScanEffect::CloseConnection);
            effects.push(ScanEffect::Submit(HiddenForm::CloseConnection));
            ScanState::Terminal(TerminalReason::ConnectionClosed)
        } else {
            ScanState::Scanning { scanned }
        };

        debug!(state = ?self.state, "scan message applied");
        effects
    }

    /// User pressed cancel
    pub fn cancel(&mut self) -> Vec<ScanEffect> {
        let effects = match self.state {
            ScanState::Scanning { .. } => vec![
                ScanEffect::CloseConnection,
                ScanEffect::Submit(HiddenForm::CancelUpload),
            ],
            ScanState::Idle => vec![ScanEffect::Submit(HiddenForm::CancelUpload)],
            ScanState::Terminal(_) => return Vec::new(),
        };

        self.state = ScanState::Terminal(TerminalReason::Cancelled);
        effects
    }
}

/// Replace the first number in a counter label, keeping the rest of the text
///
/// `"0 of 2 files uploaded"` with 1 becomes `"1 of 2 files uploaded"`.
/// Labels without a number are returned unchanged.
pub fn update_counter_label(label: &str, scanned: u32) -> String {
    let Some(start) = label.find(|c: char| c.is_ascii_digit()) else {
        return label.to_string();
    };
    let end = label[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(label.len(), |offset| start + offset);

    format!("{}{}{}", &label[..start], scanned, &label[end..])
}
