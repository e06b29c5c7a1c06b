//! Parser for annotated scanner transcripts.
//!
//! The scanner types one `<pin>\t<pin>` line per key press; the operator then
//! writes the key's name in front of each line, and `FN` after the name for
//! keys that only act while Fn is held:
//!
//! ```text
//! Teensy2
//! Escape      12  18
//! MediaNext FN 1  20
//! # 7  9  Shorted
//! ```

use lapkey_core::{Board, Keycode};
use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("line {line}: unknown key name `{name}`")]
    UnknownKey { line: usize, name: String },

    #[error("line {line}: `{name}` connects pin {pin} to itself")]
    SamePin { line: usize, name: String, pin: u8 },

    #[error("line {line}: `{token}` is not a connector pin number")]
    BadPin { line: usize, token: String },

    #[error("line {line}: pin {pin} is not on the {board} connector (1-{count})")]
    PinOutOfRange {
        line: usize,
        pin: u8,
        board: &'static str,
        count: usize,
    },

    #[error("no {0} pins found; is the transcript annotated?")]
    Empty(&'static str),
}

/// One annotated key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based line number in the transcript.
    pub line: usize,
    pub key: Keycode,
    /// Key acts only while Fn is held.
    pub fn_layer: bool,
    /// FPC pins, lower first.
    pub pins: (u8, u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Board named last in the transcript, or the caller's default.
    pub board: Board,
    pub entries: Vec<Entry>,
}

/// Parse a transcript, starting from `board` until a line names another one.
pub fn parse(input: &str, board: Board) -> Result<Transcript, MapError> {
    let mut transcript = Transcript {
        board,
        entries: Vec::new(),
    };

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }

        if let Some(board) = Board::from_name(text) {
            info!("Using {} board", board.name());
            transcript.board = board;
            continue;
        }

        let mut tokens = text.split_whitespace();
        let Some(name) = tokens.next() else {
            continue;
        };
        let mut rest: Vec<&str> = tokens.collect();
        let fn_layer = rest.first().is_some_and(|t| t.eq_ignore_ascii_case("FN"));
        if fn_layer {
            rest.remove(0);
        }

        let mut pins: Vec<u8> = Vec::with_capacity(2);
        for token in rest
            .iter()
            .take_while(|t| t.bytes().all(|b| b.is_ascii_digit()))
            .take(2)
        {
            let pin = token.parse().map_err(|_| MapError::BadPin {
                line,
                token: token.to_string(),
            })?;
            pins.push(pin);
        }
        let [a, b] = pins[..] else {
            debug!("line {}: no pin pair, skipped", line);
            continue;
        };

        let key = Keycode::from_name(name).ok_or_else(|| MapError::UnknownKey {
            line,
            name: name.to_string(),
        })?;
        if a == b {
            return Err(MapError::SamePin {
                line,
                name: name.to_string(),
                pin: a,
            });
        }

        transcript.entries.push(Entry {
            line,
            key,
            fn_layer,
            pins: (a.min(b), a.max(b)),
        });
    }

    Ok(transcript)
}
