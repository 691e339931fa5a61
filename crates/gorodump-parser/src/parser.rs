use crate::error::{FrameError, HeaderError, ParseError, Result};
use crate::ir::{Goroutine, StackFrame};
use serde::Serialize;
use std::io::{BufRead, BufReader, Read};

const HEADER_KEYWORD: &str = "goroutine";
const CREATED_BY_PREFIX: &str = "created by ";
const LOCKED_TO_THREAD: &str = "locked to thread";
const MINUTES_SUFFIX: &str = "minutes";
const OFFSET_PREFIX: &str = "+0x";

/// Result of a completed parse: every decodable goroutine, in input order, plus one
/// diagnostic per skipped block or frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dump {
    pub goroutines: Vec<Goroutine>,
    pub diagnostics: Vec<ParseError>,
}

/// Where the parser stands between two lines.
enum State {
    /// Outside any block, looking for a header.
    Idle,
    /// Inside a block, expecting a function line, a `created by` line or a blank line.
    InBlock(Goroutine),
    /// A function line was read; the next line must be its position.
    AwaitingPosition {
        goroutine: Goroutine,
        function: String,
        created_by: bool,
    },
}

/// A line-driven parser for goroutine stack dumps.
///
/// Lines are consumed strictly forward with a single line of lookahead (the position line
/// following a function line). Grammar failures are recorded as [`ParseError`] diagnostics
/// and logged; they never stop the parse. Only a failing reader does.
pub struct DumpParser {
    state: State,
    pending: Vec<Goroutine>,
    diagnostics: Vec<ParseError>,
    buffer: String,
    line_no: usize,
}

impl Default for DumpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DumpParser {
    /// Creates a new, empty `DumpParser`.
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            pending: Vec::new(),
            diagnostics: Vec::new(),
            buffer: String::new(),
            line_no: 0,
        }
    }

    /// Reads the whole stream and parses it.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Stream`](crate::DumpError::Stream) if the reader fails. In that
    /// case no goroutines are returned, even those completed before the failure.
    pub fn parse_reader<R: Read>(mut self, reader: R) -> Result<Dump> {
        let mut reader = BufReader::new(reader);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&raw);
            let text: &str = &text;
            self.feed_line(text.strip_suffix('\n').unwrap_or(text));
        }
        Ok(self.finish())
    }

    /// Parses an in-memory dump in one go.
    pub fn parse_str(mut self, input: &str) -> Dump {
        let mut goroutines = self.update(input);
        let mut dump = self.finish();
        goroutines.append(&mut dump.goroutines);
        dump.goroutines = goroutines;
        dump
    }

    /// Appends a chunk of input and processes every complete line in the buffer.
    ///
    /// # Returns
    ///
    /// The goroutines whose block was terminated by this chunk.
    pub fn update(&mut self, chunk: &str) -> Vec<Goroutine> {
        self.buffer.push_str(chunk);
        if let Some(last_nl) = self.buffer.rfind('\n') {
            let complete: String = self.buffer.drain(..=last_nl).collect();
            for line in complete.split_terminator('\n') {
                self.feed_line(line);
            }
        }
        std::mem::take(&mut self.pending)
    }

    /// Treats the input as ended: flushes a trailing unterminated line and closes the
    /// open block, if any.
    ///
    /// # Returns
    ///
    /// The goroutines not yet handed out by [`update`](Self::update) and all diagnostics.
    pub fn finish(mut self) -> Dump {
        if !self.buffer.is_empty() {
            let last = std::mem::take(&mut self.buffer);
            self.feed_line(&last);
        }
        self.end_of_input();
        Dump {
            goroutines: self.pending,
            diagnostics: self.diagnostics,
        }
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    fn feed_line(&mut self, raw: &str) {
        self.line_no += 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {
                if line.trim().is_empty() {
                    return;
                }
                match parse_header(line) {
                    Ok(goroutine) => self.state = State::InBlock(goroutine),
                    Err(reason) => self.report(ParseError::Block {
                        line: self.line_no,
                        reason,
                    }),
                }
            }
            State::InBlock(goroutine) => {
                if line.trim().is_empty() {
                    self.pending.push(goroutine);
                    return;
                }
                let (function, created_by) = match line.strip_prefix(CREATED_BY_PREFIX) {
                    Some(function) => (function.to_string(), true),
                    None => (line.to_string(), false),
                };
                self.state = State::AwaitingPosition {
                    goroutine,
                    function,
                    created_by,
                };
            }
            State::AwaitingPosition {
                mut goroutine,
                function,
                created_by,
            } => match parse_position(line) {
                Ok((file, line_number, position)) => {
                    let frame = StackFrame::new(function, file, line_number, position);
                    if created_by {
                        goroutine.created_by = Some(frame);
                    } else {
                        goroutine.stack_trace.push(frame);
                    }
                    self.state = State::InBlock(goroutine);
                }
                Err(reason) => {
                    // A blank line still closes the block, even in place of a position.
                    let ends_block = reason == FrameError::EmptyLine;
                    self.report(ParseError::Frame {
                        line: self.line_no,
                        function,
                        reason,
                    });
                    if ends_block {
                        self.pending.push(goroutine);
                    } else {
                        self.state = State::InBlock(goroutine);
                    }
                }
            },
        }
    }

    fn end_of_input(&mut self) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {}
            State::InBlock(goroutine) => self.pending.push(goroutine),
            State::AwaitingPosition {
                goroutine,
                function,
                ..
            } => {
                self.report(ParseError::TruncatedInput {
                    line: self.line_no,
                    function,
                });
                self.pending.push(goroutine);
            }
        }
    }

    fn report(&mut self, error: ParseError) {
        log::warn!("{error}");
        self.diagnostics.push(error);
    }
}

/// Decodes a header such as `goroutine 7 [chan receive, 3 minutes, locked to thread]:`.
fn parse_header(header: &str) -> std::result::Result<Goroutine, HeaderError> {
    let header = header.trim_end();
    let tokens: Vec<&str> = header.split(' ').collect();
    if tokens.len() < 3 {
        return Err(HeaderError::TooFewTokens(tokens.len()));
    }
    if tokens[0] != HEADER_KEYWORD {
        return Err(HeaderError::NotAGoroutine(tokens[0].to_string()));
    }
    let id = tokens[1]
        .parse::<i64>()
        .map_err(|_| HeaderError::InvalidId(tokens[1].to_string()))?;

    let clause = header
        .find('[')
        .and_then(|start| header[start + 1..].strip_suffix("]:"))
        .ok_or(HeaderError::MissingStatus)?;

    let mut parts = clause.split(',');
    let status = parts.next().unwrap_or_default();
    let mut goroutine = Goroutine::new(id, status);

    for qualifier in parts.map(str::trim) {
        if qualifier == LOCKED_TO_THREAD {
            goroutine.locked_to_thread = true;
        } else if let Some(count) = qualifier.strip_suffix(MINUTES_SUFFIX) {
            match count.trim().parse::<u64>() {
                Ok(minutes) => goroutine.wait_since_minutes = minutes,
                Err(_) => log::debug!("goroutine {id}: ignoring qualifier `{qualifier}`"),
            }
        } else {
            log::debug!("goroutine {id}: ignoring qualifier `{qualifier}`");
        }
    }

    Ok(goroutine)
}

/// Decodes a position line such as `\t/usr/local/go/src/net/http/server.go:2969 +0x970`.
///
/// The rightmost colon separates the path from the line number, so paths containing
/// colons (`C:/src/main.go`) survive.
fn parse_position(text: &str) -> std::result::Result<(String, i32, Option<u64>), FrameError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FrameError::EmptyLine);
    }

    let colon = text
        .rfind(':')
        .ok_or_else(|| FrameError::MissingSeparator(text.to_string()))?;
    let file = &text[..colon];
    let rest = &text[colon + 1..];

    let (line_str, position) = match rest.rfind(' ') {
        Some(space) => {
            let suffix = &rest[space + 1..];
            let position = suffix
                .strip_prefix(OFFSET_PREFIX)
                .and_then(|hex| u64::from_str_radix(hex, 16).ok())
                .ok_or_else(|| FrameError::InvalidOffset(suffix.to_string()))?;
            (&rest[..space], Some(position))
        }
        None => (rest, None),
    };

    let line = line_str
        .parse::<i32>()
        .map_err(|_| FrameError::InvalidLine(line_str.to_string()))?;

    Ok((file.to_string(), line, position))
}

/// Parses every goroutine of a stack dump read from `reader`.
///
/// Malformed blocks and frames are skipped (and logged); see [`DumpParser::parse_reader`]
/// to also get them back as diagnostics.
///
/// # Errors
///
/// Returns [`DumpError::Stream`](crate::DumpError::Stream) if reading fails.
pub fn parse_dump<R: Read>(reader: R) -> Result<Vec<Goroutine>> {
    DumpParser::new()
        .parse_reader(reader)
        .map(|dump| dump.goroutines)
}
