//! # gorodump Parser
//!
//! Parser for Go runtime goroutine stack dumps (the text printed on a fatal panic, by
//! `SIGQUIT`, or by `/debug/pprof/goroutine?debug=2`) with structured output.
//!
//! ## Overview
//!
//! A dump is a flat list of blocks separated by blank lines:
//!
//! ```text
//! goroutine 7 [chan receive, 3 minutes, locked to thread]:
//! main.worker(0xc000012345)
//! 	/app/worker.go:42 +0x1d
//! created by main.main in goroutine 1
//! 	/app/main.go:17 +0x66
//! ```
//!
//! Each block becomes a [`Goroutine`](ir::Goroutine) carrying its id, status, wait time,
//! thread lock flag, ordered [`StackFrame`](ir::StackFrame)s and optional `created by` frame.
//!
//! ## Error Recovery
//!
//! The parser extracts as much as it can from truncated or copy-pasted dumps:
//!
//! - **Malformed header**: the block is dropped, parsing resumes at the next header
//! - **Malformed position line**: the frame is dropped, the goroutine keeps the others
//! - **Input ends mid-frame**: that frame is dropped, the goroutine is kept
//! - **Reader failure**: the only fatal case, nothing is returned
//!
//! Skipped blocks and frames are logged through the [`log`] facade and collected as
//! [`ParseError`] diagnostics.
//!
//! ## Examples
//!
//! ### One-shot Parsing
//!
//! ```
//! use gorodump_parser::parse_dump;
//!
//! let dump = "goroutine 5 [running]:\nmain.foo()\n\t/a/b.go:10 +0x1a\n\n";
//! let goroutines = parse_dump(dump.as_bytes())?;
//!
//! assert_eq!(goroutines.len(), 1);
//! assert_eq!(goroutines[0].status, "running");
//! assert_eq!(goroutines[0].stack_trace[0].position, Some(0x1a));
//! # Ok::<(), gorodump_parser::DumpError>(())
//! ```
//!
//! ### Streaming/Incremental Parsing
//!
//! ```
//! use gorodump_parser::DumpParser;
//!
//! let mut parser = DumpParser::new();
//!
//! let done = parser.update("goroutine 1 [select]:\nmain.loop()\n");
//! assert!(done.is_empty());
//!
//! let done = parser.update("\t/app/main.go:30 +0x4f\n\n");
//! assert_eq!(done.len(), 1);
//!
//! let rest = parser.finish();
//! assert!(rest.diagnostics.is_empty());
//! ```
//!
//! ### Searching Stacks
//!
//! ```
//! use gorodump_parser::DumpParser;
//!
//! let dump = DumpParser::new().parse_str(
//!     "goroutine 9 [IO wait]:\nnet/http.(*conn).serve()\n\t/go/src/net/http/server.go:2009\n",
//! );
//! assert!(dump.goroutines[0].stack_contains("SERVER.GO"));
//! ```

/// Error and diagnostic types.
pub mod error;
/// Goroutine and stack frame model.
pub mod ir;
/// Line-driven dump parser.
pub mod parser;


pub use error::{DumpError, FrameError, HeaderError, ParseError};
pub use ir::{Goroutine, StackFrame, stack_contains};
pub use parser::{Dump, DumpParser, parse_dump};

/// Schema version of the serialized model.
///
/// - MAJOR: Breaking changes to the goroutine or frame structure
/// - MINOR: New optional fields
/// - PATCH: Bug fixes to parsing behavior
pub const SCHEMA_VERSION: &str = "1.0.0";
