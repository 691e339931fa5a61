use gorodump_parser::{DumpError, DumpParser, ParseError, StackFrame, parse_dump};
use std::io::{self, Read};

/// Yields its data, then fails instead of reporting end of stream.
struct FailingReader {
    data: io::Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::other("connection reset"));
        }
        Ok(n)
    }
}

#[test]
fn test_simple_structure() {
    let input = "goroutine 21 [semacquire, 7 minutes]:\n\
sync.runtime_Semacquire(0xc0000160a8?)\n\
\t/usr/local/go/src/runtime/sema.go:62 +0x25\n\
sync.(*WaitGroup).Wait(0x0?)\n\
\t/usr/local/go/src/sync/waitgroup.go:116 +0x48\n\
created by main.main in goroutine 1\n\
\t/app/main.go:40 +0x1e5\n\
\n";
    let goroutines = parse_dump(input.as_bytes()).unwrap();
    assert_eq!(goroutines.len(), 1);

    let g = &goroutines[0];
    assert_eq!(g.id, 21);
    assert_eq!(g.status, "semacquire");
    assert_eq!(g.wait_since_minutes, 7);
    assert!(!g.locked_to_thread);
    assert_eq!(
        g.stack_trace,
        vec![
            StackFrame::new(
                "sync.runtime_Semacquire(0xc0000160a8?)",
                "/usr/local/go/src/runtime/sema.go",
                62,
                Some(0x25)
            ),
            StackFrame::new(
                "sync.(*WaitGroup).Wait(0x0?)",
                "/usr/local/go/src/sync/waitgroup.go",
                116,
                Some(0x48)
            ),
        ]
    );
    assert_eq!(
        g.created_by,
        Some(StackFrame::new(
            "main.main in goroutine 1",
            "/app/main.go",
            40,
            Some(0x1e5)
        ))
    );
}

#[test]
fn test_blocks_in_input_order() {
    let input = "goroutine 9 [running]:\n\ngoroutine 2 [sleep]:\n\ngoroutine 9 [select]:\n";
    let goroutines = parse_dump(input.as_bytes()).unwrap();
    let ids: Vec<i64> = goroutines.iter().map(|g| g.id).collect();
    assert_eq!(ids, [9, 2, 9]);
}

#[test]
fn test_stream_error_returns_nothing() {
    let input = "goroutine 1 [running]:\nmain.a()\n\t/a.go:1\n\ngoroutine 2 [sleep]:\nmain.b()\n\t/b.go:2\n\n";
    let reader = FailingReader {
        data: io::Cursor::new(input.as_bytes().to_vec()),
    };

    let result = DumpParser::new().parse_reader(reader);
    assert!(matches!(result, Err(DumpError::Stream(_))));

    let reader = FailingReader {
        data: io::Cursor::new(input.as_bytes().to_vec()),
    };
    assert!(parse_dump(reader).is_err());
}

#[test]
fn test_grammar_errors_are_not_fatal() {
    let input = "not a header\ngoroutine 1 [running]:\nmain.a()\n\t/a.go:x\n";
    let dump = DumpParser::new().parse_reader(input.as_bytes()).unwrap();
    assert_eq!(dump.goroutines.len(), 1);
    assert!(dump.goroutines[0].stack_trace.is_empty());
    assert_eq!(dump.diagnostics.len(), 2);
    assert_eq!(dump.diagnostics[0].line(), 1);
    assert_eq!(dump.diagnostics[1].line(), 4);
}

#[test]
fn test_diagnostics_accessor() {
    let mut parser = DumpParser::new();
    parser.update("bogus line\n");
    assert!(matches!(parser.diagnostics(), [ParseError::Block { line: 1, .. }]));
}

#[test]
fn test_diagnostic_messages() {
    let dump = DumpParser::new().parse_str("goroutine one [running]:\n");
    assert_eq!(
        dump.diagnostics[0].to_string(),
        "line 1: skipping goroutine block: invalid goroutine id `one`"
    );
}

#[test]
fn test_wait_and_lock_independent() {
    let dump = DumpParser::new().parse_str(
        "goroutine 1 [select, 5 minutes]:\n\ngoroutine 2 [select, locked to thread]:\n",
    );
    assert_eq!(dump.goroutines[0].wait_since_minutes, 5);
    assert!(!dump.goroutines[0].locked_to_thread);
    assert_eq!(dump.goroutines[1].wait_since_minutes, 0);
    assert!(dump.goroutines[1].locked_to_thread);
}
