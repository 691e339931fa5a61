#![no_main]
use gorodump_parser::DumpParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Panic freedom on arbitrary bytes. Reading from a slice cannot fail.
    let from_reader = DumpParser::new()
        .parse_reader(data)
        .expect("in-memory reads never fail");

    // Lossy decoding line by line must agree with decoding the whole input at once.
    let text = String::from_utf8_lossy(data);
    let from_str = DumpParser::new().parse_str(&text);
    assert_eq!(from_reader, from_str);
});
