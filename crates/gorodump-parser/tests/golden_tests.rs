use gorodump_parser::DumpParser;
use std::fs;
use std::path::Path;

#[test]
fn run_golden_tests() {
    let fixtures_dir = Path::new("tests/fixtures");
    if !fixtures_dir.exists() {
        return;
    }

    for entry in fs::read_dir(fixtures_dir).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "dump") {
            let file = fs::File::open(&path).expect("Failed to open dump");
            let dump = DumpParser::new()
                .parse_reader(file)
                .expect("Failed to read dump");

            let json_output = serde_json::to_string_pretty(&dump.goroutines)
                .expect("Failed to serialize goroutines");

            let golden_path = path.with_extension("golden.json");

            if std::env::var("UPDATE_GOLDEN").is_ok() {
                fs::write(&golden_path, &json_output).expect("Failed to update golden file");
            } else {
                let expected = fs::read_to_string(&golden_path)
                    .expect("Failed to read golden file (run with UPDATE_GOLDEN=1 to create)");
                assert_eq!(
                    json_output.replace("\r\n", "\n"),
                    expected.replace("\r\n", "\n"),
                    "Golden test failed for {:?}",
                    path
                );
            }
        }
    }
}
