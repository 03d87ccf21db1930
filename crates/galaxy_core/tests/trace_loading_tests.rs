//! Trace file loading tests.
//!
//! Extension dispatch and the compiled format, through real files.

use std::fs;

use galaxy_core::error::GalaxyError;
use galaxy_core::trace::Trace;
use galaxy_test_utils::fixtures::skirmish_trace;

#[test]
fn test_load_json_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.json");
    fs::write(
        &path,
        r#"{"galaxy_name": "orion", "size": [300, 200], "turns": [{"things": []}]}"#,
    )
    .unwrap();

    let trace = Trace::load(&path).unwrap();
    assert_eq!(trace.galaxy_name, "orion");
    assert_eq!(trace.size, (300, 200));
    assert_eq!(trace.len(), 1);
}

#[test]
fn test_load_json_lines_names_galaxy_after_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("andromeda.jsonl");
    fs::write(&path, "{\"turn\": 0}\n{\"turn\": 1}\n{\"turn\": 2}\n").unwrap();

    let trace = Trace::load(&path).unwrap();
    assert_eq!(trace.galaxy_name, "andromeda");
    assert_eq!(trace.len(), 3);
}

#[test]
fn test_load_stream_capture_uses_header_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.jsonl");
    fs::write(
        &path,
        "pythonium|0.2.0|1234\n{\"turn\": 0}\n{\"turn\": 1}\npythonium|1234|1|None\n",
    )
    .unwrap();

    let trace = Trace::load(&path).unwrap();
    assert_eq!(trace.galaxy_name, "1234");
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.winner, None);
}

#[test]
fn test_compiled_trace_survives_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skirmish.trace");
    let trace = skirmish_trace();

    trace.save_compiled(&path).unwrap();
    let loaded = Trace::load(&path).unwrap();

    assert_eq!(loaded, trace);
    assert_eq!(loaded.known_players(), vec!["blue", "orange"]);
}

#[test]
fn test_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Trace::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, GalaxyError::TraceRead { .. }));
}

#[test]
fn test_garbage_compiled_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.trace");
    fs::write(&path, [1u8, 0]).unwrap();

    let err = Trace::load(&path).unwrap_err();
    match err {
        GalaxyError::TraceParse { path: reported, .. } => {
            assert!(reported.ends_with("broken.trace"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_empty_document_loads_as_empty_trace() {
    let trace = Trace::from_json_str(r#"{"galaxy_name": "void", "turns": []}"#).unwrap();
    assert!(trace.is_empty());
    assert_eq!(trace.summary().peak_ships, 0);
}
