use std::path::PathBuf;

use chrono::{TimeZone as _, Utc};

use placelapse::{ActionSource, DrawAction, NdjsonSource, Rgb8, open_source};

fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("actions.ndjson");
    std::fs::write(&path, body).unwrap();
    path
}

fn collect(src: &mut dyn ActionSource) -> Vec<DrawAction> {
    src.actions()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn reads_mongoexport_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        concat!(
            r##"{"_id":{"$oid":"65e1f0"},"point":{"x":{"$numberInt":"3"},"y":4,"w":2.9,"h":{"$numberDouble":"1.0"},"c":"#00ff00"},"create_at":{"$date":"2024-03-01T12:00:00.000Z"}}"##,
            "\n",
            r##"{"point":{"x":0,"y":0,"c":"#abc"},"create_at":{"$date":{"$numberLong":"1709294401000"}}}"##,
            "\n",
        ),
    );

    let mut src = NdjsonSource::open(&path).unwrap();
    assert_eq!(src.count().unwrap(), 2);
    let actions = collect(&mut src);
    assert_eq!(actions.len(), 2);

    let first = actions[0].resolve().unwrap();
    assert_eq!((first.x, first.y, first.w, first.h), (3, 4, 2, 1));
    assert_eq!(first.color, Rgb8::new(0, 255, 0));
    assert_eq!(
        actions[0].create_at,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    );

    let second = actions[1].resolve().unwrap();
    assert_eq!((second.w, second.h), (1, 1));
    assert_eq!(second.color, Rgb8::new(0xaa, 0xbb, 0xcc));
    assert_eq!(
        actions[1].create_at,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 1).unwrap())
    );
}

#[test]
fn count_matches_the_stream_despite_bad_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        concat!(
            r##"{"point":{"x":1,"y":1,"c":"#000"}}"##,
            "\n\n",
            "this is not json\n",
            r##"{"create_at":"2024-03-01T12:00:00Z"}"##,
            "\n",
            "   \n",
        ),
    );

    let mut src = NdjsonSource::open(&path).unwrap();
    assert_eq!(src.count().unwrap(), 3);
    let actions = collect(&mut src);
    assert_eq!(actions.len(), 3);
    assert!(actions[0].resolve().is_some());
    assert_eq!(actions[1], DrawAction::default());
    assert!(actions[2].resolve().is_none());
    assert!(actions[2].create_at.is_some());
}

#[test]
fn source_can_be_replayed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "{\"point\":{\"x\":1,\"y\":1,\"c\":\"#000\"}}\n");
    let mut src = NdjsonSource::open(&path).unwrap();
    assert_eq!(collect(&mut src), collect(&mut src));
}

#[test]
fn open_source_accepts_paths_and_file_urls() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "{}\n{}\n");

    let mut by_path = open_source(path.to_str().unwrap()).unwrap();
    assert_eq!(by_path.count().unwrap(), 2);

    let mut by_url = open_source(&format!("file://{}", path.display())).unwrap();
    assert_eq!(by_url.count().unwrap(), 2);
}

#[test]
fn database_urls_are_not_read_as_files() {
    let err = open_source("mongodb://127.0.0.1:1/place?serverSelectionTimeoutMS=200")
        .err()
        .expect("nothing listens on port 1");
    let msg = err.to_string();
    assert!(msg.contains("unreachable"), "{msg}");
    assert!(!msg.contains("action log"), "{msg}");
}
