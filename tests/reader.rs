use anyhow::Result;
use jsonl_stream::testing::*;
use jsonl_stream::{JsonlError, JsonlReader, ReaderOptions, read_jsonl_vec};
use log::Level;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, PartialEq)]
struct A {
    a: u32,
}

fn quiet() -> ReaderOptions {
    ReaderOptions::default().with_sink(Arc::new(jsonl_stream::NullSink))
}

fn raw(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let tmp = mock_raw_file(bytes)?;
    Ok(JsonlReader::with_options(tmp.path(), quiet())?.collect_all_raw())
}

#[test]
fn two_terminated_lines_give_two_records() -> Result<()> {
    assert_eq!(
        raw(b"{\"a\":1}\n{\"a\":2}\n")?,
        vec![b"{\"a\":1}".to_vec(), b"{\"a\":2}".to_vec()]
    );
    Ok(())
}

#[test]
fn empty_line_is_skipped() -> Result<()> {
    assert_eq!(
        raw(b"{\"a\":1}\n\n{\"a\":2}")?,
        vec![b"{\"a\":1}".to_vec(), b"{\"a\":2}".to_vec()]
    );
    Ok(())
}

#[test]
fn unterminated_last_line_is_flushed() -> Result<()> {
    assert_eq!(
        raw(b"{\"a\":1}\n{\"a\":2}")?,
        vec![b"{\"a\":1}".to_vec(), b"{\"a\":2}".to_vec()]
    );
    Ok(())
}

#[test]
fn empty_file_gives_nothing() -> Result<()> {
    assert!(raw(b"")?.is_empty());
    assert!(raw(b"\n\n\n")?.is_empty());
    Ok(())
}

#[test]
fn crlf_is_preserved_by_default() -> Result<()> {
    assert_eq!(raw(b"1\r\n2\r\n")?, vec![b"1\r".to_vec(), b"2\r".to_vec()]);

    let tmp = mock_raw_file(b"1\r\n2\r\n")?;
    let reader = JsonlReader::with_options(tmp.path(), quiet().with_strip_cr(true))?;
    assert_eq!(reader.collect_all_raw(), vec![b"1".to_vec(), b"2".to_vec()]);
    // serde_json tolerates the trailing \r either way.
    assert_eq!(reader.collect_all::<u32>(), vec![1, 2]);
    Ok(())
}

#[test]
fn malformed_lines_are_skipped_in_order() -> Result<()> {
    let tmp = mock_raw_file(b"{\"a\":1}\n{\"a\":\n{\"a\":3}\nnot json\n{\"a\":5}")?;
    let sink = Arc::new(MemorySink::new());
    let reader = JsonlReader::with_options(tmp.path(), quiet().with_sink(sink.clone()))?;

    let mut values = reader.values::<A>();
    let got: Vec<A> = values.by_ref().collect();
    assert_eq!(got, vec![A { a: 1 }, A { a: 3 }, A { a: 5 }]);

    let stats = values.stats();
    assert_eq!(stats.records, 5);
    assert_eq!(stats.decoded, 3);
    assert_eq!(stats.skipped, 2);
    assert!(values.error().is_none());
    assert_eq!(sink.count(Level::Trace), 2);
    assert!(sink.contains(Level::Trace, "line 2"));
    assert!(sink.contains(Level::Trace, "line 4"));
    Ok(())
}

#[test]
fn strict_values_report_the_bad_line() -> Result<()> {
    let tmp = mock_raw_file(b"{\"a\":1}\n\n{\"b\":2}\n{\"a\":3}\n")?;
    let reader = JsonlReader::with_options(tmp.path(), quiet())?;
    let results: Vec<_> = reader.try_values::<A>().collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().ok(), Some(&A { a: 1 }));
    assert!(matches!(results[1], Err(JsonlError::Decode { line: 3, .. })));

    let err = read_jsonl_vec::<A>(tmp.path()).unwrap_err();
    assert!(matches!(err, JsonlError::Decode { line: 3, .. }));
    Ok(())
}

#[test]
fn read_jsonl_vec_loads_clean_files() -> Result<()> {
    let tmp = mock_jsonl_file(&sample_log_entries())?;
    let back: Vec<SampleLogEntry> = read_jsonl_vec(tmp.path())?;
    assert_eq!(back, sample_log_entries());
    Ok(())
}

#[test]
fn missing_file_is_rejected_and_logged() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nope.jsonl");
    let sink = Arc::new(MemorySink::new());
    let err = JsonlReader::with_options(&path, quiet().with_sink(sink.clone())).unwrap_err();
    assert!(matches!(err, JsonlError::TargetMissing { .. }));
    assert!(sink.contains(Level::Error, "does not exist"));
    Ok(())
}

#[test]
fn directory_is_unreadable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let err = JsonlReader::with_options(dir.path(), quiet()).unwrap_err();
    assert!(matches!(err, JsonlError::TargetUnreadable { .. }));
    Ok(())
}

#[test]
fn file_removed_after_construction_ends_stream_silently() -> Result<()> {
    let tmp = mock_raw_file(b"1\n2\n")?;
    let path = tmp.path().to_path_buf();
    let sink = Arc::new(MemorySink::new());
    let reader = JsonlReader::with_options(&path, quiet().with_sink(sink.clone()))?;
    drop(tmp);

    let mut records = reader.records();
    assert_eq!(records.next(), None);
    assert!(matches!(records.error(), Some(JsonlError::Open { .. })));
    assert_eq!(sink.count(Level::Error), 1);

    let mut strict = reader.try_records();
    assert!(matches!(strict.next(), Some(Err(JsonlError::Open { .. }))));
    assert!(strict.next().is_none());
    Ok(())
}

#[test]
fn early_stop_reads_only_what_was_needed() -> Result<()> {
    let mut bytes = Vec::new();
    for i in 0..1000 {
        bytes.extend_from_slice(format!("{{\"a\":{i}}}\n").as_bytes());
    }
    let tmp = mock_raw_file(&bytes)?;
    let reader = JsonlReader::with_options(tmp.path(), quiet().with_chunk_size(64))?;

    let mut values = reader.values::<A>();
    let first: Vec<A> = values.by_ref().take(3).collect();
    assert_eq!(first, vec![A { a: 0 }, A { a: 1 }, A { a: 2 }]);
    assert_eq!(values.stats().chunks_read, 1);
    assert!(values.is_open());
    drop(values);

    let mut records = reader.records();
    assert_eq!(records.by_ref().count(), 1000);
    assert!(!records.is_open());
    assert_eq!(records.stats().bytes_read, bytes.len() as u64);
    Ok(())
}

#[test]
fn sessions_on_separate_threads_are_independent() -> Result<()> {
    let files: Vec<TempFilePath> = (0..4)
        .map(|t| {
            let data: Vec<u32> = (0..200).map(|i| t * 1000 + i).collect();
            mock_jsonl_file(&data)
        })
        .collect::<Result<_>>()?;

    let readers: Vec<JsonlReader> = files
        .iter()
        .map(|f| JsonlReader::with_options(f.path(), quiet().with_chunk_size(7)))
        .collect::<jsonl_stream::Result<_>>()?;

    let handles: Vec<_> = readers
        .into_iter()
        .map(|r| std::thread::spawn(move || r.values::<u32>().collect::<Vec<_>>()))
        .collect();

    for (t, h) in handles.into_iter().enumerate() {
        let got = h.join().expect("reader thread panicked");
        let want: Vec<u32> = (0..200).map(|i| t as u32 * 1000 + i).collect();
        assert_eq!(got, want);
    }
    Ok(())
}

#[test]
fn options_deserialize_with_defaults() -> Result<()> {
    let opts: ReaderOptions = serde_json::from_str(r#"{"strip_cr": true, "decompress": false}"#)?;
    assert_eq!(opts.chunk_size, jsonl_stream::DEFAULT_CHUNK_SIZE);
    assert!(opts.strip_cr);
    assert!(!opts.decompress);
    Ok(())
}
