use anyhow::Result;
use jsonl_stream::testing::*;
use jsonl_stream::{JsonlError, JsonlWriter, WriterOptions, append_jsonl};
use log::Level;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

fn capture() -> (Arc<MemorySink>, WriterOptions) {
    let sink = Arc::new(MemorySink::new());
    let opts = WriterOptions::default().with_sink(sink.clone());
    (sink, opts)
}

#[test]
fn creates_missing_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("new.jsonl");
    let w = JsonlWriter::create(&path, false)?;
    assert!(path.exists());
    assert_eq!(fs::read(&path)?, b"");
    assert_eq!(w.path(), path.as_path());
    Ok(())
}

#[test]
fn existing_file_with_append_disabled_is_untouched() -> Result<()> {
    let tmp = mock_raw_file(b"{\"keep\":true}\n")?;
    let before = fs::metadata(tmp.path())?;

    let err = JsonlWriter::create(tmp.path(), false).unwrap_err();
    assert!(matches!(err, JsonlError::TargetExists { .. }));

    let after = fs::metadata(tmp.path())?;
    assert_eq!(fs::read(tmp.path())?, b"{\"keep\":true}\n");
    assert_eq!(before.len(), after.len());
    assert_eq!(before.modified()?, after.modified()?);
    Ok(())
}

#[test]
fn appends_after_existing_content() -> Result<()> {
    let tmp = mock_raw_file(b"{\"n\":0}\n{\"n\":1}")?;
    let mut w = JsonlWriter::open(tmp.path())?;
    w.write_bytes(b"{\"n\":2}");
    w.write(&HashMap::from([("n", 3)]));
    assert_eq!(w.records_written(), 2);
    w.close();

    assert_eq!(
        fs::read_to_string(tmp.path())?,
        "{\"n\":0}\n{\"n\":1}{\"n\":2}\n{\"n\":3}\n"
    );
    Ok(())
}

#[test]
fn every_write_is_visible_before_close() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("live.jsonl");
    let mut w = JsonlWriter::with_options(&path, true, WriterOptions::default().with_sync(true))?;
    for i in 0..3 {
        w.try_write(&i)?;
        let seen: Vec<u32> = read_jsonl_output(&path)?;
        assert_eq!(seen.len(), i as usize + 1);
    }
    Ok(())
}

#[test]
fn encode_failure_drops_record_and_keeps_writer_usable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("enc.jsonl");
    let (sink, opts) = capture();
    let mut w = JsonlWriter::with_options(&path, true, opts)?;

    // JSON object keys must be strings.
    let bad = HashMap::from([((1, 2), 3)]);
    assert!(matches!(w.try_write(&bad), Err(JsonlError::Encode { .. })));
    w.write(&bad);
    assert!(sink.contains(Level::Error, "error encoding object"));

    w.write(&"ok");
    w.close();
    assert_eq!(fs::read_to_string(&path)?, "\"ok\"\n");
    assert_eq!(w.records_written(), 1);
    Ok(())
}

#[test]
fn close_is_idempotent_and_blocks_later_writes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("closed.jsonl");
    let (sink, opts) = capture();
    let mut w = JsonlWriter::with_options(&path, true, opts)?;
    w.write(&1);
    w.close();
    assert!(w.is_closed());
    w.close();
    w.try_close()?;

    assert!(matches!(w.try_write(&2), Err(JsonlError::Closed)));
    w.write_bytes(b"3");
    assert!(sink.contains(Level::Error, "writer is closed"));
    assert_eq!(fs::read_to_string(&path)?, "1\n");
    Ok(())
}

#[test]
fn drop_closes_the_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("dropped.jsonl");
    let (sink, opts) = capture();
    {
        let mut w = JsonlWriter::with_options(&path, true, opts)?;
        w.write(&"a");
    }
    assert!(sink.contains(Level::Debug, "after 1 records"));
    assert_eq!(fs::read_to_string(&path)?, "\"a\"\n");
    Ok(())
}

#[test]
fn open_failure_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing-dir").join("x.jsonl");
    let (sink, opts) = capture();
    let err = JsonlWriter::with_options(&path, true, opts).unwrap_err();
    assert!(matches!(err, JsonlError::Open { .. }));
    assert!(sink.contains(Level::Error, "Failed to open file"));
    Ok(())
}

#[test]
fn append_jsonl_counts_records() -> Result<()> {
    let tmp = mock_jsonl_file(&sample_log_entries()[..2])?;
    let n = append_jsonl(tmp.path(), &sample_log_entries()[2..])?;
    assert_eq!(n, 3);
    let all: Vec<SampleLogEntry> = read_jsonl_output(tmp.path())?;
    assert_eq!(all, sample_log_entries());
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn write_failure_is_reported_and_writer_stays_open() -> Result<()> {
    let (sink, opts) = capture();
    let mut w = JsonlWriter::with_options("/dev/full", true, opts)?;

    assert!(matches!(w.try_write_bytes(b"1"), Err(JsonlError::Write { .. })));
    w.write_bytes(b"2");
    assert!(sink.contains(Level::Error, "error writing to file"));
    assert_eq!(w.records_written(), 0);
    assert!(!w.is_closed());
    assert!(matches!(w.try_write(&3), Err(JsonlError::Write { .. })));
    Ok(())
}
