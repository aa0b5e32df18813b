use duka::{DukaResult, LogStore};

fn main() -> DukaResult<()> {
    env_logger::init();
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut store = LogStore::from_path(dir.path().join("duka.log"), None)?;

    store.append(b"king", b"queen")?;
    assert_eq!(store.get_latest(b"king")?, Some(b"queen".to_vec()));

    store.append(b"king", b"regent")?;
    store.compact(dir.path().join("compacted.log"))?;
    assert_eq!(store.get_latest(b"king")?, Some(b"regent".to_vec()));

    Ok(())
}
