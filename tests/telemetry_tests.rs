use file_store::config::LogFormat;
use file_store::store::{FileStore, LocalFileStore, SaveOptions};
use file_store::{stream, telemetry};

// One test per binary: the subscriber is process-global.
#[tokio::test]
async fn test_init_once_then_store_logs() {
    telemetry::init(LogFormat::Json).unwrap();
    assert!(telemetry::init(LogFormat::Text).is_err());

    let dir = tempfile::tempdir().unwrap();
    let store = LocalFileStore::new(dir.path());
    store
        .save("doc.txt", stream::from_bytes("data"), SaveOptions::default())
        .await
        .unwrap();
    assert!(!store.delete("missing.txt").await.unwrap());
}
