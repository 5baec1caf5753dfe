use crate::error::Error;
use crate::memory::new_fs;
use crate::testing::CapturingMessageHandler;

#[tokio::test]
async fn write_creates_missing_ancestors() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    fs.write_file("/a/b/c/file.txt", b"payload", &handler)
        .await
        .unwrap();

    assert!(fs.exists("/a", &handler).await.is_true());
    assert!(fs.is_dir("/a/b", &handler).await.is_true());
    assert!(fs.is_dir("/a/b/c", &handler).await.is_true());
    assert!(fs.is_dir("/a/b/c/file.txt", &handler).await.is_false());
}

#[tokio::test]
async fn read_file_cap_fails_without_partial_content() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    let content = vec![7u8; 100];
    fs.write_file("/big", &content, &handler).await.unwrap();

    let result = fs.read_file("/big", 10, &handler).await;
    assert!(matches!(
        result,
        Err(Error::SizeLimitExceeded { limit: 10, .. })
    ));

    // At or under the limit: exact full content.
    assert_eq!(fs.read_file("/big", 100, &handler).await.unwrap(), content);
    assert_eq!(fs.read_file("/big", 200, &handler).await.unwrap(), content);
    assert_eq!(
        fs.read_file_unbounded("/big", &handler).await.unwrap(),
        content
    );
}

#[tokio::test]
async fn read_file_missing_reports_and_fails() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    let result = fs.read_file("/nowhere", 64, &handler).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
    assert!(handler.contains("/nowhere"));
}

#[tokio::test]
async fn read_file_to_writer_streams_content() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    let content: Vec<u8> = (0..=255u8).cycle().take(20_000).collect();
    fs.write_file("/blob", &content, &handler).await.unwrap();

    let mut sink: Vec<u8> = Vec::new();
    fs.read_file_to_writer("/blob", 20_000, &mut sink, &handler)
        .await
        .unwrap();
    assert_eq!(sink, content);
}

#[tokio::test]
async fn read_file_to_writer_respects_cap() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file("/blob", &[1u8; 1000], &handler).await.unwrap();

    let mut sink: Vec<u8> = Vec::new();
    let result = fs.read_file_to_writer("/blob", 999, &mut sink, &handler).await;
    assert!(matches!(result, Err(Error::SizeLimitExceeded { .. })));
}

#[tokio::test]
async fn write_temp_file_returns_fresh_names() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    let first = fs
        .write_temp_file("/spool/item-", b"one", &handler)
        .await
        .unwrap();
    let second = fs
        .write_temp_file("/spool/item-", b"two", &handler)
        .await
        .unwrap();

    assert!(first.starts_with("/spool/item-"));
    assert!(second.starts_with("/spool/item-"));
    assert_ne!(first, second);
    assert_eq!(fs.read_file(&first, 16, &handler).await.unwrap(), b"one");
    assert_eq!(fs.read_file(&second, 16, &handler).await.unwrap(), b"two");
}

#[tokio::test]
async fn atomic_write_roundtrip() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    fs.write_file_atomic("/data/state.json", b"{\"v\":1}", &handler)
        .await
        .unwrap();
    assert_eq!(
        fs.read_file("/data/state.json", 64, &handler).await.unwrap(),
        b"{\"v\":1}"
    );

    // Overwrite publishes the new content in full.
    fs.write_file_atomic("/data/state.json", b"{\"v\":2}", &handler)
        .await
        .unwrap();
    assert_eq!(
        fs.read_file("/data/state.json", 64, &handler).await.unwrap(),
        b"{\"v\":2}"
    );
}

#[tokio::test]
async fn atomic_write_leaves_no_temp_behind() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    fs.write_file_atomic("/out/result", b"done", &handler)
        .await
        .unwrap();

    let listing = fs.list_contents("/out", &handler).await.unwrap();
    assert_eq!(listing, vec!["/out/result".to_string()]);
}

#[tokio::test]
async fn atomic_write_replaces_under_open_reader() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file_atomic("/f", b"before", &handler).await.unwrap();

    // A reader opened before the overwrite keeps the complete old content.
    let reader = fs.open_input("/f", &handler).await.unwrap();
    fs.write_file_atomic("/f", b"after", &handler).await.unwrap();
    let old = fs.read_open_file(reader, 64, &handler).await.unwrap();
    assert_eq!(old, b"before");

    // A reader opened after sees the complete new content.
    assert_eq!(fs.read_file("/f", 64, &handler).await.unwrap(), b"after");
}

#[tokio::test]
async fn rename_creates_destination_ancestors() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file("/src/file", b"x", &handler).await.unwrap();

    fs.rename("/src/file", "/dst/deep/file", &handler)
        .await
        .unwrap();

    assert!(fs.exists("/src/file", &handler).await.is_false());
    assert_eq!(
        fs.read_file("/dst/deep/file", 8, &handler).await.unwrap(),
        b"x"
    );
}

#[tokio::test]
async fn list_contents_distinguishes_empty_from_missing() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    let result = fs.list_contents("/absent", &handler).await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    fs.make_dir("/present", &handler).await.unwrap();
    let listing = fs.list_contents("/present", &handler).await.unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn recursively_make_dir_stops_at_file_conflict() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file("/a/b", b"a file, not a dir", &handler)
        .await
        .unwrap();

    let result = fs.recursively_make_dir("/a/b/c", &handler).await;
    assert!(matches!(result, Err(Error::NotADirectory(_))));
    assert!(handler.contains("/a/b"));
}

#[tokio::test]
async fn recursively_make_dir_is_idempotent() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    fs.recursively_make_dir("/x/y/z", &handler).await.unwrap();
    fs.recursively_make_dir("/x/y/z", &handler).await.unwrap();
    assert!(fs.is_dir("/x/y/z", &handler).await.is_true());
}
