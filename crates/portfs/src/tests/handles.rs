use crate::UNLIMITED_SIZE;
use crate::error::Error;
use crate::memory::new_fs;
use crate::testing::CapturingMessageHandler;

#[tokio::test]
async fn filename_is_stable() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    let mut file = fs.open_output("/dir/data.bin", &handler).await.unwrap();
    assert_eq!(file.filename(), "/dir/data.bin");
    file.write(b"x", &handler).await.unwrap();
    assert_eq!(file.filename(), "/dir/data.bin");
    fs.close(file, &handler).await.unwrap();
}

#[tokio::test]
async fn temp_filename_is_discoverable() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    let file = fs.open_temp("/tmp/job-", &handler).await.unwrap();
    let name = file.filename().to_string();
    assert!(name.starts_with("/tmp/job-"));
    assert!(name.len() > "/tmp/job-".len());
    fs.close(file, &handler).await.unwrap();

    // The generated name addresses a real file.
    assert!(fs.exists(&name, &handler).await.is_true());
}

#[tokio::test]
async fn short_reads_are_legal() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file("/f", b"abcdefgh", &handler).await.unwrap();

    let mut file = fs.open_input("/f", &handler).await.unwrap();
    let mut buf = [0u8; 3];
    let mut seen = Vec::new();
    loop {
        let count = file.read(&mut buf, &handler).await;
        if count == 0 {
            break;
        }
        seen.extend_from_slice(&buf[..count]);
    }
    assert_eq!(seen, b"abcdefgh");
    fs.close(file, &handler).await.unwrap();
}

#[tokio::test]
async fn read_remaining_respects_cap() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file("/f", b"0123456789", &handler).await.unwrap();

    // Over the cap: fails, no partial data.
    let mut file = fs.open_input("/f", &handler).await.unwrap();
    let result = file.read_remaining(9, &handler).await;
    assert!(matches!(
        result,
        Err(Error::SizeLimitExceeded { limit: 9, .. })
    ));
    assert!(handler.contains("exceeds limit"));
    fs.close(file, &handler).await.unwrap();

    // At the cap: full content.
    let mut file = fs.open_input("/f", &handler).await.unwrap();
    assert_eq!(file.read_remaining(10, &handler).await.unwrap(), b"0123456789");
    fs.close(file, &handler).await.unwrap();

    // Unlimited sentinel.
    let mut file = fs.open_input("/f", &handler).await.unwrap();
    let all = file.read_remaining(UNLIMITED_SIZE, &handler).await.unwrap();
    assert_eq!(all, b"0123456789");
    fs.close(file, &handler).await.unwrap();
}

#[tokio::test]
async fn read_remaining_continues_after_read() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file("/f", b"header:payload", &handler).await.unwrap();

    let mut file = fs.open_input("/f", &handler).await.unwrap();
    let mut header = [0u8; 7];
    assert_eq!(file.read(&mut header, &handler).await, 7);
    assert_eq!(&header, b"header:");

    // The cap applies to what remains, not the whole file.
    let rest = file.read_remaining(7, &handler).await.unwrap();
    assert_eq!(rest, b"payload");
    fs.close(file, &handler).await.unwrap();
}

#[tokio::test]
async fn append_extends_existing_content() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file("/log", b"one\n", &handler).await.unwrap();

    let mut file = fs.open_output_for_append("/log", &handler).await.unwrap();
    file.write(b"two\n", &handler).await.unwrap();
    fs.close(file, &handler).await.unwrap();

    let content = fs.read_file("/log", 1024, &handler).await.unwrap();
    assert_eq!(content, b"one\ntwo\n");
}

#[tokio::test]
async fn open_output_truncates_existing_content() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();
    fs.write_file("/f", b"old content", &handler).await.unwrap();
    fs.write_file("/f", b"new", &handler).await.unwrap();

    let content = fs.read_file("/f", 1024, &handler).await.unwrap();
    assert_eq!(content, b"new");
}

#[tokio::test]
async fn flush_and_world_readable_are_explicit_steps() {
    let fs = new_fs();
    let handler = CapturingMessageHandler::new();

    let mut file = fs.open_output("/f", &handler).await.unwrap();
    file.write(b"data", &handler).await.unwrap();
    file.flush(&handler).await.unwrap();
    file.set_world_readable(&handler).await.unwrap();
    fs.close(file, &handler).await.unwrap();
}
