use clipper_engine::{
    safe_highlight_name, ClientSettings, DownloadError, FailureKind, HighlightDownloader,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader(server: &MockServer) -> HighlightDownloader {
    HighlightDownloader::new(&ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn writes_highlight_into_output_dir() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/h1.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip-bytes".to_vec()))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("highlights");

    let written = downloader(&server)
        .download("h1.mp4", &out)
        .await
        .expect("download ok");

    assert_eq!(written, out.join("h1.mp4"));
    assert_eq!(std::fs::read(&written).unwrap(), b"clip-bytes");
}

#[tokio::test]
async fn failed_download_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/h1.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = downloader(&server)
        .download("h1.mp4", dir.path())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::Request {
            kind: FailureKind::HttpStatus(404),
            ..
        }
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn unsafe_name_is_refused_without_a_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let err = downloader(&server)
        .download("../escape.mp4", dir.path())
        .await
        .unwrap_err();

    assert_eq!(err, DownloadError::UnsafeFileName("../escape.mp4".to_string()));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn only_plain_names_are_safe() {
    assert_eq!(safe_highlight_name("clip 01.mp4").unwrap(), "clip 01.mp4");
    for name in ["", ".", "..", "a/b.mp4", "a\\b.mp4", "c:clip.mp4"] {
        assert!(safe_highlight_name(name).is_err(), "{name:?} accepted");
    }
}

#[tokio::test]
async fn large_download_leaves_only_the_final_file() {
    let server = MockServer::start().await;
    let content: Vec<u8> = (0..3_000_000u32).map(|i| (i % 253) as u8).collect();
    Mock::given(method("GET"))
        .and(path("/download/long.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let written = downloader(&server)
        .download("long.mp4", dir.path())
        .await
        .expect("download ok");

    assert_eq!(std::fs::read(&written).unwrap(), content);
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("long.mp4")]);
}
