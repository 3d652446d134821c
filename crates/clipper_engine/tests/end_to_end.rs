use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipper_core::{PhaseVocabulary, Percent};
use clipper_engine::{
    ClientSettings, HttpStatusSource, HttpUploader, JobStatusPoller, PollError, PollObserver,
    PollOutcome, PollSettings, UploadFile, UploadProgressSink, UploadSession,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Observed {
    upload_events: Mutex<Vec<(u64, u64)>>,
    updates: Mutex<Vec<(String, Percent)>>,
    highlight_calls: Mutex<Vec<Vec<String>>>,
    completions: AtomicU32,
    failures: AtomicU32,
}

impl UploadProgressSink for Observed {
    fn on_progress(&self, sent: u64, total: u64) {
        self.upload_events.lock().unwrap().push((sent, total));
    }
}

impl PollObserver for Observed {
    fn on_update(&self, label: &str, percent: Percent) {
        self.updates.lock().unwrap().push((label.to_string(), percent));
    }

    fn on_highlights_changed(&self, highlights: &[String]) {
        self.highlight_calls.lock().unwrap().push(highlights.to_vec());
    }

    fn on_complete(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }

    fn on_poll_failed(&self, _error: &PollError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

async fn mount_status_once(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/status/job-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn upload_then_poll_until_complete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-42"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_status_once(
        &server,
        json!({"progress": 0, "step": "Queued", "highlights": []}),
    )
    .await;
    mount_status_once(
        &server,
        json!({"progress": 50, "step": "Cutting (1/2)", "highlights": ["a.mp4"]}),
    )
    .await;
    mount_status_once(
        &server,
        json!({"step": "Concluído", "highlights": ["a.mp4", "b.mp4"]}),
    )
    .await;

    let total = 10 * 1024 * 1024;
    let settings = ClientSettings {
        base_url: server.uri(),
        upload_chunk_bytes: total / 4,
        poll_interval: Duration::from_millis(20),
        ..ClientSettings::default()
    };
    let observed = Arc::new(Observed::default());

    let session = UploadSession::new(UploadFile::new("talk.mp4", vec![1u8; total]).unwrap());
    let job_id = session
        .start(&HttpUploader::new(&settings).unwrap(), None, observed.clone())
        .await
        .expect("upload ok");

    let source = HttpStatusSource::new(&settings).unwrap();
    let poll_settings = PollSettings {
        interval: settings.poll_interval,
        max_consecutive_failures: 5,
        vocabulary: PhaseVocabulary::default(),
    };
    let outcome = JobStatusPoller::new(&source, poll_settings)
        .run(&job_id, observed.as_ref(), &CancellationToken::new())
        .await;

    assert_eq!(outcome, PollOutcome::Completed { cycles: 3 });
    assert_eq!(observed.upload_events.lock().unwrap().len(), 4);
    assert_eq!(
        observed.updates.lock().unwrap().clone(),
        vec![
            ("Queued".to_string(), Percent::Indeterminate),
            ("Cutting (1/2)".to_string(), Percent::Known(0)),
            ("Processing complete".to_string(), Percent::Known(100)),
        ]
    );
    assert_eq!(
        observed.highlight_calls.lock().unwrap().clone(),
        vec![
            vec!["a.mp4".to_string()],
            vec!["a.mp4".to_string(), "b.mp4".to_string()],
        ]
    );
    assert_eq!(observed.completions.load(Ordering::SeqCst), 1);
    assert_eq!(observed.failures.load(Ordering::SeqCst), 0);
}
