use clipper_core::{upload_percent, UploadProgress, UploadState};

#[test]
fn percent_matches_rounded_ratio_for_all_small_pairs() {
    for total in 1..=40u64 {
        for sent in 0..=total {
            let expected = ((sent as f64 / total as f64) * 100.0).round() as u8;
            assert_eq!(upload_percent(sent, total), Some(expected), "{sent}/{total}");
        }
    }
    assert_eq!(upload_percent(0, 0), None);
}

#[test]
fn progress_is_monotonic_within_a_session() {
    let mut progress = UploadProgress::new();
    progress.begin(1000).unwrap();

    let mut last = 0;
    for sent in [0, 100, 100, 250, 900, 1000] {
        let percent = progress.record(sent, 1000).unwrap();
        assert!(percent >= last);
        last = percent;
    }
    assert_eq!(last, 100);

    // A late report for fewer bytes is ignored.
    assert_eq!(progress.record(500, 1000), None);
    assert_eq!(progress.bytes_sent(), 1000);
}

#[test]
fn sent_never_exceeds_total() {
    let mut progress = UploadProgress::new();
    progress.begin(10).unwrap();
    assert_eq!(progress.record(15, 10), Some(100));
    assert_eq!(progress.bytes_sent(), 10);
    assert!(progress.bytes_sent() <= progress.bytes_total());
}

#[test]
fn reports_outside_uploading_are_ignored() {
    let mut progress = UploadProgress::new();
    assert_eq!(progress.record(5, 10), None);

    progress.begin(10).unwrap();
    assert_eq!(progress.record(5, 0), None);
    progress.finish().unwrap();
    assert_eq!(progress.record(10, 10), None);
}

#[test]
fn state_only_moves_forward() {
    let mut progress = UploadProgress::new();
    assert!(progress.finish().is_err());

    progress.begin(1).unwrap();
    assert_eq!(progress.state(), UploadState::Uploading);
    assert!(progress.begin(1).is_err());

    progress.fail().unwrap();
    assert_eq!(progress.state(), UploadState::Failed);
    assert!(progress.finish().is_err());
    assert!(progress.begin(1).is_err());
}
