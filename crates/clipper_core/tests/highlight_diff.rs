use clipper_core::{highlights_changed, DisplayedHighlightSet};

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn identical_lists_are_unchanged() {
    assert!(!highlights_changed::<String>(&[], &[]));
    assert!(!highlights_changed(&names(&["a.mp4", "b.mp4"]), &names(&["a.mp4", "b.mp4"])));
}

#[test]
fn reorder_truncation_and_extension_are_changes() {
    let base = names(&["a.mp4", "b.mp4"]);
    assert!(highlights_changed(&base, &names(&["b.mp4", "a.mp4"])));
    assert!(highlights_changed(&base, &names(&["a.mp4"])));
    assert!(highlights_changed(&base, &names(&["a.mp4", "b.mp4", "c.mp4"])));
    assert!(highlights_changed(&base, &names(&["a.mp4", "x.mp4"])));
}

#[test]
fn displayed_set_updates_only_on_change() {
    let mut displayed = DisplayedHighlightSet::new();
    assert!(!displayed.reconcile(&[]));
    assert!(displayed.reconcile(&names(&["a.mp4"])));
    assert!(!displayed.reconcile(&names(&["a.mp4"])));
    assert_eq!(displayed.last_known(), names(&["a.mp4"]).as_slice());

    displayed.reset();
    assert!(displayed.last_known().is_empty());
    assert!(displayed.reconcile(&names(&["a.mp4"])));
}
