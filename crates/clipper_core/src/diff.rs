/// Order-sensitive change check: a reordering counts as a change.
pub fn highlights_changed<S: AsRef<str>>(previous: &[S], current: &[S]) -> bool {
    previous.len() != current.len()
        || previous
            .iter()
            .zip(current)
            .any(|(before, after)| before.as_ref() != after.as_ref())
}

/// The highlight list last handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayedHighlightSet {
    last_known: Vec<String>,
}

impl DisplayedHighlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_known(&self) -> &[String] {
        &self.last_known
    }

    /// Replaces the snapshot iff `fresh` differs from it. Returns whether it did.
    pub fn reconcile(&mut self, fresh: &[String]) -> bool {
        if !highlights_changed(&self.last_known, fresh) {
            return false;
        }
        self.last_known = fresh.to_vec();
        true
    }

    pub fn reset(&mut self) {
        self.last_known.clear();
    }
}
