//! Term extraction and alias normalisation.

use crate::model::Ontology;

impl Ontology {
    /// Canonical terms whose name or alias occurs in `text`.
    ///
    /// Matching is a case-insensitive substring test with no overlap
    /// resolution, so short aliases can match inside longer words. Results
    /// follow ontology order and contain no duplicates.
    pub fn extract_terms(&self, text: &str) -> Vec<String> {
        self.matched_indices(text)
            .map(|idx| self.terms()[idx].name.clone())
            .collect()
    }

    /// Canonical name for an exact (case-insensitive) name or alias.
    pub fn normalize_alias(&self, alias: &str) -> Option<&str> {
        let wanted = alias.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.needles
            .iter()
            .position(|needles| needles.contains(&wanted))
            .map(|idx| self.terms()[idx].name.as_str())
    }

    pub(crate) fn matched_indices(&self, text: &str) -> impl Iterator<Item = usize> + '_ {
        let lowered = text.to_lowercase();
        self.needles
            .iter()
            .enumerate()
            .filter(move |(_, needles)| {
                !lowered.is_empty() && needles.iter().any(|needle| lowered.contains(needle.as_str()))
            })
            .map(|(idx, _)| idx)
    }
}
