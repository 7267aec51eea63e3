//! TF-IDF vectors over the record corpus.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use trailmap_protocol::{ConfirmedRecord, RecordId};

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]+").expect("tokenizer pattern compiles"));

/// Lowercase, replace punctuation with spaces, keep tokens of two or more
/// characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default)]
struct DocumentVector {
    weights: HashMap<String, f64>,
    norm: f64,
}

/// TF-IDF weights for every record of a corpus.
///
/// IDF is smoothed as `ln((N + 1) / (df + 1)) + 1` and term frequency is
/// the raw count.
#[derive(Debug, Clone, Default)]
pub struct TfIdfCorpus {
    idf: HashMap<String, f64>,
    vectors: HashMap<RecordId, DocumentVector>,
}

impl TfIdfCorpus {
    /// Build from each record's `title url` text.
    pub fn build(records: &[ConfirmedRecord]) -> Self {
        Self::from_documents(
            records
                .iter()
                .map(|record| (record.id.clone(), record.embedding_text())),
        )
    }

    /// Build from `(id, text)` pairs.
    pub fn from_documents(documents: impl IntoIterator<Item = (RecordId, String)>) -> Self {
        let tokenized: Vec<(RecordId, Vec<String>)> = documents
            .into_iter()
            .map(|(id, text)| (id, tokenize(&text)))
            .collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for (_, tokens) in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for token in unique {
                *df.entry(token).or_default() += 1;
            }
        }
        let n = tokenized.len() as f64;
        let idf: HashMap<String, f64> = df
            .into_iter()
            .map(|(token, count)| {
                let weight = ((n + 1.0) / (count as f64 + 1.0)).ln() + 1.0;
                (token.to_string(), weight)
            })
            .collect();

        let vectors = tokenized
            .into_iter()
            .map(|(id, tokens)| {
                let mut counts: HashMap<String, f64> = HashMap::new();
                for token in tokens {
                    *counts.entry(token).or_default() += 1.0;
                }
                let weights: HashMap<String, f64> = counts
                    .into_iter()
                    .map(|(token, tf)| {
                        let weight = tf * idf.get(&token).copied().unwrap_or_default();
                        (token, weight)
                    })
                    .collect();
                let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
                (id, DocumentVector { weights, norm })
            })
            .collect();

        Self { idf, vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// IDF of a token seen in the corpus.
    pub fn idf(&self, token: &str) -> Option<f64> {
        self.idf.get(token).copied()
    }

    /// Weight of `token` in a document.
    pub fn weight(&self, id: &str, token: &str) -> Option<f64> {
        self.vectors.get(id)?.weights.get(token).copied()
    }

    /// Cosine similarity of two documents in [0, 1]; 0 for unknown ids.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        match (self.vectors.get(a), self.vectors.get(b)) {
            (Some(left), Some(right)) => cosine(left, right),
            _ => 0.0,
        }
    }
}

fn cosine(left: &DocumentVector, right: &DocumentVector) -> f64 {
    if left.norm == 0.0 || right.norm == 0.0 {
        return 0.0;
    }
    let (small, large) = if left.weights.len() <= right.weights.len() {
        (&left.weights, &right.weights)
    } else {
        (&right.weights, &left.weights)
    };
    let dot: f64 = small
        .iter()
        .filter_map(|(token, weight)| large.get(token).map(|other| weight * other))
        .sum();
    (dot / (left.norm * right.norm)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn corpus(docs: &[(&str, &str)]) -> TfIdfCorpus {
        TfIdfCorpus::from_documents(
            docs.iter()
                .map(|(id, text)| (id.to_string(), text.to_string())),
        )
    }

    #[test]
    fn tokenizer_strips_punctuation_and_short_tokens() {
        assert_eq!(
            tokenize("React Hooks: a guide https://react.dev/learn"),
            vec!["react", "hooks", "guide", "https", "react", "dev", "learn"]
        );
        assert_eq!(tokenize("フック入門 x"), vec!["フック入門"]);
    }

    #[test]
    fn idf_is_smoothed() {
        let corpus = corpus(&[("a", "rust tokio"), ("b", "rust rayon")]);
        assert_relative_eq!(corpus.idf("rust").unwrap_or_default(), 1.0);
        assert_relative_eq!(
            corpus.idf("tokio").unwrap_or_default(),
            (3.0f64 / 2.0).ln() + 1.0
        );
        assert_eq!(corpus.idf("missing"), None);
    }

    #[test]
    fn identical_documents_score_one() {
        let corpus = corpus(&[("a", "rust tokio"), ("b", "rust tokio"), ("c", "css grid")]);
        assert_relative_eq!(corpus.similarity("a", "b"), 1.0, epsilon = 1e-9);
        assert_eq!(corpus.similarity("a", "c"), 0.0);
        assert_eq!(corpus.similarity("a", "zzz"), 0.0);
    }

    #[test]
    fn empty_document_scores_zero() {
        let corpus = corpus(&[("a", "!"), ("b", "rust")]);
        assert_eq!(corpus.similarity("a", "b"), 0.0);
        assert_eq!(corpus.len(), 2);
    }
}
