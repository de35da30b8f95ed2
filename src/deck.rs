//! Word pairs and the per-room draw queue.

use crate::error::GameError;
use crate::types::WordPair;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

/// Built-in pairs; an empty second word deals the undercover player no word at all
const BUILTIN_PAIRS: &[(&str, &str)] = &[
    ("Apple", "Android"),
    ("Pizza", "Burger"),
    ("Coffee", "Tea"),
    ("Dog", "Cat"),
    ("Summer", "Winter"),
    ("Island", ""),
    ("Desert", ""),
    ("Mountain", ""),
    ("Netflix", "Disney"),
    ("Google", "Apple"),
    ("Messi", "Ronaldo"),
    ("Dubai", ""),
    ("Tokyo", ""),
    ("Rome", ""),
    ("YouTube", "TikTok"),
    ("Facebook", "Instagram"),
    ("WhatsApp", "Telegram"),
    ("Amazon", "Walmart"),
    ("Beach", ""),
    ("Forest", ""),
    ("iPhone", "Android"),
    ("London", ""),
    ("Berlin", ""),
    ("Lion", "Tiger"),
    ("Batman", "Superman"),
    ("Pyramids", ""),
    ("TajMahal", ""),
    ("Train", "Airplane"),
    ("Volcano", ""),
    ("Paris", ""),
    ("Sydney", ""),
];

/// Immutable catalogue shared by every room
#[derive(Debug, Clone)]
pub struct WordCatalogue {
    pairs: Arc<[WordPair]>,
}

impl Default for WordCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WordCatalogue {
    pub fn builtin() -> Self {
        let pairs: Vec<WordPair> = BUILTIN_PAIRS
            .iter()
            .map(|(majority, minority)| WordPair::new(*majority, *minority))
            .collect();
        Self {
            pairs: pairs.into(),
        }
    }

    /// Build a catalogue, rejecting empty lists and blank majority words
    pub fn new(pairs: Vec<WordPair>) -> Result<Self, GameError> {
        if pairs.is_empty() {
            return Err(GameError::InvalidCatalogue("no word pairs".to_string()));
        }
        if let Some(idx) = pairs.iter().position(|p| p.majority.trim().is_empty()) {
            return Err(GameError::InvalidCatalogue(format!(
                "pair {} has an empty majority word",
                idx
            )));
        }
        Ok(Self {
            pairs: pairs.into(),
        })
    }

    /// Load a JSON file of the form `[["Coffee", "Tea"], ["Island", ""]]`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GameError::InvalidCatalogue(format!("{}: {}", path.display(), e)))?;
        let entries: Vec<(String, String)> = serde_json::from_str(&raw)
            .map_err(|e| GameError::InvalidCatalogue(format!("{}: {}", path.display(), e)))?;

        Self::new(
            entries
                .into_iter()
                .map(|(majority, minority)| WordPair::new(majority, minority))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Fresh draw queue for a new room
    pub fn deck(&self) -> WordDeck {
        WordDeck {
            catalogue: self.pairs.clone(),
            order: Vec::new(),
            cursor: 0,
        }
    }
}

/// Shuffled draw order over the catalogue.
///
/// No pair repeats within one pass; once the pass is used up the order is
/// reshuffled and drawing starts over.
#[derive(Debug, Clone)]
pub struct WordDeck {
    catalogue: Arc<[WordPair]>,
    order: Vec<usize>,
    cursor: usize,
}

impl WordDeck {
    pub fn draw(&mut self, rng: &mut impl Rng) -> WordPair {
        if self.remaining() == 0 {
            self.reshuffle(rng);
        }
        let idx = self.order[self.cursor];
        self.cursor += 1;
        self.catalogue[idx].clone()
    }

    /// Pairs left before the next reshuffle
    pub fn remaining(&self) -> usize {
        self.order.len().saturating_sub(self.cursor)
    }

    fn reshuffle(&mut self, rng: &mut impl Rng) {
        self.order = (0..self.catalogue.len()).collect();
        self.order.shuffle(rng);
        self.cursor = 0;
        tracing::debug!(pairs = self.order.len(), "Word deck reshuffled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::io::Write;

    fn small_catalogue() -> WordCatalogue {
        WordCatalogue::new(vec![
            WordPair::new("Dog", "Cat"),
            WordPair::new("Coffee", "Tea"),
            WordPair::new("Island", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_builtin_catalogue_is_valid() {
        let catalogue = WordCatalogue::builtin();
        assert!(!catalogue.is_empty());
        assert!(WordCatalogue::new(catalogue.pairs.to_vec()).is_ok());
    }

    #[test]
    fn test_no_repeats_within_a_pass() {
        let mut rng = StdRng::seed_from_u64(7);
        let catalogue = small_catalogue();
        let mut deck = catalogue.deck();

        let drawn: HashSet<String> = (0..catalogue.len())
            .map(|_| deck.draw(&mut rng).majority)
            .collect();
        assert_eq!(drawn.len(), catalogue.len());
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_reshuffles_when_exhausted() {
        let mut rng = StdRng::seed_from_u64(11);
        let catalogue = small_catalogue();
        let mut deck = catalogue.deck();

        for _ in 0..catalogue.len() {
            deck.draw(&mut rng);
        }
        // Never blocks: the next draw starts a new pass
        let _ = deck.draw(&mut rng);
        assert_eq!(deck.remaining(), catalogue.len() - 1);
    }

    #[test]
    fn test_rooms_do_not_share_draw_state() {
        let mut rng = StdRng::seed_from_u64(3);
        let catalogue = small_catalogue();
        let mut first = catalogue.deck();
        let second = catalogue.deck();

        first.draw(&mut rng);
        assert_eq!(first.remaining(), 2);
        assert_eq!(second.remaining(), 0);
    }

    #[test]
    fn test_rejects_empty_catalogue() {
        let err = WordCatalogue::new(vec![]).unwrap_err();
        assert_eq!(err.code(), "INVALID_CATALOGUE");

        let err = WordCatalogue::new(vec![WordPair::new("  ", "Tea")]).unwrap_err();
        assert!(err.to_string().contains("empty majority word"));
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[["Lion", "Tiger"], ["Volcano", ""]]"#).unwrap();

        let catalogue = WordCatalogue::from_json_file(file.path()).unwrap();
        assert_eq!(catalogue.len(), 2);

        let mut rng = StdRng::seed_from_u64(1);
        let mut deck = catalogue.deck();
        let words: HashSet<String> = (0..2).map(|_| deck.draw(&mut rng).majority).collect();
        assert!(words.contains("Lion"));
        assert!(words.contains("Volcano"));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = WordCatalogue::from_json_file(file.path()).unwrap_err();
        assert_eq!(err.code(), "INVALID_CATALOGUE");
    }
}
