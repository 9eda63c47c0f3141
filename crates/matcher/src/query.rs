/// Lowercases `text` and splits it into alphanumeric words.
pub fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// A caller's query with the derived forms each scoring mode needs.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    lowered: String,
    words: Vec<String>,
    significant: Vec<String>,
    key_words: Vec<String>,
}

impl Query {
    pub fn parse(raw: &str, min_word_len: usize) -> Self {
        let raw = raw.trim().to_string();
        let lowered = raw.to_lowercase();
        let words = normalize_words(&raw);
        let significant = words
            .iter()
            .filter(|w| w.chars().count() >= min_word_len)
            .cloned()
            .collect();
        let key_words = lowered
            .split(|c: char| c == '_' || c.is_whitespace())
            .filter(|w| w.chars().count() >= min_word_len)
            .map(str::to_string)
            .collect();

        Self { raw, lowered, words, significant, key_words }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Words long enough to count as evidence.
    pub fn significant(&self) -> &[String] {
        &self.significant
    }

    /// Words split on `_` and whitespace only, for key-subset scoring.
    pub fn key_words(&self) -> &[String] {
        &self.key_words
    }

    /// Words joined with single spaces.
    pub fn normalized(&self) -> String {
        self.words.join(" ")
    }

    /// Words joined with `_`, comparable to a key's descriptive tail.
    pub fn as_key_tail(&self) -> String {
        self.words.join("_")
    }

    pub fn is_wildcard(&self) -> bool {
        self.raw.contains('*')
    }

    /// Key-shaped but incomplete: no `_`, a trailing `_`, or a wildcard.
    pub fn is_partial_key(&self) -> bool {
        !self.raw.contains('_') || self.raw.ends_with('_') || self.is_wildcard()
    }
}
