use once_cell::sync::Lazy;
use porter_stemmer::stem;
use std::collections::HashSet;

static STOP_WORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    stop_words::get(stop_words::LANGUAGE::English)
        .into_iter()
        .map(|x| x.to_string())
        .collect()
});

/// A character filter receives the original text and can transform it by adding, removing, or
/// changing characters before tokenization. Listing titles routinely mix full-width and half-width
/// forms ("ＳＯＮＹ" vs "SONY"), so folding them is the first step.
pub trait CharacterFilter: Send + Sync {
    fn filter(&self, text: String) -> String;
}

/// Folds full-width ASCII variants (U+FF01..=U+FF5E) and the ideographic space to their
/// half-width equivalents.
#[derive(Debug, Default)]
pub struct FullWidthFoldFilter;

impl CharacterFilter for FullWidthFoldFilter {
    fn filter(&self, text: String) -> String {
        text.chars()
            .map(|c| match c {
                '\u{3000}' => ' ',
                '\u{FF01}'..='\u{FF5E}' => {
                    char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
                }
                _ => c,
            })
            .collect()
    }
}

/// A tokenizer receives a stream of characters, breaks it up into individual tokens,
/// and outputs a stream of tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: String) -> Vec<String>;
}

/// Splits text into maximal runs of one "word" alphabet: ASCII letters and digits, hiragana,
/// katakana (with the prolonged sound mark) and CJK ideographs. Anything else separates
/// tokens. Output is lowercased.
///
/// Japanese has no spaces, so a run such as "スマートテレビ" stays one token; relevance
/// matching handles containment (see [`crate::scoring::relevance`]).
pub struct ScriptRunTokenizer;

impl ScriptRunTokenizer {
    pub fn is_word_char(c: char) -> bool {
        c.is_ascii_alphanumeric()
            || ('\u{3041}'..='\u{3093}').contains(&c) // hiragana
            || ('\u{30A1}'..='\u{30F3}').contains(&c) // katakana
            || ('\u{4E00}'..='\u{9FA5}').contains(&c) // CJK ideographs
            || c == 'ー'
    }
}

impl Tokenizer for ScriptRunTokenizer {
    fn tokenize(&self, text: String) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !Self::is_word_char(c))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

/// A token filter receives the token stream and may add, remove, or change tokens.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken>;
}

pub struct StopWordTokenFilter;

impl TokenFilter for StopWordTokenFilter {
    fn filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens.retain(|w| !STOP_WORDS.contains(&w.term));
        tokens
    }
}

/// Stems plain English words. Tokens containing digits or non-ASCII script are left alone,
/// model numbers and Japanese terms have no stem.
pub struct PorterStemmerTokenFilter;

impl TokenFilter for PorterStemmerTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .map(|mut w| {
                if w.term.chars().all(|c| c.is_ascii_alphabetic()) {
                    w.term = stem(&w.term);
                }
                w
            })
            .collect::<Vec<TextToken>>()
    }
}

/// Keeps the first occurrence of every term.
pub struct DedupTokenFilter;

impl TokenFilter for DedupTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        let mut seen = HashSet::new();
        tokens
            .into_iter()
            .filter(|t| seen.insert(t.term.clone()))
            .collect()
    }
}

/// Pure text analysis pipeline - no async, no I/O, just text transformations
pub struct TextAnalyzer {
    char_filters: Vec<Box<dyn CharacterFilter>>,
    tokenizer: Box<dyn Tokenizer>,
    token_filters: Vec<Box<dyn TokenFilter>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextToken {
    pub term: String,
    pub pos: usize,
}

impl Default for TextAnalyzer {
    /// The analyzer used for both relevance tokens and listing names.
    fn default() -> Self {
        TextAnalyzer::new(
            vec![Box::new(FullWidthFoldFilter)],
            Box::new(ScriptRunTokenizer),
            vec![
                Box::new(StopWordTokenFilter),
                Box::new(PorterStemmerTokenFilter),
                Box::new(DedupTokenFilter),
            ],
        )
    }
}

impl TextAnalyzer {
    pub fn new(
        char_filters: Vec<Box<dyn CharacterFilter>>,
        tokenizer: Box<dyn Tokenizer>,
        token_filters: Vec<Box<dyn TokenFilter>>,
    ) -> Self {
        Self {
            char_filters,
            tokenizer,
            token_filters,
        }
    }

    pub fn char_filter(&self, mut content: String) -> String {
        for filter in self.char_filters.iter() {
            content = filter.filter(content);
        }
        content
    }

    pub fn tokenize(&self, content: String) -> Vec<TextToken> {
        let tokens = self.tokenizer.tokenize(content);
        tokens
            .into_iter()
            .enumerate()
            .map(|(idx, term)| TextToken { term, pos: idx })
            .collect()
    }

    pub fn token_filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        for filter in self.token_filters.iter() {
            tokens = filter.filter(tokens);
        }
        tokens
    }

    /// Analyzes raw content and returns a list of tokens
    pub fn analyze(&self, raw_content: &str) -> Vec<TextToken> {
        let content = self.char_filter(raw_content.to_string());
        let tokens = self.tokenize(content);
        self.token_filter(tokens)
    }

    /// Same as [`TextAnalyzer::analyze`] but keeps only the terms.
    pub fn terms(&self, raw_content: &str) -> Vec<String> {
        self.analyze(raw_content).into_iter().map(|t| t.term).collect()
    }
}
