//! Text tokenization
//!
//! Tokenizers turn raw text into [`Token`]s; an [`Analyzer`] folds tokens into
//! the `(term, count)` bag that the unigram models consume. Filters
//! ([`StopWordTokenizer`], [`StemmingTokenizer`]) wrap another tokenizer, so
//! chains are built inside out.

mod analyzer;

pub use analyzer::{Analyzer, AnalyzerRegistry, TextAnalyzer};

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use stop_words::LANGUAGE;

/// A term and its position in the token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub position: u32,
}

impl Token {
    pub fn new(text: impl Into<String>, position: u32) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// Splits text into tokens; shared across scoring threads
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        (**self).tokenize(text)
    }
}

fn numbered(words: impl Iterator<Item = String>) -> Vec<Token> {
    words
        .enumerate()
        .map(|(position, text)| Token::new(text, position as u32))
        .collect()
}

/// Whitespace-separated words, lowercased, with non-alphanumeric characters
/// removed. Words left empty are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseTokenizer;

impl Tokenizer for LowercaseTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        numbered(
            text.split_whitespace()
                .map(|word| {
                    word.chars()
                        .filter(|c| c.is_alphanumeric())
                        .flat_map(char::to_lowercase)
                        .collect::<String>()
                })
                .filter(|word| !word.is_empty()),
        )
    }
}

/// Maximal runs of alphabetic characters, lowercased.
///
/// Digits and punctuation both separate words, so "covid19-vaccine" yields
/// "covid" and "vaccine".
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaTokenizer;

impl Tokenizer for AlphaTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        numbered(
            text.split(|c: char| !c.is_alphabetic())
                .filter(|run| !run.is_empty())
                .map(str::to_lowercase),
        )
    }
}

/// Analysis languages with both a Snowball stemmer and a stop word list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    Dutch,
    #[default]
    English,
    French,
    German,
    Italian,
    Portuguese,
    Russian,
    Spanish,
}

impl Language {
    fn stemmer(self) -> Stemmer {
        let algorithm = match self {
            Language::Dutch => Algorithm::Dutch,
            Language::English => Algorithm::English,
            Language::French => Algorithm::French,
            Language::German => Algorithm::German,
            Language::Italian => Algorithm::Italian,
            Language::Portuguese => Algorithm::Portuguese,
            Language::Russian => Algorithm::Russian,
            Language::Spanish => Algorithm::Spanish,
        };
        Stemmer::create(algorithm)
    }

    fn stop_words(self) -> HashSet<String> {
        let language = match self {
            Language::Dutch => LANGUAGE::Dutch,
            Language::English => LANGUAGE::English,
            Language::French => LANGUAGE::French,
            Language::German => LANGUAGE::German,
            Language::Italian => LANGUAGE::Italian,
            Language::Portuguese => LANGUAGE::Portuguese,
            Language::Russian => LANGUAGE::Russian,
            Language::Spanish => LANGUAGE::Spanish,
        };
        stop_words::get(language)
            .into_iter()
            .map(|word| word.to_string())
            .collect()
    }
}

/// Drops stop words from an inner tokenizer's output and renumbers the
/// surviving positions.
#[derive(Debug, Clone)]
pub struct StopWordTokenizer<T> {
    inner: T,
    stop_words: HashSet<String>,
}

impl<T: Tokenizer> StopWordTokenizer<T> {
    pub fn new(inner: T, language: Language) -> Self {
        Self::with_stop_words(inner, language.stop_words())
    }

    pub fn english(inner: T) -> Self {
        Self::new(inner, Language::English)
    }

    pub fn with_stop_words(inner: T, stop_words: HashSet<String>) -> Self {
        Self { inner, stop_words }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}

impl<T: Tokenizer> Tokenizer for StopWordTokenizer<T> {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        numbered(
            self.inner
                .tokenize(text)
                .into_iter()
                .map(|token| token.text)
                .filter(|word| !self.is_stop_word(word)),
        )
    }
}

/// Snowball-stems every token of an inner tokenizer
pub struct StemmingTokenizer<T> {
    inner: T,
    language: Language,
    stemmer: Stemmer,
}

impl<T: Tokenizer> StemmingTokenizer<T> {
    pub fn new(inner: T, language: Language) -> Self {
        Self {
            inner,
            language,
            stemmer: language.stemmer(),
        }
    }

    pub fn english(inner: T) -> Self {
        Self::new(inner, Language::English)
    }
}

impl<T: Tokenizer> Tokenizer for StemmingTokenizer<T> {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.inner.tokenize(text);
        for token in &mut tokens {
            token.text = self.stemmer.stem(&token.text).into_owned();
        }
        tokens
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StemmingTokenizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemmingTokenizer")
            .field("inner", &self.inner)
            .field("language", &self.language)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_lowercase_tokenizer() {
        let tokens = LowercaseTokenizer.tokenize("Hello, World! 2024 ...");
        assert_eq!(texts(&tokens), vec!["hello", "world", "2024"]);
        assert_eq!(tokens[2].position, 2);
    }

    #[test]
    fn test_empty_text() {
        assert!(LowercaseTokenizer.tokenize("").is_empty());
        assert!(AlphaTokenizer.tokenize("  \n\t").is_empty());
        assert!(AlphaTokenizer.tokenize("42 -- 7").is_empty());
    }

    #[test]
    fn test_alpha_tokenizer_splits_on_digits() {
        let tokens = AlphaTokenizer.tokenize("COVID19-vaccine mandates");
        assert_eq!(texts(&tokens), vec!["covid", "vaccine", "mandates"]);
        assert_eq!(tokens[2].position, 2);
    }

    #[test]
    fn test_alpha_tokenizer_unicode() {
        let tokens = AlphaTokenizer.tokenize("Häuser und Bücher");
        assert_eq!(texts(&tokens), vec!["häuser", "und", "bücher"]);
    }

    #[test]
    fn test_stop_word_tokenizer() {
        let tokenizer = StopWordTokenizer::english(AlphaTokenizer);
        let tokens = tokenizer.tokenize("The abortion controversy and the evolution");
        assert_eq!(texts(&tokens), vec!["abortion", "controversy", "evolution"]);
        assert_eq!(tokens[2].position, 2);
        assert!(tokenizer.is_stop_word("the"));
    }

    #[test]
    fn test_custom_stop_words() {
        let stop: HashSet<String> = ["war".to_string()].into_iter().collect();
        let tokenizer = StopWordTokenizer::with_stop_words(AlphaTokenizer, stop);
        let tokens = tokenizer.tokenize("war and peace");
        assert_eq!(texts(&tokens), vec!["and", "peace"]);
    }

    #[test]
    fn test_stemming_tokenizer() {
        let tokenizer = StemmingTokenizer::english(LowercaseTokenizer);
        let tokens = tokenizer.tokenize("Dogs are running quickly");
        assert_eq!(texts(&tokens), vec!["dog", "are", "run", "quick"]);
    }

    #[test]
    fn test_german_chain() {
        let tokenizer = StemmingTokenizer::new(
            StopWordTokenizer::new(AlphaTokenizer, Language::German),
            Language::German,
        );
        let tokens = tokenizer.tokenize("Die Häuser und die Bäume");
        assert!(texts(&tokens).iter().all(|t| *t != "die" && *t != "und"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_boxed_tokenizer() {
        let boxed: Box<dyn Tokenizer> = Box::new(StopWordTokenizer::english(AlphaTokenizer));
        let tokens = boxed.tokenize("the gun debate");
        assert_eq!(texts(&tokens), vec!["gun", "debate"]);
    }
}
