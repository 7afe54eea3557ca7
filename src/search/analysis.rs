//! Analyzer selection
//!
//! Analyzed fields are tokenized by the analyzer named in [`SearchConfig`](super::SearchConfig).
//! The same tokenizer manager backs indexing, analyzed-text clauses and highlighting,
//! so fragments always line up with the terms that matched.

use serde::{Deserialize, Serialize};
use tantivy::tokenizer::{
    LowerCaser, NgramTokenizer, RemoveLongFilter, TextAnalyzer, Token, TokenFilter, TokenStream,
    Tokenizer, TokenizerManager,
};

/// Tokenizer name registered for [`Analyzer::Cjk`]
pub const CJK_TOKENIZER: &str = "docsearch_cjk";

/// Analyzer applied to analyzed-stored fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    /// Word tokenizer, long-token removal and lowercasing
    #[default]
    Standard,
    /// Standard pipeline plus English stemming
    English,
    /// Split on whitespace only
    Whitespace,
    /// Character unigrams and bigrams, for text without word separators
    Cjk,
}

impl Analyzer {
    /// Name under which the engine resolves this analyzer
    pub fn tokenizer_name(&self) -> &'static str {
        match self {
            Analyzer::Standard => "default",
            Analyzer::English => "en_stem",
            Analyzer::Whitespace => "whitespace",
            Analyzer::Cjk => CJK_TOKENIZER,
        }
    }

    /// Separator placed between phrase terms before analysis
    pub(crate) fn phrase_separator(&self) -> &'static str {
        match self {
            Analyzer::Cjk => "",
            _ => " ",
        }
    }
}

/// Numbers tokens in emission order.
///
/// `NgramTokenizer` leaves every token at position 0, so phrase matching needs this.
#[derive(Clone)]
struct SequentialPositions;

impl TokenFilter for SequentialPositions {
    type Tokenizer<T: Tokenizer> = SequentialPositionsTokenizer<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> Self::Tokenizer<T> {
        SequentialPositionsTokenizer(tokenizer)
    }
}

#[derive(Clone)]
struct SequentialPositionsTokenizer<T>(T);

impl<T: Tokenizer> Tokenizer for SequentialPositionsTokenizer<T> {
    type TokenStream<'a> = SequentialPositionsStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        SequentialPositionsStream {
            inner: self.0.token_stream(text),
            next: 0,
        }
    }
}

struct SequentialPositionsStream<S> {
    inner: S,
    next: usize,
}

impl<S: TokenStream> TokenStream for SequentialPositionsStream<S> {
    fn advance(&mut self) -> bool {
        if !self.inner.advance() {
            return false;
        }
        self.inner.token_mut().position = self.next;
        self.next += 1;
        true
    }

    fn token(&self) -> &Token {
        self.inner.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.inner.token_mut()
    }
}

fn cjk_analyzer() -> tantivy::Result<TextAnalyzer> {
    Ok(TextAnalyzer::builder(NgramTokenizer::new(1, 2, false)?)
        .filter(SequentialPositions)
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .build())
}

/// Register the analyzers the engine does not ship by default.
///
/// Tokenizers are not persisted with the index, so this must run on every opened index.
pub fn register_analyzers(manager: &TokenizerManager) -> tantivy::Result<()> {
    manager.register(CJK_TOKENIZER, cjk_analyzer()?);
    Ok(())
}

/// Tokenizer manager with every [`Analyzer`] available
pub fn tokenizer_manager() -> tantivy::Result<TokenizerManager> {
    let manager = TokenizerManager::default();
    register_analyzers(&manager)?;
    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(analyzer: Analyzer, text: &str) -> Vec<String> {
        let manager = tokenizer_manager().unwrap();
        let mut tokenizer = manager.get(analyzer.tokenizer_name()).unwrap();
        let mut stream = tokenizer.token_stream(text);
        let mut out = Vec::new();
        while stream.advance() {
            out.push(stream.token().text.clone());
        }
        out
    }

    #[test]
    fn test_every_analyzer_is_registered() {
        let manager = tokenizer_manager().unwrap();
        for analyzer in [
            Analyzer::Standard,
            Analyzer::English,
            Analyzer::Whitespace,
            Analyzer::Cjk,
        ] {
            assert!(manager.get(analyzer.tokenizer_name()).is_some());
        }
    }

    #[test]
    fn test_standard_lowercases_words() {
        assert_eq!(tokens(Analyzer::Standard, "Hello, World"), vec!["hello", "world"]);
    }

    #[test]
    fn test_cjk_positions_follow_emission_order() {
        let manager = tokenizer_manager().unwrap();
        let mut tokenizer = manager.get(CJK_TOKENIZER).unwrap();
        let mut stream = tokenizer.token_stream("明月光");
        let mut positions = Vec::new();
        while stream.advance() {
            positions.push(stream.token().position);
        }
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cjk_emits_bigrams() {
        let grams = tokens(Analyzer::Cjk, "李白诗");
        assert!(grams.contains(&"李白".to_string()));
        assert!(grams.contains(&"白诗".to_string()));
        assert!(grams.contains(&"李".to_string()));
    }
}
