use hashbrown::HashMap;

use crate::errors::{FdaError, Result};
use crate::sentence::{Sentence, Token};

/// Word interner mapping surface strings to [`Token`] ids in first-seen order.
///
/// # Examples
///
/// ```
/// use fda::Vocabulary;
///
/// let mut vocab = Vocabulary::new();
/// let s = vocab.sentence("the cat saw the dog").unwrap();
/// assert_eq!(&[0, 1, 2, 0, 3], s.tokens());
/// assert_eq!("the cat saw the dog", vocab.render(&s));
/// ```
#[derive(Debug, Default)]
pub struct Vocabulary {
    ids: HashMap<String, Token>,
    words: Vec<String>,
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the id of `word`, assigning a fresh one if it was never seen.
    ///
    /// # Errors
    ///
    /// [`FdaError::InvalidArgument`] will be returned if the id space is exhausted.
    pub fn get_id(&mut self, word: &str) -> Result<Token> {
        if let Some(&id) = self.ids.get(word) {
            return Ok(id);
        }
        let id = Token::try_from(self.words.len())
            .map_err(|_| FdaError::invalid_argument("word", "too many distinct words"))?;
        self.words.push(word.to_string());
        self.ids.insert(word.to_string(), id);
        Ok(id)
    }

    /// Gets the surface string of `id`, if assigned.
    pub fn word(&self, id: Token) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    /// Gets the number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Checks if no word has been interned.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Interns a whitespace-separated line into a [`Sentence`].
    ///
    /// Runs of whitespace count as one separator. A blank line yields an empty sentence.
    ///
    /// # Errors
    ///
    /// See [`Vocabulary::get_id`].
    pub fn sentence(&mut self, line: &str) -> Result<Sentence> {
        let tokens = line
            .split_whitespace()
            .map(|word| self.get_id(word))
            .collect::<Result<Vec<_>>>()?;
        Ok(Sentence::new(tokens))
    }

    /// Joins the surfaces of a sentence with single spaces.
    ///
    /// Ids unknown to this vocabulary are rendered as `<unk:ID>`.
    pub fn render(&self, sentence: &Sentence) -> String {
        let mut result = String::new();
        for (i, &id) in sentence.tokens().iter().enumerate() {
            if i != 0 {
                result.push(' ');
            }
            match self.word(id) {
                Some(word) => result.push_str(word),
                None => result.push_str(&format!("<unk:{}>", id)),
            }
        }
        result
    }
}
