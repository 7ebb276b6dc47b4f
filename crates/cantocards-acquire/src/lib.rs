pub mod client;
pub mod normalize;
pub mod types;
pub mod wordlist;

pub use client::{lookup_all, AudioFetcher, DictionarySearch, StephenLiClient};
pub use types::{LookupError, RawResult, SourceLanguage};
pub use wordlist::{load_level, load_word_list, HskLevel};
