pub mod normalizer;
pub mod vocabulary;
pub mod word_cloud;

pub use normalizer::{canonicalize, clean_text, tokenize, TextNormalizer};
pub use word_cloud::{extract_top_keywords, WordCloudConfig, WordCloudEngine};
