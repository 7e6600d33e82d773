use serde::{Deserialize, Serialize};
use crate::core::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub collection_size: usize,    // Documents in the collection (accumulator slots)
    pub top_k: usize,              // Results retained per query
    pub arena_block_size: usize,   // Bytes per arena backing block
    pub max_term_length: usize,    // Longer query terms are dropped by the parser
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig {
            collection_size: 1024,
            top_k: 10,
            arena_block_size: 1024 * 1024,  // 1MB per block
            max_term_length: 255,
        }
    }
}

impl ScorerConfig {
    pub fn new(collection_size: usize, top_k: usize) -> Self {
        ScorerConfig {
            collection_size,
            top_k,
            ..ScorerConfig::default()
        }
    }

    /// Load a config from JSON; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ScorerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collection_size == 0 {
            return Err(Error::invalid_argument("collection_size must be at least 1"));
        }
        if self.top_k == 0 {
            return Err(Error::invalid_argument("top_k must be at least 1"));
        }
        if self.arena_block_size == 0 {
            return Err(Error::invalid_argument("arena_block_size must be at least 1"));
        }
        if self.max_term_length == 0 {
            return Err(Error::invalid_argument("max_term_length must be at least 1"));
        }
        Ok(())
    }
}
