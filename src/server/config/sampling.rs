use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_MAX_TOKENS: u32 = 1024;
const MAX_TOKENS_LIMIT: u32 = 32_768;

/// Settings for nested `sampling/createMessage` requests.
#[derive(Debug, Clone)]
pub struct SamplingSection {
    pub max_tokens: u32,
}

impl Default for SamplingSection {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawSamplingSection {
    pub max_tokens: Option<u32>,
}

pub fn parse_sampling_section(
    raw: Option<RawSamplingSection>,
) -> Result<SamplingSection, ConfigError> {
    let max_tokens = raw
        .unwrap_or_default()
        .max_tokens
        .unwrap_or(DEFAULT_MAX_TOKENS);
    if !(1..=MAX_TOKENS_LIMIT).contains(&max_tokens) {
        return Err(ConfigError::InvalidField {
            field: "sampling.max_tokens",
            message: format!("Specify a value between 1 and {MAX_TOKENS_LIMIT}"),
        });
    }
    Ok(SamplingSection { max_tokens })
}
