use anyhow::{Context, Result};

/// Connection settings for the hosted record platform, loaded from the
/// environment (a `.env` file is honored).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let base_url =
            std::env::var("DEALDECK_API_BASE_URL").context("DEALDECK_API_BASE_URL missing")?;
        let api_key = std::env::var("DEALDECK_API_KEY").context("DEALDECK_API_KEY missing")?;
        Ok(Self { base_url, api_key })
    }
}
