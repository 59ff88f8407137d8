//! Server configuration, read from CLI flags with environment fallbacks

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Settings for the HTTP server
#[derive(Args, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to bind to
    #[arg(long, env = "DOCQA_ADDR", default_value = "0.0.0.0:5000")]
    pub addr: String,

    /// Results returned by ranking endpoints when the request omits `topK`
    #[arg(long, env = "DOCQA_DEFAULT_TOP_K", default_value_t = 5)]
    pub default_top_k: usize,

    /// Seed for example sampling. Unset means a fresh random seed per request.
    #[arg(long, env = "DOCQA_SEED")]
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:5000".to_string(),
            default_top_k: 5,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Random source for one request's example sampling.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
