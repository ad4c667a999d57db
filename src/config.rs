use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the hosted backend (e.g. "https://xyz.supabase.co").
    /// When unset the service runs against an empty in-memory backend.
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Anonymous API key for the hosted backend
    #[serde(default)]
    pub backend_api_key: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Capacity of the background activity write queue
    #[serde(default = "default_activity_queue_capacity")]
    pub activity_queue_capacity: usize,

    /// Number of recent activity events read per recommendation
    #[serde(default = "default_activity_history_limit")]
    pub activity_history_limit: usize,

    /// Number of top categories used to select recommendation candidates
    #[serde(default = "default_category_fanout")]
    pub recommendation_category_fanout: usize,

    /// Optional cap on orders read per recommendation (unbounded when unset)
    #[serde(default)]
    pub order_history_limit: Option<usize>,

    /// Default size of the featured products list
    #[serde(default = "default_featured_limit")]
    pub featured_limit: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_activity_queue_capacity() -> usize {
    1024
}

fn default_activity_history_limit() -> usize {
    50
}

fn default_category_fanout() -> usize {
    3
}

fn default_featured_limit() -> usize {
    8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            backend_api_key: String::new(),
            host: default_host(),
            port: default_port(),
            activity_queue_capacity: default_activity_queue_capacity(),
            activity_history_limit: default_activity_history_limit(),
            recommendation_category_fanout: default_category_fanout(),
            order_history_limit: None,
            featured_limit: default_featured_limit(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
