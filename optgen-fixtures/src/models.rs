use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use optgen::Optgen;

#[derive(Debug, Clone, Default, PartialEq, Optgen)]
pub struct Server {
    #[optgen(debugmap = "visible", default = "localhost")]
    pub host: String,
    #[optgen(debugmap = "visible-format", default = 8080)]
    pub port: u16,
    #[optgen(debugmap = "visible")]
    pub tags: Vec<String>,
    #[optgen(debugmap = "visible")]
    pub labels: HashMap<String, String>,
    #[optgen(debugmap = "sensitive")]
    pub secure_token: String,
    #[optgen(debugmap = "hidden", default = Some(Duration::from_secs(30)))]
    pub timeout: Option<Duration>,
    #[optgen(debugmap = "visible")]
    pub limits: BTreeMap<String, u32>,
    #[optgen(debugmap = "visible")]
    pub upstream: Option<Box<Upstream>>,
    #[optgen(debugmap = "visible")]
    pub weights: [u8; 4],
    #[optgen(debugmap = "visible")]
    pub shared: Arc<String>,
    #[optgen(debugmap = "visible-format")]
    pub(crate) retries: u8,
    attempts: u32,
}

impl Server {
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Optgen)]
pub struct Upstream {
    #[optgen(debugmap = "visible")]
    pub address: String,
    #[optgen(debugmap = "visible", default = "tcp")]
    pub r#type: String,
}

include!(concat!(env!("OUT_DIR"), "/models_opts.rs"));
