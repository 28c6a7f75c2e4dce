use std::collections::HashMap;

use optgen::Optgen;

use crate::models::Upstream;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Peer {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tagged<T> {
    pub tag: String,
    pub value: T,
}

#[derive(Debug, Clone, Default, PartialEq, Optgen)]
pub struct Endpoint {
    #[optgen(debugmap = "visible", default = "0.0.0.0:443")]
    pub address: String,
    #[optgen(debugmap = "visible")]
    pub peers: Vec<Upstream>,
    #[optgen(debugmap = "visible")]
    pub history: Vec<Tagged<Peer>>,
    #[optgen(debugmap = "visible")]
    pub headers: HashMap<String, Vec<String>>,
    #[optgen(debugmap = "sensitive")]
    pub secure_key: Option<String>,
    internal_id: u64,
}

impl Endpoint {
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }
}
