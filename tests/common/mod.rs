// Shared test helpers

#![allow(dead_code)]

use hubwatch::config::GroupDef;
use hubwatch::models::RawServer;
use std::collections::HashSet;

pub fn server(name: &str, players: u32) -> RawServer {
    RawServer {
        name: name.to_string(),
        players,
        tags: HashSet::new(),
    }
}

pub fn tagged_server(name: &str, players: u32, tags: &[&str]) -> RawServer {
    RawServer {
        name: name.to_string(),
        players,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn group(name: &str, keywords: &[&str]) -> GroupDef {
    GroupDef {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}
