//! Configuration types for the figbind demo application.
//!
//! [`DemoConfig`] exercises every field shape: plain params, an optional
//! param, a param list, a dictionary, a nested node, a node list and a copy
//! node list. Names are written in snake case here and read in camel case
//! from the document.

use std::collections::BTreeMap;
use std::fmt;

use figbind::{
    Config, CopyNodeList, FieldType, Fields, InRange, NotEmpty, StreamPosition,
    StringConversionError, StringConverter, ValidationError,
};

#[derive(Debug, Default)]
pub struct DemoConfig {
    pub name: String,
    pub verbose: bool,
    pub tags: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub server: ServerConfig,
    pub upstreams: Vec<Upstream>,
    pub routes: CopyNodeList<Route>,
}

impl Config for DemoConfig {
    fn describe(fields: &mut Fields<Self>) {
        fields.field("name", |c| &mut c.name).ensure_with(NotEmpty);
        fields.field("verbose", |c| &mut c.verbose).with_default(false);
        fields.field("tags", |c| &mut c.tags).optional();
        fields.dict("env", |c| &mut c.env).optional();
        fields.node("server", |c| &mut c.server);
        fields.field("upstreams", |c| &mut c.upstreams).optional();
        fields.field("routes", |c| &mut c.routes).optional();
    }

    fn post_process(&mut self) -> Result<(), ValidationError> {
        for route in self.routes.iter() {
            if !self.upstreams.iter().any(|u| u.name == route.upstream) {
                return Err(ValidationError::new(format!(
                    "route '{}' points at unknown upstream '{}'",
                    route.path, route.upstream
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub log_level: LogLevel,
}

impl Config for ServerConfig {
    fn describe(fields: &mut Fields<Self>) {
        fields.param("host", |s| &mut s.host).with_default("127.0.0.1".to_string());
        fields.param("port", |s| &mut s.port).ensure_with(InRange::new(1, 65535));
        fields
            .param("max_connections", |s| &mut s.max_connections)
            .with_default(128)
            .ensure_with(InRange::new(1, 10_000));
        fields.param("log_level", |s| &mut s.log_level).optional();
    }
}

#[derive(Debug, Default, Clone)]
pub struct Upstream {
    pub name: String,
    pub address: String,
    pub weight: Option<u8>,
}

impl Config for Upstream {
    figbind::fields!(name, address, weight);

    // Upstream entries may carry notes for humans; ignore them.
    fn handle_unregistered_field(
        kind: FieldType,
        name: &str,
        position: StreamPosition,
    ) -> Result<(), figbind::ConfigError> {
        match (kind, name) {
            (FieldType::Param, "comment") => Ok(()),
            _ => Err(figbind::ConfigError::unknown_field(kind, name, position)),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Route {
    pub path: String,
    pub upstream: String,
    pub timeout_ms: u64,
}

impl Config for Route {
    fn describe(fields: &mut Fields<Self>) {
        fields.param("path", |r| &mut r.path);
        fields.param("upstream", |r| &mut r.upstream);
        fields.param("timeout_ms", |r| &mut r.timeout_ms).with_default(5_000);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
}

impl StringConverter for LogLevel {
    fn from_config_str(raw: &str) -> Result<Self, StringConversionError> {
        match raw {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            _ => Err(StringConversionError::new(
                "expected one of: debug, info, warn",
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
        }
    }
}
