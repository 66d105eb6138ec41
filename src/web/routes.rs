//! Stream route table
//!
//! Maps `/channel/{route_name}` path segments to the catalog channels whose
//! streams are resolved on demand. Built once at start-up from the catalog.

use std::collections::HashMap;
use tracing::debug;

use crate::catalog::Catalog;
use crate::errors::{AppError, AppResult};
use crate::models::Channel;

#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, Channel>,
}

impl RouteTable {
    /// One route per channel with a stream fetcher; duplicate names are rejected
    pub fn build(catalog: &Catalog) -> AppResult<Self> {
        let mut routes = HashMap::new();

        for channel in catalog.channels() {
            let Some(route_name) = channel.route_name() else {
                continue;
            };

            if let Some(existing) = routes.insert(route_name.to_string(), channel.clone()) {
                return Err(AppError::configuration(format!(
                    "Route name '{route_name}' is used by both {} and {}",
                    existing.name, channel.name
                )));
            }
            debug!(route = route_name, channel = %channel.name, "Registered stream route");
        }

        Ok(Self { routes })
    }

    pub fn get(&self, route_name: &str) -> Option<&Channel> {
        self.routes.get(route_name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
