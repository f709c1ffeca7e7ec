//! Endpoint resolution for the CLI.
//!
//! The SPARQL endpoint comes from the `--endpoint` flag, falling back to the
//! `GRAPHBENCH_ENDPOINT` environment variable so repeated runs against the
//! same repository need no flag.

use anyhow::{anyhow, Result};

/// Environment variable naming the SPARQL endpoint.
pub const ENDPOINT_ENV: &str = "GRAPHBENCH_ENDPOINT";

/// Resolves the endpoint from the flag or the environment.
pub fn resolve_endpoint(flag: Option<&str>) -> Result<String> {
    resolve_endpoint_from(flag, std::env::var(ENDPOINT_ENV).ok())
}

fn resolve_endpoint_from(flag: Option<&str>, env: Option<String>) -> Result<String> {
    flag.map(str::to_string).or(env).ok_or_else(|| {
        anyhow!(
            "the dataset contains generated queries but no SPARQL endpoint is \
             configured; pass --endpoint or set {}",
            ENDPOINT_ENV
        )
    })
}
