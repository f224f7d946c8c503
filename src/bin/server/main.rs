#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Bulk email dispatch service

use std::sync::Arc;

use anyhow::Result;
use bulk_dispatch::{
    domain::dispatch::{config::DispatchConfig, service::DispatchServiceImpl},
    infrastructure::{
        http::{HttpServer, HttpServerConfig},
        provider::http::{HttpProvider, ProviderConfig},
    },
};
use clap::Parser;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The dispatch pipeline configuration
    #[clap(flatten)]
    pub dispatch: DispatchConfig,

    /// The provider connection details
    #[clap(flatten)]
    pub provider: ProviderConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Failed to load environment: {}", e);

        return Err(e.into());
    }

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let provider = Arc::new(HttpProvider::new(args.provider)?);
    let dispatcher = DispatchServiceImpl::new(provider, args.dispatch);

    HttpServer::new(dispatcher, args.server).await?.run().await
}
