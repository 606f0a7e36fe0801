//! Research Metrics
//!
//! Retrieval and aggregation behind three research-metrics dashboards, built
//! on the OpenAlex works API and PubMed E-utilities:
//!
//! - **Clinical trials**: which works citing a DOI are clinical trials
//! - **Global South**: yearly share of works with Global-South collaborators,
//!   globally and for selected institutions
//! - **Co-author network**: co-authors and affiliations of selected authors
//!
//! Queries run through a shared [`client::ScholarlyClient`] (cursor
//! pagination, retries, response cache) and publish immutable snapshots into a
//! [`session::Session`], where only the most recent query may publish.
//!
//! # Example
//!
//! ```no_run
//! use research_metrics::{config::Config, pipeline::{self, PipelineContext}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = PipelineContext::from_config(Config::from_env()?)?;
//!     let report = pipeline::get_data(&ctx, "10.3389/fnsys.2013.00031").await?;
//!     println!("{} citing works, {} trials", report.works.len(), report.trial_count());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod identifiers;
pub mod models;
pub mod network;
pub mod pipeline;
pub mod server;
pub mod session;

pub use client::ScholarlyClient;
pub use config::Config;
pub use error::{ClientError, PipelineError};
