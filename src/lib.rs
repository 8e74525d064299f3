//! Client for a STAC imagery catalog service.
//!
//! ```no_run
//! # async fn run() -> dgcatalog::Result<()> {
//! let client = dgcatalog::Client::new("user", None)?;
//! let item = client.get_item("1030010080D4FE00").await?;
//! assert_eq!(item.id(), Some("1030010080D4FE00"));
//! # Ok(())
//! # }
//! ```
mod auth;
mod client;
pub mod config;
mod credential;
mod endpoint;
mod error;
mod item;
mod response;
pub mod search;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use credential::{Credentials, PasswordPrompt, StdinPrompt};
pub use error::{Result, StacError};
pub use item::{validate_item_id, Catalog, Item};
pub use search::{SearchRequest, SpatialOperation};
