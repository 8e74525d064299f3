use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use dgcatalog::{Client, ClientConfig, Item, SearchRequest, SpatialOperation};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Query a STAC imagery catalog
#[derive(Parser, Debug)]
#[command(name = "dgcatalog", version)]
struct Cli {
    /// TOML file with stac_url, auth_url and timeout_secs
    #[arg(long)]
    config: Option<PathBuf>,

    /// STAC service URL
    #[arg(long, env = "STAC_SERVICE_URL")]
    url: Option<String>,

    /// Token service URL
    #[arg(long, env = "STAC_AUTH_URL")]
    auth_url: Option<String>,

    #[arg(short, long, env = "STAC_USERNAME")]
    username: Option<String>,

    /// Prompted for when a username is given without one
    #[arg(long, env = "STAC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[arg(long, env = "STAC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log requests and responses
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a single item
    GetItem {
        id: String,
        /// Validate the item as a typed STAC item before printing
        #[arg(long)]
        strict: bool,
    },
    /// Search for items
    Search {
        #[arg(long)]
        catalog: Option<String>,
        /// xmin,ymin,xmax,ymax or xmin,ymin,zmin,xmax,ymax,zmax
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        bbox: Option<Vec<f64>>,
        /// File holding a GeoJSON geometry
        #[arg(long)]
        geometry: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Op::Intersect)]
        op: Op,
        #[arg(long, requires = "end")]
        start: Option<DateTime<Utc>>,
        #[arg(long, requires = "start")]
        end: Option<DateTime<Utc>>,
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },
    /// List all catalogs
    Catalogs,
    /// Print a single catalog
    Catalog { id: String },
    /// Insert an item read from a JSON file
    InsertItem {
        file: PathBuf,
        #[arg(long)]
        catalog: String,
    },
    DeleteItem { id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Op {
    Intersect,
    Contains,
    Bbox,
}

impl From<Op> for SpatialOperation {
    fn from(op: Op) -> Self {
        match op {
            Op::Intersect => SpatialOperation::Intersect,
            Op::Contains => SpatialOperation::Contains,
            Op::Bbox => SpatialOperation::IntersectBbox,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "dgcatalog=debug" } else { "dgcatalog=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(cli: &Cli) -> Result<Client> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::read(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.stac_url = url.clone();
    }
    if let Some(url) = &cli.auth_url {
        config.auth_url = url.clone();
    }

    let mut builder = Client::builder().config(config);
    if let Some(token) = &cli.token {
        builder = builder.token(token);
    }
    if let Some(username) = &cli.username {
        builder = builder.username(username);
    }
    if let Some(password) = &cli.password {
        builder = builder.password(password);
    }
    Ok(builder.build()?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let client = build_client(&cli)?;

    match cli.command {
        Command::GetItem { id, strict } => {
            let item = client.get_item(&id).await?;
            if strict {
                item.to_stac()?;
            }
            print_json(&item)?;
        }
        Command::Search {
            catalog,
            bbox,
            geometry,
            op,
            start,
            end,
            ids,
        } => {
            let mut request = SearchRequest::new().spatial_operation(op.into()).ids(ids);
            request.catalog_id = catalog;
            request.bbox = bbox;
            request.start_datetime = start;
            request.end_datetime = end;
            if let Some(path) = geometry {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("reading geometry {}", path.display()))?;
                request.geometry = Some(serde_json::from_str(&content)?);
            }
            let items = client.search(&request).await?;
            print_json(&items)?;
        }
        Command::Catalogs => print_json(&client.list_catalogs().await?)?,
        Command::Catalog { id } => print_json(&client.get_catalog(&id).await?)?,
        Command::InsertItem { file, catalog } => {
            let item = Item::read(&file)?;
            if let Some(content) = client.insert_item(&item, &catalog).await? {
                print_json(&content)?;
            }
        }
        Command::DeleteItem { id } => {
            if let Some(content) = client.delete_item(&id).await? {
                print_json(&content)?;
            }
        }
    }

    Ok(())
}
