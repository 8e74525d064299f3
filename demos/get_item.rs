use anyhow::Result;

extern crate dgcatalog;
use dgcatalog::{Client, ClientConfig, Credentials};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("dgcatalog=debug").init();

    let client = Client::builder()
        .config(ClientConfig::from_env())
        .credentials(Credentials::from_env()?)
        .build()?;

    let item = client.get_item("1030010080D4FE00").await?;
    println!("{}", serde_json::to_string_pretty(&item)?);

    let stac_item = item.to_stac()?;
    println!("assets: {:?}", stac_item.assets.keys().collect::<Vec<_>>());

    Ok(())
}
