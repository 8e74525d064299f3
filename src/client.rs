use crate::auth;
use crate::config::ClientConfig;
use crate::credential::{Credentials, PasswordPrompt, StdinPrompt};
use crate::endpoint;
use crate::error::{Result, StacError};
use crate::item::{items_from_response, validate_item_id, Catalog, Item};
use crate::search::SearchRequest;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

/// A session with a STAC catalog service.
///
/// No request is made when the client is built. The first operation that needs a token
/// exchanges the username and password for one (prompting for the password if it was not
/// given) and the token is reused for the life of the client. An expired token is not
/// regenerated; build a new client instead.
pub struct Client {
    http: reqwest::Client,
    url: Url,
    auth_url: Url,
    credentials: Credentials,
    prompt: Arc<dyn PasswordPrompt>,
    timeout: Duration,
    token: OnceCell<SecretString>,
}

pub struct ClientBuilder {
    config: ClientConfig,
    credentials: Option<Credentials>,
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    prompt: Option<Arc<dyn PasswordPrompt>>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            credentials: None,
            token: None,
            username: None,
            password: None,
            prompt: None,
            timeout: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.stac_url = url.into();
        self
    }

    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.config.auth_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn prompt(mut self, prompt: impl PasswordPrompt + 'static) -> Self {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    pub fn build(self) -> Result<Client> {
        let credentials = match self.credentials {
            Some(credentials) => {
                if self.token.is_some() || self.username.is_some() || self.password.is_some() {
                    return Err(StacError::Config(
                        "Credentials were given twice.".to_string(),
                    ));
                }
                credentials
            }
            None => Credentials::resolve(self.token, self.username, self.password)?,
        };

        let url = self.config.stac_url()?;
        let auth_url = self.config.auth_url()?;
        let timeout = self.timeout.unwrap_or_else(|| self.config.timeout());
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StacError::Config(e.to_string()))?;

        Ok(Client {
            http,
            url,
            auth_url,
            credentials,
            prompt: self.prompt.unwrap_or_else(|| Arc::new(StdinPrompt)),
            timeout,
            token: OnceCell::new(),
        })
    }
}

impl Client {
    /// A client for the default catalog. Without a password, one is asked for on first use.
    pub fn new(username: &str, password: Option<&str>) -> Result<Self> {
        let mut builder = Self::builder().username(username);
        if let Some(password) = password {
            builder = builder.password(password);
        }
        builder.build()
    }

    pub fn with_token(token: &str) -> Result<Self> {
        Self::builder().token(token).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.credentials, Credentials::Token(_)) || self.token.initialized()
    }

    /// Negotiate the session token now rather than on the first request.
    pub async fn authenticate(&self) -> Result<()> {
        self.bearer().await?;
        Ok(())
    }

    async fn bearer(&self) -> Result<&SecretString> {
        match &self.credentials {
            Credentials::Token(token) => Ok(token),
            Credentials::Password { username, password } => {
                self.token
                    .get_or_try_init(|| self.negotiate(username, password.as_ref()))
                    .await
            }
        }
    }

    async fn negotiate(
        &self,
        username: &str,
        password: Option<&SecretString>,
    ) -> Result<SecretString> {
        match password {
            Some(password) => {
                auth::request_token(&self.http, &self.auth_url, username, password).await
            }
            None => {
                // Terminal input blocks, so it must not run on a runtime worker.
                let prompt = Arc::clone(&self.prompt);
                let user = username.to_owned();
                let password = tokio::task::spawn_blocking(move || prompt.prompt(&user))
                    .await
                    .map_err(io::Error::other)??;
                auth::request_token(&self.http, &self.auth_url, username, &password).await
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = endpoint::append_path(&self.url, path);
        debug!("{}: {}", method, url);
        self.http.request(method, url)
    }

    async fn send(&self, request: RequestBuilder, target: Option<&str>) -> Result<Option<Value>> {
        let token = self.bearer().await?;
        let response = request.bearer_auth(token.expose_secret()).send().await?;
        crate::response::handle_response(response, target).await
    }

    //
    // Items
    //

    /// Fetch a single item by id.
    ///
    /// Fails with [`StacError::NotFound`] when the catalog has no item with exactly this id.
    pub async fn get_item(&self, item_id: &str) -> Result<Item> {
        validate_item_id(item_id)?;
        let request = self.request(Method::GET, "search").query(&[("id", item_id)]);
        let content = self.send(request, Some(item_id)).await?;

        let item = items_from_response(content)?
            .into_iter()
            .find(|item| item.id() == Some(item_id))
            .ok_or_else(|| StacError::NotFound {
                id: item_id.to_string(),
            })?;
        info!(item_id, "Item retrieved");
        Ok(item)
    }

    pub async fn insert_item(&self, item: &Item, catalog_id: &str) -> Result<Option<Value>> {
        validate_item_id(catalog_id)?;
        let request = self
            .request(Method::POST, &format!("catalog/{}/item", catalog_id))
            .json(item);
        self.send(request, Some(catalog_id)).await
    }

    pub async fn insert_items(&self, items: &[Item], catalog_id: &str) -> Result<Option<Value>> {
        validate_item_id(catalog_id)?;
        let request = self
            .request(Method::POST, &format!("catalog/{}/item", catalog_id))
            .json(items);
        self.send(request, Some(catalog_id)).await
    }

    pub async fn update_item(&self, item: &Item, catalog_id: &str) -> Result<Option<Value>> {
        let item_id = item
            .id()
            .ok_or_else(|| StacError::InvalidArgument("Item has no \"id\" property.".to_string()))?;
        validate_item_id(item_id)?;
        validate_item_id(catalog_id)?;
        let request = self
            .request(
                Method::PUT,
                &format!("catalog/{}/item/{}", catalog_id, item_id),
            )
            .json(item);
        self.send(request, Some(item_id)).await
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<Option<Value>> {
        validate_item_id(item_id)?;
        let request = self.request(Method::DELETE, &format!("item/{}", item_id));
        self.send(request, Some(item_id)).await
    }

    pub async fn search(&self, search: &SearchRequest) -> Result<Vec<Item>> {
        let body = search.to_body()?;
        let path = match &search.catalog_id {
            Some(catalog_id) => {
                validate_item_id(catalog_id)?;
                format!("catalog/{}/search", catalog_id)
            }
            None => "search".to_string(),
        };
        let request = self.request(Method::POST, &path).json(&body);
        let content = self.send(request, search.catalog_id.as_deref()).await?;
        items_from_response(content)
    }

    //
    // Catalogs
    //

    pub async fn list_catalogs(&self) -> Result<Vec<Catalog>> {
        let request = self.request(Method::GET, "catalog");
        match self.send(request, None).await? {
            None | Some(Value::Null) => Ok(vec![]),
            Some(Value::Array(list)) => list.into_iter().map(Catalog::from_value).collect(),
            Some(single @ Value::Object(_)) => Ok(vec![Catalog::from_value(single)?]),
            Some(other) => Err(StacError::InvalidResponse(format!(
                "expected a list of catalogs, got: {}",
                other
            ))),
        }
    }

    pub async fn get_catalog(&self, catalog_id: &str) -> Result<Catalog> {
        validate_item_id(catalog_id)?;
        let request = self.request(Method::GET, &format!("catalog/{}", catalog_id));
        let content = self
            .send(request, Some(catalog_id))
            .await?
            .ok_or_else(|| StacError::NotFound {
                id: catalog_id.to_string(),
            })?;
        Catalog::from_value(content)
    }

    pub async fn insert_catalog(&self, catalog: &Catalog) -> Result<()> {
        let request = self.request(Method::POST, "catalog").json(catalog);
        self.send(request, None).await?;
        Ok(())
    }

    pub async fn update_catalog(&self, catalog: &Catalog) -> Result<()> {
        let catalog_id = catalog.id().ok_or_else(|| {
            StacError::InvalidArgument(
                "Catalog object does not have a valid \"id\" property.".to_string(),
            )
        })?;
        validate_item_id(catalog_id)?;
        let request = self
            .request(Method::PUT, &format!("catalog/{}", catalog_id))
            .json(catalog);
        self.send(request, Some(catalog_id)).await?;
        Ok(())
    }
}
