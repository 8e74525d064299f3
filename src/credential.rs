//! Credentials held by a catalog client for the lifetime of its session
use crate::config::{ENV_PASSWORD, ENV_TOKEN, ENV_USERNAME};
use crate::error::{Result, StacError};
use secrecy::SecretString;
use std::io::{self, BufRead, Write};

#[derive(Debug)]
pub enum Credentials {
    /// A bearer token obtained elsewhere.
    Token(SecretString),
    /// A username to exchange for a token. A missing password is prompted for on first use.
    Password {
        username: String,
        password: Option<SecretString>,
    },
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SecretString::from(token.into()))
    }

    pub fn password(username: impl Into<String>, password: Option<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: password.map(SecretString::from),
        }
    }

    /// A token and a username/password are mutually exclusive, and one of them is required.
    pub fn resolve(
        token: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let token = token.filter(|t| !t.is_empty());
        let username = username.filter(|u| !u.is_empty());
        let password = password.filter(|p| !p.is_empty());
        match (token, username, password) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(StacError::Config(
                "A token cannot be combined with a username or password.".to_string(),
            )),
            (Some(token), None, None) => Ok(Self::token(token)),
            (None, Some(username), password) => Ok(Self::password(username, password)),
            (None, None, Some(_)) => Err(StacError::Config(
                "A password was given without a username.".to_string(),
            )),
            (None, None, None) => Err(StacError::Config(
                "Provide either a token or a username.".to_string(),
            )),
        }
    }

    /// Read `STAC_TOKEN`, `STAC_USERNAME` and `STAC_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::resolve(
            lookup(ENV_TOKEN),
            lookup(ENV_USERNAME),
            lookup(ENV_PASSWORD),
        )
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Token(_) => None,
            Self::Password { username, .. } => Some(username),
        }
    }
}

/// Source of a password when none was supplied up front.
pub trait PasswordPrompt: Send + Sync {
    fn prompt(&self, username: &str) -> io::Result<SecretString>;
}

/// Asks on the terminal, reading one line from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl PasswordPrompt for StdinPrompt {
    fn prompt(&self, _username: &str) -> io::Result<SecretString> {
        read_password(io::stdin().lock(), io::stderr())
    }
}

fn read_password(mut input: impl BufRead, mut output: impl Write) -> io::Result<SecretString> {
    write!(output, "Password: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no password entered",
        ));
    }
    Ok(SecretString::from(password))
}
