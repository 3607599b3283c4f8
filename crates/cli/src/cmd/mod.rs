//! Command-line interface for verifying tokens against an issuer.

use crate::error::Error;
use clap::{Args, Parser, Subcommand};
use drinks_auth::{Algorithm, AuthConfig, ConfigError, Verifier};
use std::{path::PathBuf, str::FromStr, time::Duration};

pub mod verify;

/// Verify drinks API bearer tokens and inspect the issuer's signing keys.
#[derive(Parser, Debug)]
#[command(name = "drinks-auth", version, about)]
pub struct App {
    #[command(flatten)]
    pub issuer: IssuerArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where tokens come from and who they are for.
#[derive(Args, Debug)]
pub struct IssuerArgs {
    /// Identity tenant domain. Implies `https://<domain>/` as issuer and
    /// `https://<domain>/.well-known/jwks.json` as key set.
    #[arg(long, env = "AUTH_DOMAIN")]
    pub domain: Option<String>,

    /// Expected `iss` claim. Overrides the one implied by `--domain`.
    #[arg(long, env = "AUTH_ISSUER")]
    pub issuer: Option<String>,

    /// Expected `aud` claim.
    #[arg(long, env = "AUTH_AUDIENCE")]
    pub audience: String,

    /// Key set URL. Overrides the one implied by `--domain`.
    #[arg(long, env = "AUTH_JWKS_URL")]
    pub jwks_url: Option<String>,

    /// Signing algorithm tokens must declare.
    #[arg(long, env = "AUTH_ALGORITHM", default_value = "RS256", value_parser = parse_algorithm)]
    pub algorithm: Algorithm,

    /// Tolerated clock skew on `exp`, in seconds.
    #[arg(long, env = "AUTH_LEEWAY_SECONDS", default_value_t = 0)]
    pub leeway: u64,

    /// Key set fetch timeout, in seconds.
    #[arg(long, env = "AUTH_FETCH_TIMEOUT_SECONDS", default_value_t = 5)]
    pub fetch_timeout: u64,
}

fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    Algorithm::from_str(s).map_err(|_| format!("unknown algorithm: {s}"))
}

impl IssuerArgs {
    /// Build and validate the verifier configuration.
    pub fn config(&self) -> Result<AuthConfig, Error> {
        let mut config = match &self.domain {
            Some(domain) => AuthConfig::for_tenant(domain, &self.audience),
            None => AuthConfig::new(
                self.issuer.clone().ok_or(ConfigError::Missing("issuer"))?,
                &self.audience,
                self.jwks_url.clone().ok_or(ConfigError::Missing("jwks_url"))?,
            ),
        };
        if let Some(issuer) = &self.issuer {
            config.issuer = issuer.clone();
        }
        if let Some(url) = &self.jwks_url {
            config.jwks_url = url.clone();
        }

        let config = config
            .algorithm(self.algorithm)
            .leeway(self.leeway)
            .fetch_timeout(Duration::from_secs(self.fetch_timeout));
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify a token and print its claims.
    Verify {
        /// The bearer token, without the `Bearer ` prefix.
        token: String,

        /// Also require this permission, e.g. `post:drinks`.
        #[arg(long)]
        permission: Option<String>,

        /// Read the key set from a file instead of fetching it.
        #[arg(long, value_name = "PATH")]
        jwks_file: Option<PathBuf>,
    },
    /// Fetch the key set and list the usable key ids.
    Keys,
}

impl App {
    /// Parse CLI arguments and execute the corresponding command.
    pub async fn run() -> Result<(), Error> {
        let app = App::parse();
        let config = app.issuer.config()?;
        tracing::debug!(
            issuer = %config.issuer,
            jwks_url = %config.jwks_url,
            "loaded configuration"
        );

        match app.command {
            Command::Verify {
                token,
                permission,
                jwks_file,
            } => {
                let verifier = verify::verifier(&config, jwks_file.as_deref())?;
                match verify::verify(verifier, &token, permission).await {
                    Ok(claims) => println!("{}", serde_json::to_string_pretty(&claims)?),
                    Err(err) => {
                        println!("{}", serde_json::to_string_pretty(&verify::envelope(&err))?);
                        return Err(err.into());
                    }
                }
            }
            Command::Keys => {
                let verifier = Verifier::from_config(&config)?;
                verifier.resolver().refresh().await?;
                let ids = verifier.resolver().key_ids().await;
                println!("{}", serde_json::to_string_pretty(&ids)?);
            }
        }

        Ok(())
    }
}
