use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt};
use url::Url;

use crate::services::storage_adapter::OnUploadFailure;

/// Origins that receive permissive CORS headers.
pub const ALLOWED_ORIGINS: [&str; 6] = [
    "https://hectaconsulting.com",
    "https://www.hectaconsulting.com",
    "https://hecta-consulting.vercel.app",
    "http://localhost:3000",
    "http://localhost:5500",
    "http://127.0.0.1:5500",
];

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
const DEFAULT_DELIVERY_BASE: &str = "https://res.cloudinary.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Signing key for CMS session tokens.
    pub secret: String,
    pub admin_route: String,
    pub max_upload_bytes: usize,
    pub upload_failure: OnUploadFailure,
    pub allowed_origins: Vec<String>,
    pub cloudinary: CloudinaryConfig,
}

/// Credentials and endpoints for the hosted media API.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
    pub delivery_base: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Hecta Consulting CMS service")]
pub struct Args {
    /// Host to bind to (overrides CMS_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CMS_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides DATABASE_URI)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::from_sources(args, |name| env::var(name).ok())?;
        Ok((cfg, migrate))
    }

    /// Merge CLI args over the values produced by `lookup`, then defaults.
    pub fn from_sources<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_port = match lookup("CMS_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing CMS_PORT value `{}`", value))?,
            None => 3000,
        };

        let upload_failure = match lookup("CMS_UPLOAD_FAILURE") {
            Some(value) => value
                .parse::<OnUploadFailure>()
                .with_context(|| format!("parsing CMS_UPLOAD_FAILURE value `{}`", value))?,
            None => OnUploadFailure::default(),
        };

        let max_upload_bytes = match lookup("CMS_MAX_UPLOAD_BYTES") {
            Some(value) => value
                .parse::<usize>()
                .with_context(|| format!("parsing CMS_MAX_UPLOAD_BYTES value `{}`", value))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let mut admin_route = lookup("CMS_ADMIN_ROUTE").unwrap_or_else(|| "/admin".into());
        if !admin_route.starts_with('/') {
            admin_route.insert(0, '/');
        }

        Ok(Self {
            host: args
                .host
                .or_else(|| lookup("CMS_HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port: args.port.unwrap_or(env_port),
            database_url: args
                .database_url
                .or_else(|| lookup("DATABASE_URI"))
                .unwrap_or_default(),
            secret: lookup("PAYLOAD_SECRET").unwrap_or_default(),
            admin_route,
            max_upload_bytes,
            upload_failure,
            allowed_origins: ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            cloudinary: CloudinaryConfig::from_lookup(&lookup)?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl CloudinaryConfig {
    /// `CLOUDINARY_URL` wins over the individual variables when both are set.
    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup("CLOUDINARY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into());
        let delivery_base =
            lookup("CLOUDINARY_DELIVERY_BASE").unwrap_or_else(|| DEFAULT_DELIVERY_BASE.into());

        if let Some(raw) = lookup("CLOUDINARY_URL") {
            let parsed = Url::parse(&raw).context("parsing CLOUDINARY_URL")?;
            if parsed.scheme() != "cloudinary" {
                bail!("CLOUDINARY_URL must use the cloudinary:// scheme");
            }
            let cloud_name = parsed
                .host_str()
                .filter(|h| !h.is_empty())
                .context("CLOUDINARY_URL is missing the cloud name")?;
            return Ok(Self {
                cloud_name: cloud_name.to_string(),
                api_key: parsed.username().to_string(),
                api_secret: parsed.password().unwrap_or_default().to_string(),
                api_base,
                delivery_base,
            });
        }

        Ok(Self {
            cloud_name: lookup("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
            api_key: lookup("CLOUDINARY_API_KEY").unwrap_or_default(),
            api_secret: lookup("CLOUDINARY_API_SECRET").unwrap_or_default(),
            api_base,
            delivery_base,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Base for secure delivery URLs, e.g. `https://res.cloudinary.com/demo/image/upload`.
    pub fn delivery_root(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.delivery_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "<redacted>" }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &redact(&self.database_url))
            .field("secret", &redact(&self.secret))
            .field("admin_route", &self.admin_route)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("upload_failure", &self.upload_failure)
            .field("allowed_origins", &self.allowed_origins)
            .field("cloudinary", &self.cloudinary)
            .finish()
    }
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &redact(&self.api_secret))
            .field("api_base", &self.api_base)
            .field("delivery_base", &self.delivery_base)
            .finish()
    }
}
