//! Request command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use authwire_core::{BaseUrl, Client, ClientConfig, Method, RefreshPolicy, StatusCode};
use authwire_file::FileCredentialStore;
use authwire_http::ReqwestTransport;

use crate::output;
use crate::session::CliNavigator;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE, ...)
    pub method: String,

    /// Path relative to the base URL
    pub path: String,

    /// Base URL of the API
    #[arg(long, env = "AUTHWIRE_BASE_URL")]
    pub base_url: String,

    /// Extra header as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Path of the token refresh endpoint
    #[arg(long, default_value = "/api/refresh")]
    pub refresh_path: String,

    /// Path to sign in again at when the session expires
    #[arg(long, default_value = "/login")]
    pub login_path: String,

    /// Status code that signals an expired access token
    #[arg(long, default_value_t = 401)]
    pub expired_status: u16,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Pretty-print JSON responses
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: RequestArgs, store: Arc<FileCredentialStore>) -> Result<()> {
    let base_url = BaseUrl::new(&args.base_url).context("Invalid base URL")?;
    let expired_status =
        StatusCode::from_u16(args.expired_status).context("Invalid expired status code")?;
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {}", args.method))?;

    let config = ClientConfig::new(base_url)
        .with_refresh_path(&args.refresh_path)
        .with_login_path(&args.login_path)
        .with_expired_status(expired_status)
        .with_policy(RefreshPolicy::Independent);

    let transport = ReqwestTransport::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .context("Failed to create HTTP client")?;

    let navigator = Arc::new(CliNavigator::default());
    let client = Client::builder(Arc::new(transport), store, navigator.clone())
        .config(config)
        .build()
        .context("Failed to create client")?;

    let mut request = client
        .request(method, &args.path)
        .context("Invalid request path")?;

    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("Header must be 'Name: value': {}", header))?;
        request = request
            .try_header(name.trim(), value.trim())
            .with_context(|| format!("Invalid header: {}", header))?;
    }

    if let Some(data) = &args.data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("Request body is not valid JSON")?;
        request = request.json(&body)?;
    }

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) if navigator.visited().is_some() => {
            return Err(e).context("Session ended");
        }
        Err(e) => return Err(e).context("Request failed"),
    };

    let status = response.status();
    tracing::info!(status = %status, "Response received");

    match response.json::<serde_json::Value>() {
        Ok(value) if args.pretty => output::json_pretty(&value)?,
        Ok(value) => output::json(&value)?,
        Err(_) => {
            let text = response.text();
            if !text.is_empty() {
                println!("{}", text);
            }
        }
    }

    if !status.is_success() {
        eprintln!("{}", format!("HTTP {}", status).dimmed());
        bail!("Request failed with HTTP {}", status.as_u16());
    }

    Ok(())
}
