//! Raw API requests.

use anyhow::{Context as _, Result, bail};
use clap::{Args, ValueEnum};
use serde_json::Value;

use vendorflow_http::{Method, RequestOptions, with_query};

use crate::output;
use crate::session::Context;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MethodArg {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl From<MethodArg> for Method {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Get => Method::GET,
            MethodArg::Post => Method::POST,
            MethodArg::Patch => Method::PATCH,
            MethodArg::Put => Method::PUT,
            MethodArg::Delete => Method::DELETE,
        }
    }
}

#[derive(Args, Debug)]
pub struct ApiArgs {
    #[arg(value_enum)]
    pub method: MethodArg,

    /// Endpoint relative to the API base, e.g. `orders` or `inventory/low-stock`
    pub endpoint: String,

    /// JSON request body
    #[arg(long, short)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q')]
    pub query: Vec<String>,

    /// Extra header as "Name: value" (repeatable)
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,
}

fn split_pair<'a>(raw: &'a str, separator: char, what: &str) -> Result<(&'a str, &'a str)> {
    match raw.split_once(separator) {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => bail!("Invalid {} '{}'", what, raw),
    }
}

pub async fn run(args: ApiArgs, ctx: &Context) -> Result<()> {
    let params = args
        .query
        .iter()
        .map(|raw| split_pair(raw, '=', "query parameter"))
        .collect::<Result<Vec<_>>>()?;
    let endpoint = with_query(&args.endpoint, &params);

    let mut options = RequestOptions::new(args.method.into());
    if let Some(ref data) = args.data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        options = options.body(body);
    }
    for raw in &args.headers {
        let (name, value) = split_pair(raw, ':', "header")?;
        options = options.header(name, value);
    }

    let client = ctx.client()?;
    let body = client
        .request(endpoint.as_str(), options)
        .await
        .with_context(|| format!("{} {} failed", Method::from(args.method), args.endpoint))?;

    output::body(&body)
}
