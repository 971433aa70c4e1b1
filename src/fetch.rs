use std::path::PathBuf;

use anyhow::Result;
use bytes::Bytes;
use log::{debug, warn};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    redirect, Client,
};

use crate::{
    config::{FetchConfig, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    error::FetchError,
    file::{content_type, extension_for, sniff},
    io::save_file,
    request::LogoRequest,
    result::FetchResult,
};

const MAX_REDIRECTS: usize = 10;

/// Client sending the browser-like headers some CDNs insist on.
pub fn client_for(config: &FetchConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    if let Some(referer) = &config.referer {
        headers.insert(header::REFERER, HeaderValue::from_str(referer)?);
    }
    let client = Client::builder()
        .default_headers(headers)
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(config.timeout)
        .build()?;
    Ok(client)
}

/// Fetch one logo, check that it is an image and store it.
///
/// Every failure ends up in the returned result; none is propagated.
pub async fn fetch_and_store(
    client: &Client,
    config: &FetchConfig,
    request: LogoRequest,
) -> FetchResult {
    if request.is_skipped() {
        debug!("{}: nothing to fetch.", request.identifier);
        return FetchResult::skipped(request);
    }
    let mut received = 0;
    match try_fetch_and_store(client, config, &request, &mut received).await {
        Ok((output_path, filename)) => {
            let local_path = config.public_path(&filename);
            FetchResult::success(request, output_path, local_path, received)
        }
        Err(err) => {
            warn!("{}: {:?} error: {err}.", request.identifier, err.kind());
            FetchResult::failed(request, &err, received)
        }
    }
}

async fn try_fetch_and_store(
    client: &Client,
    config: &FetchConfig,
    request: &LogoRequest,
    received: &mut usize,
) -> Result<(PathBuf, String), FetchError> {
    request.check_identifier()?;
    let url = request.resolve_url()?;
    debug!("{}: GET {url}.", request.identifier);
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    if response.url() != &url {
        debug!("{}: redirected to {}.", request.identifier, response.url());
    }
    let declared = content_type(response.headers()).map(str::to_owned);
    let body: Bytes = response.bytes().await?;
    *received = body.len();

    let kind = sniff(&body, declared.as_deref())?;
    debug!("{}: looks like {kind:?}.", request.identifier);

    let filename = format!(
        "{}{}",
        request.identifier,
        extension_for(&url, declared.as_deref())
    );
    let output_path = config.output_dir.join(&filename);
    save_file(&output_path, &body)
        .await
        .map_err(|source| FetchError::Io {
            path: output_path.clone(),
            source,
        })?;
    Ok((output_path, filename))
}
