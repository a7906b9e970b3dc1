//! Asset handlers, including file processing.
//!
//! Attaching an upload to an asset only starts remote processing. The
//! processed file's URL shows up under `fields.file[locale].url` some time
//! later, so the processing handlers poll `get` until it does.

use super::{
    environment_path, require_json, selection_config, sys_version, versioned_config, without_sys,
};
use crate::error::{CmaError, CmaResult};
use crate::params::{Headers, Params, Payload};
use crate::poller::{CompletionPoller, Delay, ProcessingOptions, TokioDelay, settle_all_last_wins};
use crate::transport::{RequestConfig, Transport};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

fn assets_path(params: &Params) -> String {
    format!("{}/assets", environment_path(params))
}

fn asset_path(params: &Params) -> String {
    format!("{}/{}", assets_path(params), params.id("assetId"))
}

pub async fn get(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .get(&asset_path(&params), selection_config(&params, headers))
        .await
}

pub async fn get_many(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .get(&assets_path(&params), selection_config(&params, headers))
        .await
}

pub async fn create(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    transport
        .post(&assets_path(&params), Some(data), RequestConfig::with_headers(headers))
        .await
}

pub async fn update(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let config = versioned_config(&sys_version(&data), headers);
    transport
        .put(&asset_path(&params), Some(without_sys(&data)), config)
        .await
}

pub async fn del(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .delete(&asset_path(&params), RequestConfig::with_headers(headers))
        .await
}

pub async fn publish(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let url = format!("{}/published", asset_path(&params));
    transport
        .put(&url, None, versioned_config(&sys_version(&data), headers))
        .await
}

pub async fn unpublish(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let url = format!("{}/published", asset_path(&params));
    transport
        .delete(&url, RequestConfig::with_headers(headers))
        .await
}

/// Starts processing one locale's file and waits for it to finish.
///
/// Params: `asset` (the entity as last seen), `locale`, optional `options`.
pub async fn process_for_locale(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    AssetProcessor::new(transport)
        .process_for_locale(params, headers)
        .await
}

/// Processes every locale of `params.asset` concurrently.
pub async fn process_for_all_locales(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    AssetProcessor::new(transport)
        .process_for_all_locales(params, headers)
        .await
}

/// True once `fields.file[locale].url` holds a non-empty string.
pub fn has_processed_url(asset: &Value, locale: &str) -> bool {
    asset
        .get("fields")
        .and_then(|fields| fields.get("file"))
        .and_then(|file| file.get(locale))
        .and_then(|file| file.get("url"))
        .and_then(Value::as_str)
        .is_some_and(|url| !url.is_empty())
}

/// Locales present under `fields.file`.
pub fn file_locales(asset: &Value) -> Vec<String> {
    asset
        .pointer("/fields/file")
        .and_then(Value::as_object)
        .map(|files| files.keys().cloned().collect())
        .unwrap_or_default()
}

/// Drives asset file processing against one transport.
#[derive(Clone)]
pub struct AssetProcessor {
    transport: Arc<dyn Transport>,
    delay: Arc<dyn Delay>,
}

impl AssetProcessor {
    /// A processor that waits on the tokio timer.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            delay: Arc::new(TokioDelay),
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Issues the start request for `params.locale`, then polls `get` until
    /// the processed URL appears or the retry budget is spent.
    pub async fn process_for_locale(&self, params: Params, headers: Headers) -> CmaResult<Value> {
        let asset = required_asset(&params)?;
        let locale = params
            .str("locale")
            .ok_or_else(|| CmaError::validation("locale", "a locale is required"))?
            .to_string();
        let options = ProcessingOptions::from_params(&params)?;
        let asset_id = asset
            .pointer("/sys/id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let url = format!(
            "{}/{asset_id}/files/{locale}/process",
            assets_path(&params)
        );
        self.transport
            .put(&url, None, versioned_config(&sys_version(asset), headers))
            .await?;

        let fetch_params = Params::new()
            .with("spaceId", params.id("spaceId"))
            .with("environmentId", params.id("environmentId"))
            .with("assetId", asset_id.as_str());
        let poller = CompletionPoller::new(options, Arc::clone(&self.delay));
        let label = format!("asset {asset_id} locale {locale}");

        let processed = poller
            .poll(
                &label,
                || get(Arc::clone(&self.transport), fetch_params.clone(), None, Headers::new()),
                |candidate| has_processed_url(candidate, &locale),
            )
            .await?;

        info!(asset_id = %asset_id, locale = %locale, "asset processed");
        Ok(processed)
    }

    /// Processes every locale under `fields.file` concurrently.
    ///
    /// All start requests carry the version of the asset as passed in. The
    /// result is the snapshot of whichever locale finished last; it is not a
    /// merge of the per-locale results.
    ///
    /// With no locales nothing is sent and the input asset itself comes back
    /// (the "last resolved" slot starts out holding it), not an empty value,
    /// so callers cannot tell "nothing to process" from "processed" by the
    /// result alone. A failing locale fails the whole call while its siblings
    /// keep polling in the background.
    pub async fn process_for_all_locales(&self, params: Params, headers: Headers) -> CmaResult<Value> {
        let asset = required_asset(&params)?.clone();
        let locales = file_locales(&asset);
        if locales.is_empty() {
            return Ok(asset);
        }

        info!(locales = locales.len(), "processing asset for all locales");
        let tasks: Vec<_> = locales
            .into_iter()
            .map(|locale| {
                let processor = self.clone();
                let locale_params = params.clone().with("locale", locale);
                let headers = headers.clone();
                async move { processor.process_for_locale(locale_params, headers).await }
            })
            .collect();

        settle_all_last_wins(asset, tasks).await
    }
}

impl std::fmt::Debug for AssetProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetProcessor").finish_non_exhaustive()
    }
}

fn required_asset(params: &Params) -> CmaResult<&Value> {
    params
        .get("asset")
        .filter(|asset| asset.is_object())
        .ok_or_else(|| CmaError::validation("asset", "an asset object is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn processed_url_requires_non_empty_string() {
        let asset = json!({"fields": {"file": {
            "en-US": {"url": "//images/a.png"},
            "de-DE": {"url": ""},
            "fr-FR": {"upload": "https://upload"}
        }}});
        assert!(has_processed_url(&asset, "en-US"));
        assert!(!has_processed_url(&asset, "de-DE"));
        assert!(!has_processed_url(&asset, "fr-FR"));
        assert!(!has_processed_url(&asset, "it-IT"));
    }

    #[test]
    fn locales_come_from_file_keys() {
        let asset = json!({"fields": {"file": {"en-US": {}, "de-DE": {}}}});
        assert_eq!(file_locales(&asset), vec!["de-DE".to_string(), "en-US".to_string()]);
        assert!(file_locales(&json!({"fields": {}})).is_empty());
    }
}
