//! HTTP clients for the warehouse order API and the confirmation log table.

use async_trait::async_trait;
use lotcheck_core::ConfirmationRecord;
use reqwest::Url;
use tracing::info;

use crate::{ConfirmationSink, OrderSource, SyncError};

pub const DEFAULT_ORDER_ENDPOINT: &str =
    "https://api.maglog.com.br/api-wms/rest/1/event/expedicao";
pub const DEFAULT_TENANT: &str = "F8A63EBF-A4C5-457D-9482-2D6381318B8E";
pub const DEFAULT_LOG_TABLE: &str = "conferencias";

/// Client for the warehouse shipping-order endpoint.
pub struct OrderClient {
    client: reqwest::Client,
    endpoint: String,
    tenant: String,
}

impl OrderClient {
    /// `endpoint` is the full shipping-order URL; the document number is
    /// passed as the `Documento` query parameter.
    pub fn new(endpoint: String, tenant: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            tenant,
        }
    }

    fn order_url(&self, document: &str) -> Result<Url, SyncError> {
        Url::parse_with_params(&self.endpoint, &[("Documento", document)]).map_err(|e| {
            SyncError::InvalidUrl {
                url: self.endpoint.clone(),
                reason: e.to_string(),
            }
        })
    }

    fn order_request(&self, document: &str, owner: &str) -> Result<reqwest::Request, SyncError> {
        let url = self.order_url(document)?;
        Ok(self
            .client
            .get(url)
            .header("Tenant", &self.tenant)
            .header("Owner", owner)
            .build()?)
    }
}

#[async_trait]
impl OrderSource for OrderClient {
    async fn fetch_order(
        &self,
        document: &str,
        owner: &str,
    ) -> Result<serde_json::Value, SyncError> {
        let request = self.order_request(document, owner)?;

        info!(url = %request.url(), "fetching order");
        let resp = self.client.execute(request).await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = serde_json::from_str(&body)?;
        Ok(payload)
    }
}

/// Insert-only client for a PostgREST-style table (`POST /rest/v1/{table}`).
pub struct ConfirmationLog {
    client: reqwest::Client,
    base_url: String,
    table: String,
    api_key: String,
}

impl ConfirmationLog {
    /// `base_url` should be like `https://project.supabase.co` (no trailing slash).
    pub fn new(base_url: String, table: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            table,
            api_key,
        }
    }

    fn insert_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn insert_request(&self, record: &ConfirmationRecord) -> Result<reqwest::Request, SyncError> {
        Ok(self
            .client
            .post(self.insert_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(record)
            .build()?)
    }
}

#[async_trait]
impl ConfirmationSink for ConfirmationLog {
    async fn record(&self, record: &ConfirmationRecord) -> Result<(), SyncError> {
        let url = self.insert_url();

        info!(
            url = %url,
            document = %record.document,
            lot = %record.lot,
            checked = record.checked,
            "writing confirmation"
        );
        let resp = self.client.execute(self.insert_request(record)?).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lotcheck_core::LotRef;

    use super::*;

    #[test]
    fn order_url_carries_document_parameter() {
        let client = OrderClient::new(DEFAULT_ORDER_ENDPOINT.into(), DEFAULT_TENANT.into());
        let url = client.order_url("123456").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.maglog.com.br/api-wms/rest/1/event/expedicao?Documento=123456"
        );
    }

    #[test]
    fn order_url_escapes_document() {
        let client = OrderClient::new("http://localhost:8080/orders/".into(), "t".into());
        let url = client.order_url("PED 1&2").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/orders?Documento=PED+1%262");
    }

    #[test]
    fn invalid_endpoint_is_reported() {
        let client = OrderClient::new("not a url".into(), "t".into());
        assert!(matches!(
            client.order_url("1").unwrap_err(),
            SyncError::InvalidUrl { .. }
        ));
    }

    #[test]
    fn confirmation_log_trims_trailing_slash() {
        let log = ConfirmationLog::new(
            "http://localhost:54321/".into(),
            DEFAULT_LOG_TABLE.into(),
            "key".into(),
        );
        assert_eq!(log.base_url, "http://localhost:54321");
        assert_eq!(log.insert_url(), "http://localhost:54321/rest/v1/conferencias");
    }

    fn header<'a>(request: &'a reqwest::Request, name: &str) -> &'a str {
        request.headers().get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn order_request_is_scoped_by_tenant_and_owner() {
        let client = OrderClient::new(DEFAULT_ORDER_ENDPOINT.into(), DEFAULT_TENANT.into());
        let request = client.order_request("4521", "OWNER-1").unwrap();
        assert_eq!(*request.method(), reqwest::Method::GET);
        assert!(request.url().as_str().ends_with("?Documento=4521"));
        assert_eq!(header(&request, "tenant"), DEFAULT_TENANT);
        assert_eq!(header(&request, "owner"), "OWNER-1");
        assert!(request.body().is_none());
    }

    #[test]
    fn insert_request_posts_record_as_json() {
        let log = ConfirmationLog::new(
            "http://localhost:54321".into(),
            DEFAULT_LOG_TABLE.into(),
            "secret".into(),
        );
        let lot = LotRef {
            item: "B2".into(),
            lot: "L1".into(),
        };
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let record = ConfirmationRecord::new("4521", &lot, 2, 1, "default", at);

        let request = log.insert_request(&record).unwrap();
        assert_eq!(*request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:54321/rest/v1/conferencias"
        );
        assert_eq!(header(&request, "apikey"), "secret");
        assert_eq!(header(&request, "authorization"), "Bearer secret");
        assert_eq!(header(&request, "prefer"), "return=minimal");
        assert_eq!(header(&request, "content-type"), "application/json");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json, serde_json::to_value(&record).unwrap());
        assert_eq!(json["documento"], "4521");
        assert_eq!(json["lote"], "L1");
        assert_eq!(json["quantidade_conferida"], 1);
    }
}
