//! Typed wrappers over the REST collections.
//!
//! Everything here goes through [`ApiClient::request`], so the credential
//! check, refresh and 401 retry apply to every call.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use vendorflow_core::Result;

use crate::client::{ApiClient, RequestOptions};

/// Append `params` to `path` as a form-urlencoded query, skipping empty
/// values. Returns `path` unchanged when nothing is left.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
        serializer.append_pair(key, value);
        any = true;
    }
    if any {
        format!("{}?{}", path, serializer.finish())
    } else {
        path.to_string()
    }
}

/// Percent-encode `id` for use as one path segment.
fn encode_segment(id: &str) -> String {
    // Literal `+` comes out as `%2B`, so every `+` left stands for a space.
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// A REST collection such as `orders` or `inventory`.
#[derive(Clone, Copy)]
pub struct Resource<'a> {
    client: &'a ApiClient,
    path: &'a str,
}

impl fmt::Debug for Resource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("path", &self.path).finish()
    }
}

impl<'a> Resource<'a> {
    pub fn path(&self) -> &str {
        self.path
    }

    fn item(&self, id: &str) -> String {
        format!("{}/{}", self.path, encode_segment(id))
    }

    #[instrument(skip(self), fields(resource = self.path))]
    pub async fn list<T: DeserializeOwned>(&self, query: &[(&str, &str)]) -> Result<T> {
        self.client
            .request(with_query(self.path, query), RequestOptions::get())
            .await?
            .into_json()
    }

    #[instrument(skip(self), fields(resource = self.path))]
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        self.client
            .request(self.item(id), RequestOptions::get())
            .await?
            .into_json()
    }

    #[instrument(skip(self, body), fields(resource = self.path))]
    pub async fn create<B, T>(&self, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.client
            .request(self.path, RequestOptions::post().json(body)?)
            .await?
            .into_json()
    }

    /// Partial update (PATCH).
    #[instrument(skip(self, body), fields(resource = self.path))]
    pub async fn update<B, T>(&self, id: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.client
            .request(self.item(id), RequestOptions::patch().json(body)?)
            .await?
            .into_json()
    }

    /// Full replacement (PUT).
    #[instrument(skip(self, body), fields(resource = self.path))]
    pub async fn replace<B, T>(&self, id: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.client
            .request(self.item(id), RequestOptions::put().json(body)?)
            .await?
            .into_json()
    }

    #[instrument(skip(self), fields(resource = self.path))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .request(self.item(id), RequestOptions::delete())
            .await?;
        Ok(())
    }
}

/// How `inventory/{id}/stock` applies a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockAdjustment {
    Add,
    Remove,
    Set,
}

impl ApiClient {
    /// A handle on an arbitrary collection path.
    pub fn resource<'a>(&'a self, path: &'a str) -> Resource<'a> {
        Resource {
            client: self,
            path: path.trim_matches('/'),
        }
    }

    pub fn orders(&self) -> Resource<'_> {
        self.resource("orders")
    }

    pub fn inventory(&self) -> Resource<'_> {
        self.resource("inventory")
    }

    pub fn vendors(&self) -> Resource<'_> {
        self.resource("vendors")
    }

    pub fn suppliers(&self) -> Resource<'_> {
        self.resource("suppliers")
    }

    pub fn users(&self) -> Resource<'_> {
        self.resource("users")
    }

    pub fn payment_transactions(&self) -> Resource<'_> {
        self.resource("payments/transactions")
    }

    pub fn forecasts(&self) -> Resource<'_> {
        self.resource("forecasting")
    }

    pub fn notifications(&self) -> Resource<'_> {
        self.resource("notifications")
    }

    async fn get_json(&self, endpoint: String) -> Result<Value> {
        self.request(endpoint, RequestOptions::get())
            .await?
            .into_json()
    }

    pub async fn order_stats(&self) -> Result<Value> {
        self.get_json("orders/stats".into()).await
    }

    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: &str, status: &str) -> Result<Value> {
        let options = RequestOptions::patch().body(json!({ "status": status }));
        self.request(format!("orders/{}/status", encode_segment(id)), options)
            .await?
            .into_json()
    }

    pub async fn inventory_stats(&self) -> Result<Value> {
        self.get_json("inventory/stats".into()).await
    }

    pub async fn low_stock(&self) -> Result<Value> {
        self.get_json("inventory/low-stock".into()).await
    }

    #[instrument(skip(self))]
    pub async fn update_stock(
        &self,
        id: &str,
        quantity: i64,
        adjustment: StockAdjustment,
    ) -> Result<Value> {
        let options =
            RequestOptions::patch().body(json!({ "quantity": quantity, "type": adjustment }));
        self.request(format!("inventory/{}/stock", encode_segment(id)), options)
            .await?
            .into_json()
    }

    pub async fn dashboard_stats(&self) -> Result<Value> {
        self.get_json("analytics/dashboard-stats".into()).await
    }

    pub async fn vendor_dashboard(&self) -> Result<Value> {
        self.get_json("vendors/dashboard".into()).await
    }

    pub async fn vendor_forecast(&self, period: Option<&str>, metric: Option<&str>) -> Result<Value> {
        let query = with_query(
            "vendors/forecast",
            &[
                ("period", period.unwrap_or_default()),
                ("metric", metric.unwrap_or_default()),
            ],
        );
        self.get_json(query).await
    }

    #[instrument(skip(self))]
    pub async fn generate_vendor_forecast(&self, period: Option<&str>) -> Result<Value> {
        let endpoint = with_query(
            "vendors/forecast/generate",
            &[("period", period.unwrap_or_default())],
        );
        self.request(endpoint, RequestOptions::post())
            .await?
            .into_json()
    }

    pub async fn profile(&self) -> Result<Value> {
        self.get_json("users/profile".into()).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update_profile<B: Serialize + ?Sized>(&self, changes: &B) -> Result<Value> {
        self.request("users/profile", RequestOptions::put().json(changes)?)
            .await?
            .into_json()
    }

    /// Search across every entity. `filters` are added next to `q`.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, filters: &[(&str, &str)]) -> Result<Value> {
        let mut params = vec![("q", query)];
        params.extend_from_slice(filters);
        self.get_json(with_query("search", &params)).await
    }
}
