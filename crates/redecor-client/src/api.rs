//! Typed HTTP calls against the backend REST API.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::models::{
    AccountEnvelope, DetectionOutcome, ImageFile, InventoryItem, InventoryItemEnvelope,
    InventoryPage, ListingChange, MarketplaceFilters, MarketplacePage, NewInventoryItem,
    NewListing, Registration, ServiceHealth, Suggestion, UploadedRoom, User,
};

/// Session-aware client for the backend.
///
/// The underlying reqwest client keeps a cookie store, so the session cookie
/// set by [`ApiClient::login`] rides along on every later call. Clones share
/// the store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url`, e.g. `http://localhost:5000`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] when the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|err| ClientError::InvalidInput {
                message: err.to_string(),
            })?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    /// Backend and detector connectivity.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn health(&self) -> Result<ServiceHealth, ClientError> {
        json_body(send(self.request(Method::GET, "/api/health")).await?).await
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    /// See [`ClientError`]; a duplicate email is a 409 [`ClientError::Api`].
    pub async fn register(&self, registration: &Registration) -> Result<User, ClientError> {
        let envelope: AccountEnvelope =
            json_body(send(self.request(Method::POST, "/api/register").json(registration)).await?)
                .await?;
        Ok(envelope.user)
    }

    /// Sign in by username or email; stores the session cookie.
    ///
    /// # Errors
    /// See [`ClientError`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, ClientError> {
        let body = json!({ "identifier": identifier, "password": password });
        let envelope: AccountEnvelope =
            json_body(send(self.request(Method::POST, "/api/login").json(&body)).await?).await?;
        Ok(envelope.user)
    }

    /// End the session.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn logout(&self) -> Result<(), ClientError> {
        send(self.request(Method::POST, "/api/logout")).await?;
        Ok(())
    }

    /// The signed-in user's items.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn inventory(&self) -> Result<InventoryPage, ClientError> {
        json_body(send(self.request(Method::GET, "/api/inventory")).await?).await
    }

    /// Add an item by hand.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn create_item(&self, item: &NewInventoryItem) -> Result<InventoryItem, ClientError> {
        item_body(send(self.request(Method::POST, "/api/inventory").json(item)).await?).await
    }

    /// Change an item's lifecycle status.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn update_item_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<InventoryItem, ClientError> {
        let path = format!("/api/inventory/{id}/status");
        let body = json!({ "status": status });
        item_body(send(self.request(Method::PATCH, &path).json(&body)).await?).await
    }

    /// Remove an item.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn delete_item(&self, id: &str) -> Result<(), ClientError> {
        send(self.request(Method::DELETE, &format!("/api/inventory/{id}"))).await?;
        Ok(())
    }

    /// Browse listings.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn marketplace(
        &self,
        filters: &MarketplaceFilters,
    ) -> Result<MarketplacePage, ClientError> {
        json_body(send(self.request(Method::GET, "/api/marketplace").query(filters)).await?).await
    }

    /// Create a listing, optionally from an inventory item.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn create_listing(&self, listing: &NewListing) -> Result<ListingChange, ClientError> {
        json_body(send(self.request(Method::POST, "/api/marketplace").json(listing)).await?).await
    }

    /// Mark one of the user's listings sold.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn mark_sold(&self, listing_id: &str) -> Result<ListingChange, ClientError> {
        let path = format!("/api/marketplace/{listing_id}/sold");
        json_body(send(self.request(Method::POST, &path)).await?).await
    }

    /// Upload a room photo and turn detected objects into inventory items.
    ///
    /// # Errors
    /// See [`ClientError`]; an unreachable detector is a 503
    /// [`ClientError::Api`] carrying the server's explanation.
    pub async fn detect_objects(&self, image: ImageFile) -> Result<DetectionOutcome, ClientError> {
        let form = image_form(image)?;
        json_body(send(self.request(Method::POST, "/api/detect-objects").multipart(form)).await?)
            .await
    }

    /// Store a room photo without detection.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn upload_room(&self, image: ImageFile) -> Result<UploadedRoom, ClientError> {
        let form = image_form(image)?;
        json_body(send(self.request(Method::POST, "/api/upload-room").multipart(form)).await?).await
    }

    /// Suggestions for a stored photo.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn scan_suggestions(&self, filename: &str) -> Result<Vec<Suggestion>, ClientError> {
        json_body(send(self.request(Method::GET, &format!("/api/scan-result/{filename}"))).await?)
            .await
    }
}

fn image_form(image: ImageFile) -> Result<Form, ClientError> {
    let ImageFile {
        file_name,
        content_type,
        bytes,
    } = image;
    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(&content_type)
        .map_err(|err| ClientError::InvalidInput {
            message: format!("invalid content type {content_type}: {err}"),
        })?;
    Ok(Form::new().part("image", part))
}

/// Send and split off non-success answers.
async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let response = request.send().await.map_err(|err| {
        warn!(error = %err, "request got no response");
        ClientError::unreachable(&err)
    })?;
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "response received");
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response.json().await.map_err(ClientError::decode)
}

async fn item_body(response: Response) -> Result<InventoryItem, ClientError> {
    let envelope: InventoryItemEnvelope = json_body(response).await?;
    Ok(envelope.item)
}

/// Error for a non-success answer.
///
/// The server's `message` wins, then `error`, then the status reason.
fn api_error(status: StatusCode, body: &str) -> ClientError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|value| value.get(name))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    };
    let message = field("message")
        .or_else(|| field("error"))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_owned()
        });
    ClientError::Api {
        status: status.as_u16(),
        message,
        code: field("code"),
    }
}
