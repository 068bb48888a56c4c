//! Firestore REST client for the `products` collection.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;
use zym_power_core::{Product, ProductDraft, ProductId};

use super::value::{Document, PRODUCT_FIELDS, decode_product, encode_draft};
use super::{ApiErrorBody, api_message};
use crate::config::FirebaseConfig;
use crate::services::auth::IdToken;
use crate::store::{ProductFlag, ProductStore, StoreError};

const COLLECTION: &str = "products";

/// Documents requested per list page.
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<Document>,
}

/// Firestore client.
#[derive(Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    documents_url: String,
    api_key: SecretString,
}

impl FirestoreClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            client,
            documents_url: config.documents_url(),
            api_key: config.api_key.clone(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{COLLECTION}", self.documents_url)
    }

    /// URL of one product document. The id is percent-encoded as a single
    /// path segment and must be a valid document id.
    fn document_url(&self, id: &ProductId) -> Result<Url, StoreError> {
        if !id.is_document_id() {
            return Err(StoreError::NotFound(id.clone()));
        }

        let mut url = Url::parse(&self.collection_url())
            .map_err(|e| StoreError::Parse(format!("collection url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Parse("collection url cannot take a path".to_string()))?
            .push(id.as_str());
        Ok(url)
    }

    fn keyed(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("key", self.api_key.expose_secret())])
    }

    fn authorized(&self, request: RequestBuilder, token: &IdToken) -> RequestBuilder {
        self.keyed(request).bearer_auth(token.expose())
    }

    /// Turn a non-success response into a [`StoreError`].
    async fn check(response: Response, id: Option<&ProductId>) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ApiErrorBody = response.json().await.unwrap_or_default();
        let message = api_message(&body);
        tracing::warn!(status = status.as_u16(), %message, "Firestore request failed");

        Err(match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => StoreError::NotFound(id.clone()),
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
                StoreError::PermissionDenied(message)
            }
            _ => StoreError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ProductStore for FirestoreClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut products = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .keyed(self.client.get(self.collection_url()))
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = Self::check(request.send().await?, None).await?;
            let page: ListDocumentsResponse = Self::parse(response).await?;
            products.extend(page.documents.iter().map(decode_product));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn query_flag(&self, flag: ProductFlag, limit: u32) -> Result<Vec<Product>, StoreError> {
        let body = serde_json::json!({
            "structuredQuery": {
                "from": [{ "collectionId": COLLECTION }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": flag.field() },
                        "op": "EQUAL",
                        "value": { "booleanValue": true }
                    }
                },
                "limit": limit
            }
        });

        let request = self
            .keyed(self.client.post(format!("{}:runQuery", self.documents_url)))
            .json(&body);
        let response = Self::check(request.send().await?, None).await?;
        let items: Vec<RunQueryItem> = Self::parse(response).await?;

        Ok(items
            .iter()
            .filter_map(|item| item.document.as_ref())
            .map(decode_product)
            .collect())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let url = match self.document_url(id) {
            Ok(url) => url,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let response = self.keyed(self.client.get(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response, Some(id)).await?;
        let doc: Document = Self::parse(response).await?;
        Ok(Some(decode_product(&doc)))
    }

    #[instrument(skip(self, draft, token), fields(name = %draft.name))]
    async fn create_product(
        &self,
        draft: &ProductDraft,
        token: &IdToken,
    ) -> Result<ProductId, StoreError> {
        let request = self
            .authorized(self.client.post(self.collection_url()), token)
            .json(&encode_draft(draft));
        let response = Self::check(request.send().await?, None).await?;
        let doc: Document = Self::parse(response).await?;

        let id = ProductId::new(doc.id());
        tracing::info!(id = %id, "Created product");
        Ok(id)
    }

    #[instrument(skip(self, draft, token), fields(id = %id))]
    async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
        token: &IdToken,
    ) -> Result<(), StoreError> {
        let mask: Vec<(&str, &str)> = PRODUCT_FIELDS
            .iter()
            .map(|field| ("updateMask.fieldPaths", *field))
            .collect();

        let request = self
            .authorized(self.client.patch(self.document_url(id)?), token)
            .query(&mask)
            .query(&[("currentDocument.exists", "true")])
            .json(&encode_draft(draft));
        Self::check(request.send().await?, Some(id)).await?;

        tracing::info!("Updated product");
        Ok(())
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn delete_product(&self, id: &ProductId, token: &IdToken) -> Result<(), StoreError> {
        let request = self.authorized(self.client.delete(self.document_url(id)?), token);
        Self::check(request.send().await?, Some(id)).await?;

        tracing::info!("Deleted product");
        Ok(())
    }
}
