//! Integration tests for the Zym Power storefront.
//!
//! The full router, with its session, security and rate-limit layers, is
//! driven in-process through `tower::ServiceExt::oneshot`. Firestore, Firebase
//! Auth and the order form are replaced by the in-memory fakes below.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p zym-power-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use secrecy::{ExposeSecret, SecretString};
use tower::ServiceExt;
use url::Url;
use zym_power_core::{AdminUid, Email, Price, Product, ProductDraft, ProductId};
use zym_power_storefront::{
    app::build_router,
    config::{DEFAULT_FIREBASE_AUTH_URL, DEFAULT_FIRESTORE_URL, FirebaseConfig, StorefrontConfig},
    delivery::parse_zones,
    services::auth::{AuthError, IdToken, IdentityProvider, SignedIn},
    services::order_form::{OrderFormError, OrderSink, OrderSubmission},
    state::AppState,
    store::{ProductFlag, ProductStore, StoreError},
};

/// Admin credentials accepted by [`FakeIdentity`].
pub const ADMIN_EMAIL: &str = "admin@zympower.dz";
pub const ADMIN_PASSWORD: &str = "correct-horse";
/// Token issued by [`FakeIdentity`].
pub const ADMIN_TOKEN: &str = "test-id-token";

/// Client address sent in `X-Forwarded-For` unless a test overrides it.
pub const DEFAULT_CLIENT_IP: &str = "203.0.113.10";

const DELIVERY_ZONES: &str = include_str!("../../storefront/data/delivery_zones.json");

// ============================================================================
// Fixtures
// ============================================================================

fn product(id: &str, name: &str, category: &str, price: Option<u32>) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        slug: id.to_string(),
        category_slug: category.to_string(),
        price: price.map(Price::from_dinars),
        brand: "Zym".to_string(),
        image_url: None,
        discount: None,
        on_sale: false,
        is_new: false,
        is_pack: false,
    }
}

/// Catalogue seeded into every [`FakeStore`].
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            brand: "Optimum Nutrition".to_string(),
            on_sale: true,
            discount: Some(20),
            ..product("whey", "Gold Standard Whey", "proteines", Some(12000))
        },
        Product {
            is_new: true,
            ..product("creatine", "Créatine Monohydrate", "creatines", Some(3200))
        },
        Product {
            is_pack: true,
            ..product("pack-masse", "Pack Prise de Masse", "packs", Some(15000))
        },
        Product {
            on_sale: true,
            ..product("shaker", "Shaker Zym", "boosters", None)
        },
    ]
}

fn from_draft(id: ProductId, draft: &ProductDraft) -> Product {
    Product {
        id,
        name: draft.name.clone(),
        slug: draft.slug.clone(),
        category_slug: draft.category_slug.clone(),
        price: Some(draft.price),
        brand: draft.brand.clone(),
        image_url: Some(draft.image_url.clone()).filter(|url| !url.is_empty()),
        discount: Some(draft.discount),
        on_sale: draft.on_sale,
        is_new: draft.is_new,
        is_pack: draft.is_pack,
    }
}

// ============================================================================
// Fake product store
// ============================================================================

/// In-memory product store that counts reads and records write tokens.
#[derive(Default)]
pub struct FakeStore {
    products: Mutex<Vec<Product>>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    flag_calls: AtomicUsize,
    get_calls: AtomicUsize,
    write_tokens: Mutex<Vec<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeStore {
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    /// Current contents.
    pub fn products(&self) -> Vec<Product> {
        self.products.lock().expect("store lock").clone()
    }

    /// Stored product by id.
    pub fn product(&self, id: &str) -> Option<Product> {
        self.products().into_iter().find(|p| p.id.as_str() == id)
    }

    /// Number of full listing reads.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of flag queries.
    pub fn flag_calls(&self) -> usize {
        self.flag_calls.load(Ordering::SeqCst)
    }

    /// Number of single-document reads.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Tokens presented on writes, in order.
    pub fn write_tokens(&self) -> Vec<String> {
        self.write_tokens.lock().expect("token lock").clone()
    }

    /// Make every read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail with a permission error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "UNAVAILABLE".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self, token: &IdToken) -> Result<(), StoreError> {
        self.write_tokens
            .lock()
            .expect("token lock")
            .push(token.expose().to_string());
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::PermissionDenied(
                "Missing or insufficient permissions.".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for FakeStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(self.products())
    }

    async fn query_flag(&self, flag: ProductFlag, limit: u32) -> Result<Vec<Product>, StoreError> {
        self.flag_calls.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(self
            .products()
            .into_iter()
            .filter(|p| match flag {
                ProductFlag::OnSale => p.on_sale,
                ProductFlag::New => p.is_new,
            })
            .take(limit as usize)
            .collect())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(self.product(id.as_str()))
    }

    async fn create_product(
        &self,
        draft: &ProductDraft,
        token: &IdToken,
    ) -> Result<ProductId, StoreError> {
        self.check_write(token)?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = ProductId::new(format!("created-{n}"));
        self.products
            .lock()
            .expect("store lock")
            .push(from_draft(id.clone(), draft));
        Ok(id)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
        token: &IdToken,
    ) -> Result<(), StoreError> {
        self.check_write(token)?;
        let mut products = self.products.lock().expect("store lock");
        let slot = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        *slot = from_draft(id.clone(), draft);
        Ok(())
    }

    async fn delete_product(&self, id: &ProductId, token: &IdToken) -> Result<(), StoreError> {
        self.check_write(token)?;
        let mut products = self.products.lock().expect("store lock");
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

// ============================================================================
// Fake identity service
// ============================================================================

/// Identity service accepting [`ADMIN_EMAIL`] / [`ADMIN_PASSWORD`].
#[derive(Default)]
pub struct FakeIdentity {
    outage: AtomicBool,
    attempts: AtomicUsize,
}

impl FakeIdentity {
    /// Make the service unreachable.
    pub fn set_outage(&self, outage: bool) {
        self.outage.store(outage, Ordering::SeqCst);
    }

    /// Number of sign-in attempts that reached the service.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<SignedIn, AuthError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.outage.load(Ordering::SeqCst) {
            return Err(AuthError::Api {
                status: 503,
                message: "UNAVAILABLE".to_string(),
            });
        }
        if email.as_str() != ADMIN_EMAIL || password.expose_secret() != ADMIN_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(SignedIn {
            uid: AdminUid::new("admin-uid"),
            email: email.to_string(),
            id_token: IdToken::new(ADMIN_TOKEN),
            expires_in: Duration::from_secs(3600),
        })
    }
}

// ============================================================================
// Fake order form
// ============================================================================

/// Order sink that keeps every submission.
#[derive(Default)]
pub struct FakeOrders {
    submissions: Mutex<Vec<OrderSubmission>>,
    fail: AtomicBool,
}

impl FakeOrders {
    /// Submissions received so far.
    pub fn submissions(&self) -> Vec<OrderSubmission> {
        self.submissions.lock().expect("orders lock").clone()
    }

    /// Make the form reject every submission.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderSink for FakeOrders {
    async fn submit(&self, submission: &OrderSubmission) -> Result<(), OrderFormError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(OrderFormError::Rejected(500));
        }
        self.submissions
            .lock()
            .expect("orders lock")
            .push(submission.clone());
        Ok(())
    }
}

// ============================================================================
// Test context
// ============================================================================

/// Configuration pointing nowhere; every external call goes to a fake.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        firebase: FirebaseConfig {
            project_id: "zym-power-test".to_string(),
            api_key: SecretString::from("AIzaSyTestKeyTestKeyTestKeyTestKey00"),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            auth_url: DEFAULT_FIREBASE_AUTH_URL.to_string(),
        },
        order_form_url: Url::parse("https://docs.google.com/forms/d/e/test/formResponse")
            .expect("valid form url"),
        cache_ttl: Duration::from_secs(300),
        http_timeout: Duration::from_secs(5),
        delivery_zones_path: PathBuf::from("crates/storefront/data/delivery_zones.json"),
        trust_proxy_headers: true,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `Location` of a redirect.
    pub fn location(&self) -> Option<&str> {
        self.header(header::LOCATION.as_str())
    }
}

/// One visitor's browser against a fresh storefront.
///
/// The session cookie is carried between requests like a browser would.
pub struct TestContext {
    pub router: Router,
    pub store: Arc<FakeStore>,
    pub identity: Arc<FakeIdentity>,
    pub orders: Arc<FakeOrders>,
    cookie: Option<String>,
    client_ip: String,
}

impl TestContext {
    /// Storefront seeded with [`sample_products`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_products(sample_products())
    }

    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let store = Arc::new(FakeStore::with_products(products));
        let identity = Arc::new(FakeIdentity::default());
        let orders = Arc::new(FakeOrders::default());
        let zones = parse_zones(DELIVERY_ZONES).expect("bundled delivery zones parse");

        let state = AppState::from_parts(
            test_config(),
            store.clone(),
            identity.clone(),
            orders.clone(),
            zones,
        );

        Self {
            router: build_router(state),
            store,
            identity,
            orders,
            cookie: None,
            client_ip: DEFAULT_CLIENT_IP.to_string(),
        }
    }

    /// Send later requests from another client address.
    pub fn set_client_ip(&mut self, ip: &str) {
        self.client_ip = ip.to_string();
    }

    /// Forget the session cookie, as a new browser would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send("GET", uri, None, false).await
    }

    pub async fn get_htmx(&mut self, uri: &str) -> TestResponse {
        self.send("GET", uri, None, true).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send("POST", uri, Some(encode(fields)), false).await
    }

    pub async fn post_form_htmx(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send("POST", uri, Some(encode(fields)), true).await
    }

    /// Sign in with the accepted admin credentials.
    pub async fn sign_in(&mut self) -> TestResponse {
        let response = self
            .post_form(
                "/login",
                &[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "sign-in failed");
        response
    }

    async fn send(
        &mut self,
        method: &str,
        uri: &str,
        form: Option<String>,
        htmx: bool,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", &self.client_ip);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if htmx {
            builder = builder.header("HX-Request", "true");
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}
