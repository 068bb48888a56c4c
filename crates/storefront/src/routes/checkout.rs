//! Checkout route handlers.
//!
//! Orders are validated against the delivery zone table and handed off to
//! the order form. The cart is cleared only once the form accepts the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use zym_power_core::{Cart, CustomerDetails, DeliveryType, DeliveryZones, OrderSummary};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{SessionCart, load_cart, save_cart};
use crate::routes::cart::CartView;
use crate::services::order_form::OrderSubmission;
use crate::state::AppState;

/// Shown when the order form cannot be reached or rejects the order.
pub const SUBMIT_FAILED_MESSAGE: &str = "حدث خطأ أثناء إرسال الطلب. حاول مرة أخرى.";

/// Wilaya `<option>` display data.
#[derive(Clone)]
pub struct WilayaOption {
    pub code: u8,
    pub label: String,
    pub selected: bool,
}

/// Order totals display data.
#[derive(Clone)]
pub struct SummaryView {
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl SummaryView {
    fn new(cart: &Cart, zones: &DeliveryZones, form: &CustomerDetails) -> Self {
        let shipping = zones.shipping_fee(form.wilaya_code(), form.delivery());
        Self::from(&OrderSummary::new(cart, shipping))
    }
}

impl From<&OrderSummary> for SummaryView {
    fn from(summary: &OrderSummary) -> Self {
        Self {
            subtotal: summary.subtotal.display(),
            shipping: summary.shipping.display(),
            total: summary.total.display(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub form: CustomerDetails,
    pub stop_desk: bool,
    pub wilayas: Vec<WilayaOption>,
    pub has_wilaya: bool,
    pub communes: Vec<String>,
    pub summary: SummaryView,
    pub error: Option<String>,
}

/// Commune options fragment, with an out-of-band totals refresh (htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/communes.html")]
pub struct CommunesTemplate {
    pub has_wilaya: bool,
    pub communes: Vec<String>,
    pub selected: String,
    pub summary: SummaryView,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub first_name: String,
    pub total: String,
}

/// Query for the communes fragment.
#[derive(Debug, Default, Deserialize)]
pub struct CommunesQuery {
    #[serde(default)]
    pub wilaya: String,
    #[serde(default)]
    pub delivery_type: String,
    #[serde(default)]
    pub commune: String,
}

fn checkout_page(
    state: &AppState,
    cart: &Cart,
    form: CustomerDetails,
    error: Option<String>,
) -> CheckoutTemplate {
    let zones = state.zones();
    let selected = form.wilaya_code().filter(|code| zones.get(*code).is_some());
    let communes = selected
        .map(|code| zones.communes(code).to_vec())
        .unwrap_or_default();

    CheckoutTemplate {
        cart: CartView::from(cart),
        summary: SummaryView::new(cart, zones, &form),
        stop_desk: form.delivery() == DeliveryType::StopDesk,
        wilayas: zones
            .iter()
            .map(|w| WilayaOption {
                code: w.code,
                label: format!("{:02} - {}", w.code, w.name),
                selected: selected == Some(w.code),
            })
            .collect(),
        has_wilaya: selected.is_some(),
        communes,
        form,
        error,
    }
}

/// Display the checkout form.
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, SessionCart(cart): SessionCart) -> impl IntoResponse {
    checkout_page(&state, &cart, CustomerDetails::default(), None)
}

/// Commune choices and totals for the selected wilaya (htmx).
#[instrument(skip(state, cart))]
pub async fn communes(
    State(state): State<AppState>,
    SessionCart(cart): SessionCart,
    Query(query): Query<CommunesQuery>,
) -> impl IntoResponse {
    let form = CustomerDetails {
        wilaya: query.wilaya,
        delivery_type: query.delivery_type,
        ..CustomerDetails::default()
    };
    let zones = state.zones();
    let code = form.wilaya_code().filter(|code| zones.get(*code).is_some());

    CommunesTemplate {
        has_wilaya: code.is_some(),
        communes: code.map(|c| zones.communes(c).to_vec()).unwrap_or_default(),
        selected: query.commune,
        summary: SummaryView::new(&cart, zones, &form),
    }
}

/// Validate and submit an order.
///
/// Validation failures re-render the form with 422; a failed hand-off
/// re-renders it with 502 and keeps the cart.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CustomerDetails>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;

    let order = match form.validate(state.zones()) {
        Ok(order) => order,
        Err(e) => {
            tracing::info!(error = ?e, "Checkout validation failed");
            let page = checkout_page(&state, &cart, form, Some(e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let summary = OrderSummary::new(&cart, order.shipping);
    let submission = OrderSubmission::new(&order, &summary);

    if let Err(e) = state.orders().submit(&submission).await {
        let event_id = sentry::capture_error(&e);
        tracing::error!(error = %e, sentry_event_id = %event_id, "Order submission failed");
        let page = checkout_page(&state, &cart, form, Some(SUBMIT_FAILED_MESSAGE.to_string()));
        return Ok((StatusCode::BAD_GATEWAY, page).into_response());
    }

    add_breadcrumb("checkout", "Order submitted", None);
    tracing::info!(lines = cart.len(), total = %summary.total, "Order placed");

    cart.clear();
    save_cart(&session, &cart)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear cart: {e}")))?;

    Ok(CheckoutSuccessTemplate {
        first_name: order.first_name,
        total: summary.total.display(),
    }
    .into_response())
}
