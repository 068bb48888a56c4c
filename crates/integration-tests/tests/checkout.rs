//! Integration tests for checkout and order hand-off.

use axum::http::StatusCode;
use zym_power_integration_tests::TestContext;
use zym_power_storefront::routes::checkout::SUBMIT_FAILED_MESSAGE;
use zym_power_storefront::services::order_form::entries;

fn order<'a>(wilaya: &'a str, commune: &'a str, delivery: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("last_name", "Benali"),
        ("first_name", "Yacine"),
        ("phone", "0612345678"),
        ("address", "12 rue des Frères Bouadou"),
        ("wilaya", wilaya),
        ("commune", commune),
        ("delivery_type", delivery),
    ]
}

// ============================================================================
// Form and fragments
// ============================================================================

#[tokio::test]
async fn test_checkout_page_lists_wilayas() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/checkout").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("16 - Alger"));
    assert!(resp.body.contains("01 - Adrar"));
    assert!(resp.body.contains("dir=\"rtl\""));
}

#[tokio::test]
async fn test_communes_fragment_updates_totals() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", &[("product_id", "whey")]).await;

    let resp = ctx
        .get_htmx("/checkout/communes?wilaya=16&delivery_type=1")
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Bab Ezzouar"));
    assert!(resp.body.contains("hx-swap-oob=\"true\""));
    assert!(resp.body.contains("400 DA"));
    assert!(resp.body.contains("12\u{202f}400 DA"));

    let desk = ctx
        .get_htmx("/checkout/communes?wilaya=16&delivery_type=2")
        .await;
    assert!(desk.body.contains("12\u{202f}250 DA"));
}

#[tokio::test]
async fn test_communes_fragment_without_wilaya() {
    let mut ctx = TestContext::new();

    let resp = ctx.get_htmx("/checkout/communes?wilaya=").await;

    assert!(resp.body.contains("disabled"));
    assert!(resp.body.contains("0 DA"));
}

#[tokio::test]
async fn test_wilaya_without_commune_list_gets_free_text() {
    let mut ctx = TestContext::new();

    let resp = ctx.get_htmx("/checkout/communes?wilaya=1").await;

    assert!(resp.body.contains("type=\"text\" name=\"commune\""));
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_valid_order_is_submitted_and_cart_cleared() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", &[("product_id", "whey"), ("quantity", "2")])
        .await;

    let resp = ctx
        .post_form("/checkout", &order("16", "Bab Ezzouar", "1"))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Yacine"));
    assert!(resp.body.contains("24\u{202f}400 DA"));

    let submissions = ctx.orders.submissions();
    assert_eq!(submissions.len(), 1);
    let submission = &submissions[0];
    assert_eq!(submission.field(entries::TOTAL), Some("24\u{202f}400 DA"));
    assert_eq!(submission.field(entries::WILAYA), Some("Alger"));
    assert_eq!(submission.field(entries::COMMUNE), Some("Bab Ezzouar"));
    assert_eq!(submission.field(entries::DELIVERY), Some("domicile"));
    assert_eq!(submission.field(entries::LAST_NAME), Some("Benali"));
    assert!(
        submission
            .field(entries::CART_SUMMARY)
            .is_some_and(|s| s.contains("Gold Standard Whey"))
    );

    let count = ctx.get("/cart/count").await;
    assert!(!count.body.contains("cart-badge"));
}

#[tokio::test]
async fn test_stop_desk_uses_desk_fee() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", &[("product_id", "creatine")]).await;

    ctx.post_form("/checkout", &order("16", "Kouba", "2")).await;

    let submissions = ctx.orders.submissions();
    assert_eq!(submissions[0].field(entries::TOTAL), Some("3\u{202f}450 DA"));
    assert_eq!(submissions[0].field(entries::DELIVERY), Some("agence"));
}

#[tokio::test]
async fn test_missing_fields_rerender_form() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", &[("product_id", "whey")]).await;

    let resp = ctx
        .post_form("/checkout", &[("first_name", "Yacine"), ("wilaya", "16")])
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("يرجى ملء جميع الحقول المطلوبة."));
    assert!(resp.body.contains("value=\"Yacine\""));
    assert!(ctx.orders.submissions().is_empty());
}

#[tokio::test]
async fn test_commune_outside_wilaya_is_rejected() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post_form("/checkout", &order("16", "Oran", "1"))
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(ctx.orders.submissions().is_empty());
}

#[tokio::test]
async fn test_unknown_wilaya_is_rejected() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post_form("/checkout", &order("99", "Nulle part", "1"))
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_failed_hand_off_keeps_cart() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", &[("product_id", "whey")]).await;
    ctx.orders.set_failing(true);

    let resp = ctx
        .post_form("/checkout", &order("16", "Bab Ezzouar", "1"))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert!(resp.body.contains(SUBMIT_FAILED_MESSAGE));

    let count = ctx.get("/cart/count").await;
    assert!(count.body.contains(">1<"));
}

#[tokio::test]
async fn test_empty_cart_can_still_order() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post_form("/checkout", &order("1", "Reggane", "1"))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let submissions = ctx.orders.submissions();
    assert_eq!(submissions[0].field(entries::CART_SUMMARY), Some("Panier vide"));
    assert_eq!(submissions[0].field(entries::TOTAL), Some("1\u{202f}400 DA"));
}
