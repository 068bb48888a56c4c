//! Integration tests for admin sign-in and product management.

use axum::http::StatusCode;
use zym_power_integration_tests::{ADMIN_EMAIL, ADMIN_TOKEN, TestContext};

fn product_form<'a>(name: &'a str, category: &'a str, price: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("name", name),
        ("brand", "BioTech USA"),
        ("category_slug", category),
        ("price", price),
        ("image_url", ""),
        ("discount", "10"),
        ("on_sale", "true"),
        ("is_new", "false"),
        ("is_pack", "false"),
    ]
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_admin_requires_sign_in() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/admin/products").await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/login"));
}

#[tokio::test]
async fn test_sign_in_then_admin_page() {
    let mut ctx = TestContext::new();

    let resp = ctx.sign_in().await;
    assert_eq!(resp.location(), Some("/admin/products"));

    let page = ctx.get("/admin/products").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Gestion des produits"));
    assert!(page.body.contains(ADMIN_EMAIL));
    assert!(page.body.contains("Gold Standard Whey"));
    assert!(page.body.contains("Supprimer ce produit ?"));

    let login = ctx.get("/login").await;
    assert_eq!(login.location(), Some("/admin/products"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "nope")])
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.body.contains("Email ou mot de passe invalide."));
    assert!(resp.body.contains(ADMIN_EMAIL), "email is kept in the form");

    let page = ctx.get("/admin/products").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_malformed_email_never_reaches_identity_service() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post_form("/login", &[("email", "not-an-email"), ("password", "x")])
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.identity.attempts(), 0);
}

#[tokio::test]
async fn test_identity_outage_shows_generic_message() {
    let mut ctx = TestContext::new();
    ctx.identity.set_outage(true);

    let resp = ctx
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "whatever")])
        .await;

    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert!(resp.body.contains("Email ou mot de passe invalide."));
}

#[tokio::test]
async fn test_logout_ends_admin_access() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;

    let resp = ctx.post_form("/logout", &[]).await;
    assert_eq!(resp.location(), Some("/login"));

    let page = ctx.get("/admin/products").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_sign_in_is_rate_limited_per_client() {
    let mut ctx = TestContext::new();
    ctx.set_client_ip("198.51.100.77");

    let mut statuses = Vec::new();
    for _ in 0..6 {
        let resp = ctx
            .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "nope")])
            .await;
        statuses.push(resp.status);
    }

    assert!(statuses[..5].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);

    // Another client is unaffected
    ctx.set_client_ip("198.51.100.78");
    let resp = ctx
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "nope")])
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Product writes
// ============================================================================

#[tokio::test]
async fn test_create_product_uses_token_and_refreshes_listings() {
    let mut ctx = TestContext::new();
    ctx.get("/products").await;
    ctx.sign_in().await;

    let resp = ctx
        .post_form("/admin/products", &product_form("Iso Whey Zero", "proteines", "9500"))
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/admin/products"));
    assert_eq!(ctx.store.write_tokens(), vec![ADMIN_TOKEN.to_string()]);

    let created = ctx
        .store
        .products()
        .into_iter()
        .find(|p| p.name == "Iso Whey Zero")
        .expect("product created");
    assert_eq!(created.slug, "iso-whey-zero");
    assert_eq!(created.discount, Some(10));
    assert!(created.on_sale);

    let listing = ctx.get("/category/proteines").await;
    assert!(listing.body.contains("Iso Whey Zero"));
    let home = ctx.get("/").await;
    assert!(home.body.contains("Iso Whey Zero"));
}

#[tokio::test]
async fn test_invalid_product_form_is_rerendered() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;

    let resp = ctx
        .post_form("/admin/products", &product_form("   ", "proteines", "9500"))
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("le nom est obligatoire"));
    assert!(resp.body.contains("value=\"9500\""));
    assert!(ctx.store.write_tokens().is_empty());

    let resp = ctx
        .post_form("/admin/products", &product_form("Iso", "proteines", "gratuit"))
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("le prix doit être un nombre positif"));
}

#[tokio::test]
async fn test_edit_page_prefills_form() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;

    let resp = ctx.get("/admin/products/whey/edit").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("action=\"/admin/products/whey\""));
    assert!(resp.body.contains("value=\"Gold Standard Whey\""));
    assert!(resp.body.contains("value=\"12000\""));
    assert!(resp.body.contains("value=\"proteines\" selected"));

    let missing = ctx.get("/admin/products/nope/edit").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_product() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;

    let resp = ctx
        .post_form(
            "/admin/products/creatine",
            &product_form("Créatine Creapure", "creatines", "3900"),
        )
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    let updated = ctx.store.product("creatine").expect("still stored");
    assert_eq!(updated.name, "Créatine Creapure");
    assert_eq!(updated.brand, "BioTech USA");

    let listing = ctx.get("/products").await;
    assert!(listing.body.contains("Créatine Creapure"));
    assert!(!listing.body.contains("Créatine Monohydrate"));
}

#[tokio::test]
async fn test_delete_product() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;

    let resp = ctx.post_form_htmx("/admin/products/pack-masse/delete", &[]).await;
    assert_eq!(resp.header("hx-redirect"), Some("/admin/products"));
    assert!(ctx.store.product("pack-masse").is_none());

    let listing = ctx.get("/category/packs").await;
    assert!(!listing.body.contains("Pack Prise de Masse"));
}

#[tokio::test]
async fn test_rejected_write_shows_banner() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;
    ctx.store.fail_writes(true);

    let resp = ctx
        .post_form("/admin/products", &product_form("Iso Whey Zero", "proteines", "9500"))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert!(resp.body.contains("Accès refusé"));
    assert!(resp.body.contains("value=\"Iso Whey Zero\""));
}

#[tokio::test]
async fn test_writes_require_sign_in() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post_form("/admin/products/whey/delete", &[])
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert!(ctx.store.product("whey").is_some());
    assert!(ctx.store.write_tokens().is_empty());
}

#[tokio::test]
async fn test_path_like_ids_are_not_written() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;

    let edit = ctx.get("/admin/products/..%2Fadmins%2Froot/edit").await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);

    let delete = ctx
        .post_form("/admin/products/..%2Fadmins%2Froot/delete", &[])
        .await;
    assert_eq!(delete.status, StatusCode::BAD_GATEWAY);
    assert!(delete.body.contains("existe plus."));

    let update = ctx
        .post_form(
            "/admin/products/..%2Fadmins%2Froot",
            &product_form("Intrus", "proteines", "1"),
        )
        .await;
    assert_eq!(update.status, StatusCode::BAD_GATEWAY);

    assert!(ctx.store.write_tokens().is_empty());
    assert_eq!(ctx.store.get_calls(), 0);
    assert_eq!(ctx.store.products().len(), 4);
}
