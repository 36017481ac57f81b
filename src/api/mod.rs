//! HTTP surface of the portal.
//!
//! Every route lives under `/api`. Handlers are thin: they pull the session
//! and body out of the request and hand them to [`crate::core`].

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod content;
pub mod error;
pub mod extract;
pub mod invoices;
pub mod potm;
pub mod quotes;

use crate::{auth::AuthKeys, config::AppConfig};
use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Shared state cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// Session token signing keys
    pub auth: Arc<AuthKeys>,
    /// Loaded `config.toml`
    pub config: Arc<AppConfig>,
}

/// Body returned by mutations that have nothing else to say.
pub(crate) fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        // Catalog
        .route("/products", get(catalog::list_catalog).post(catalog::create))
        .route("/products/{id}", get(catalog::get_product))
        .route(
            "/admin/products",
            get(catalog::admin_list).post(catalog::create),
        )
        .route(
            "/admin/products/{id}",
            put(catalog::update).delete(catalog::delete),
        )
        // Content
        .route("/promotions", get(content::list_promotions))
        .route("/promotions/{id}", get(content::get_promotion))
        .route(
            "/admin/promotions",
            get(content::admin_list_promotions).post(content::create_promotion),
        )
        .route(
            "/admin/promotions/{id}",
            put(content::update_promotion).delete(content::delete_promotion),
        )
        .route("/assets", get(content::list_assets))
        .route(
            "/admin/assets",
            get(content::admin_list_assets).post(content::create_asset),
        )
        .route(
            "/admin/assets/{id}",
            put(content::update_asset).delete(content::delete_asset),
        )
        .route("/resources", get(content::list_resources))
        .route(
            "/admin/resources",
            get(content::admin_list_resources).post(content::create_resource),
        )
        .route(
            "/admin/resources/{id}",
            put(content::update_resource).delete(content::delete_resource),
        )
        .route("/home", get(content::get_home))
        .route(
            "/admin/home",
            get(content::admin_get_home).put(content::update_home),
        )
        // Quotes
        .route("/quotes/current", get(quotes::current))
        .route("/quotes/add-item", post(quotes::add_item))
        .route("/quotes/remove-item", post(quotes::remove_item))
        .route("/quotes/submit", post(quotes::submit))
        .route("/quotes/my", get(quotes::my_quotes))
        .route("/admin/quotes", get(quotes::admin_list))
        // Product of the Month
        .route("/potm/calendar", get(potm::calendar))
        .route("/potm/apply", post(potm::apply))
        .route("/potm/my-applications", get(potm::my_applications))
        .route(
            "/admin/potm",
            get(potm::admin_months).put(potm::admin_set_month),
        )
        .route("/admin/potm/applications", get(potm::admin_applications))
        .route(
            "/admin/potm/applications/{id}",
            put(potm::admin_update_application),
        )
        // Companies and users
        .route(
            "/admin/companies",
            get(admin::list_companies).post(admin::create_company),
        )
        .route(
            "/admin/companies/{id}",
            get(admin::get_company)
                .put(admin::update_company)
                .delete(admin::delete_company),
        )
        .route(
            "/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route(
            "/admin/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        // Invoices
        .route(
            "/admin/invoices",
            get(invoices::admin_list).post(invoices::create),
        )
        .route("/admin/invoices/from-quote", post(invoices::create_from_quote))
        .route(
            "/admin/invoices/{id}",
            get(invoices::admin_get)
                .put(invoices::update)
                .delete(invoices::delete),
        )
        .route("/admin/invoices/{id}/pdf", get(invoices::pdf))
        .route("/invoices/my", get(invoices::my_invoices))
        .route("/invoices/{id}", get(invoices::get_for_user))
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| warn!("Ignoring invalid CORS origin '{}': {}", origin, e))
                .ok()
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    info!("CORS enabled for {} origin(s)", origins.len());
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
    )
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);
    let app = Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http());

    let app = match cors {
        Some(cors) => app.layer(cors),
        None => app,
    };
    app.with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::potm,
        entities::Company,
        errors::Result,
        test_utils::{
            TEST_PASSWORD, create_test_admin, create_test_company, create_test_invoice_row,
            create_test_product, create_test_vendor, setup_test_db, test_state,
        },
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use sea_orm::EntityTrait;
    use tower::ServiceExt;

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_state_clones_share_database() -> Result<()> {
        let state = test_state(setup_test_db().await?);
        let company = create_test_company(&state.db, "Acme").await?;

        let cloned = state.clone();
        let found = Company::find_by_id(company.id).one(&cloned.db).await?;
        assert_eq!(found.map(|c| c.name), Some("Acme".to_string()));
        Ok(())
    }

    async fn login(app: &Router, email: &str) -> String {
        let response = send(
            app,
            json_request(
                Method::POST,
                "/api/auth/login",
                None,
                &json!({ "email": email, "password": TEST_PASSWORD }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_session_reads_it() -> Result<()> {
        let db = setup_test_db().await?;
        let acme = create_test_company(&db, "Acme").await?;
        create_test_vendor(&db, "vendor@acme.test", Some(acme.id)).await?;
        let app = router(test_state(db));

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/auth/login",
                None,
                &json!({ "email": "Vendor@Acme.test", "password": TEST_PASSWORD }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("HttpOnly"));

        let body = body_json(response).await;
        assert_eq!(body["user"]["email"], "vendor@acme.test");
        assert_eq!(body["user"]["role"], "vendor");
        assert!(body["user"].get("passwordHash").is_none());

        let session_pair = cookie.split(';').next().unwrap().to_string();
        let request = Request::builder()
            .uri("/api/auth/session")
            .header(header::COOKIE, session_pair)
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["email"], "vendor@acme.test");
        assert_eq!(body["company"]["name"], "Acme");
        Ok(())
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_unauthorized() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_vendor(&db, "vendor@acme.test", None).await?;
        let app = router(test_state(db));

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/auth/login",
                None,
                &json!({ "email": "vendor@acme.test", "password": "wrong-password" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_reject_anonymous_and_vendors() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_vendor(&db, "vendor@acme.test", None).await?;
        let app = router(test_state(db));
        let vendor_token = login(&app, "vendor@acme.test").await;

        for uri in [
            "/api/admin/products",
            "/api/admin/companies",
            "/api/admin/users",
            "/api/admin/invoices",
            "/api/admin/potm/applications",
            "/api/admin/assets",
        ] {
            let response = send(&app, get_request(uri, None)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");

            let response = send(&app, get_request(uri, Some(&vendor_token))).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/products",
                Some(&vendor_token),
                &json!({ "name": "Mug", "category": "Drinkware" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_public_catalog_lists_active_products() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Tote Bag", Some(12.5)).await?;
        create_test_product(&db, "Cap", None).await?;
        let app = router(test_state(db));

        let response = send(&app, get_request("/api/products", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Cap", "Tote Bag"]);
        assert_eq!(body[0]["quoteItemCount"], 0);

        let response = send(&app, get_request("/api/products/9999", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_quote_cart_flow_over_http() -> Result<()> {
        let db = setup_test_db().await?;
        let acme = create_test_company(&db, "Acme").await?;
        create_test_vendor(&db, "vendor@acme.test", Some(acme.id)).await?;
        let product = create_test_product(&db, "Tote Bag", Some(12.5)).await?;
        let app = router(test_state(db));
        let token = login(&app, "vendor@acme.test").await;

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/quotes/add-item",
                Some(&token),
                &json!({ "productId": product.id, "quantity": 3 }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);

        let response = send(&app, get_request("/api/quotes/current", Some(&token))).await;
        let cart = body_json(response).await;
        assert_eq!(cart["status"], "pending");
        assert_eq!(cart["items"][0]["qty"], 3);
        let quote_id = cart["id"].as_i64().unwrap();

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/quotes/submit",
                Some(&token),
                &json!({ "quoteId": quote_id, "name": "Spring order" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "submitted");

        let response = send(&app, get_request("/api/quotes/my", Some(&token))).await;
        let mine = body_json(response).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["name"], "Spring order");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_company_with_users_is_bad_request() -> Result<()> {
        let db = setup_test_db().await?;
        let acme = create_test_company(&db, "Acme").await?;
        create_test_vendor(&db, "vendor@acme.test", Some(acme.id)).await?;
        create_test_admin(&db, "admin@portal.test").await?;
        let app = router(test_state(db));
        let token = login(&app, "admin@portal.test").await;

        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/admin/companies/{}", acme.id))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_vendor_cannot_read_other_company_invoice() -> Result<()> {
        let db = setup_test_db().await?;
        let acme = create_test_company(&db, "Acme").await?;
        let globex = create_test_company(&db, "Globex").await?;
        create_test_vendor(&db, "vendor@acme.test", Some(acme.id)).await?;
        let own = create_test_invoice_row(&db, acme.id, "INV-2026-001").await?;
        let other = create_test_invoice_row(&db, globex.id, "INV-2026-002").await?;
        let app = router(test_state(db));
        let token = login(&app, "vendor@acme.test").await;

        let response = send(
            &app,
            get_request(&format!("/api/invoices/{}", own.id), Some(&token)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            get_request(&format!("/api/invoices/{}", other.id), Some(&token)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&app, get_request("/api/invoices/my", Some(&token))).await;
        let mine = body_json(response).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["invoiceNumber"], "INV-2026-001");
        Ok(())
    }

    #[tokio::test]
    async fn test_invoice_create_and_pdf_download() -> Result<()> {
        let db = setup_test_db().await?;
        let acme = create_test_company(&db, "Acme").await?;
        create_test_admin(&db, "admin@portal.test").await?;
        let app = router(test_state(db));
        let token = login(&app, "admin@portal.test").await;

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/admin/invoices",
                Some(&token),
                &json!({
                    "companyId": acme.id,
                    "invoiceDate": "2026-03-15",
                    "items": [
                        { "description": "Tote Bag", "quantity": 2, "unitPrice": 12.5 },
                        { "description": "Setup", "quantity": 1, "unitPrice": 40.0 }
                    ]
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let invoice = body_json(response).await;
        let number = invoice["invoiceNumber"].as_str().unwrap().to_string();
        assert!(number.starts_with("INV-") && number.ends_with("-001"));
        assert!((invoice["total"].as_f64().unwrap() - 65.0).abs() < f64::EPSILON);
        let id = invoice["id"].as_i64().unwrap();

        let response = send(
            &app,
            get_request(&format!("/api/admin/invoices/{id}/pdf"), Some(&token)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            format!("attachment; filename=\"invoice-{number}.pdf\"").as_str()
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        Ok(())
    }

    #[tokio::test]
    async fn test_potm_apply_and_approve_over_http() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_vendor(&db, "vendor@acme.test", None).await?;
        create_test_admin(&db, "admin@portal.test").await?;
        potm::ensure_year(&db, 2026).await?;
        let app = router(test_state(db));
        let vendor = login(&app, "vendor@acme.test").await;
        let admin = login(&app, "admin@portal.test").await;

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/potm/apply",
                Some(&vendor),
                &json!({
                    "monthKey": "2026-05",
                    "companyName": "Acme",
                    "contactName": "Ada",
                    "contactEmail": "ada@acme.test",
                    "productName": "Widget",
                    "description": "A very good widget"
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, get_request("/api/admin/potm/applications", Some(&admin))).await;
        let applications = body_json(response).await;
        let id = applications[0]["id"].as_i64().unwrap();

        let response = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/admin/potm/applications/{id}"),
                Some(&admin),
                &json!({ "status": "approved" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            get_request("/api/potm/calendar?year=2026", Some(&vendor)),
        )
        .await;
        let calendar = body_json(response).await;
        assert_eq!(calendar.as_array().unwrap().len(), 12);
        assert_eq!(calendar[4]["status"], "reserved");
        assert_eq!(calendar[4]["reservedLabel"], "Acme - Widget");
        Ok(())
    }
}
