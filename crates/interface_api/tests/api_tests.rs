//! HTTP tests
//!
//! Drive the full router in-process against the in-memory adapters.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use domain_rural::{ProducerService, TaxIdKind, ValidationError};
use interface_api::auth::{create_token, TokenType};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};
use test_utils::{
    assert_detail, assert_error_at, assert_farm_non_field_error, assert_no_errors_at,
    assert_non_field_error, seeded_producer_port, seeded_users, FarmPayloadBuilder,
    ProducerPayloadBuilder, SeededProducerPort, SeededUsers, INVALID_CPF, OTHER_CPF,
    TEST_EMAIL, TEST_PASSWORD, VALID_CNPJ, VALID_CNPJ_FORMATTED, VALID_CPF,
    VALID_CPF_FORMATTED,
};

const SECRET: &str = "api-test-secret";

struct TestApp {
    router: Router,
    rural: SeededProducerPort,
    users: SeededUsers,
}

async fn test_app() -> TestApp {
    let rural = seeded_producer_port().await;
    let users = seeded_users().await;
    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        ..ApiConfig::default()
    };
    let state = AppState::new(
        ProducerService::new(Arc::new(rural.port.clone())),
        users.service.clone(),
        Arc::new(users.blacklist.clone()),
        config,
    );

    TestApp {
        router: create_router(state),
        rural,
        users,
    }
}

impl TestApp {
    fn access_token(&self) -> String {
        create_token(self.users.user.id, TokenType::Access, SECRET, 300).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn authorized(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.access_token();
        self.send(method, uri, body, Some(&token)).await
    }

    async fn create(&self, payload: Value) -> (StatusCode, Value) {
        self.authorized(Method::POST, "/produtores-rurais/", Some(payload)).await
    }

    fn producer(&self) -> ProducerPayloadBuilder {
        ProducerPayloadBuilder::new(self.rural.campinas.id)
    }

    fn farm(&self) -> FarmPayloadBuilder {
        FarmPayloadBuilder::new(self.rural.campinas.id)
    }

    async fn create_default(&self) -> i64 {
        let (status, body) = self.create(self.producer().build()).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}

// ============================================================================
// Producers
// ============================================================================

mod producer_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_retrieve_round_trip() {
        let app = test_app().await;
        let soja = app.rural.crop("Soja").id;
        let milho = app.rural.crop("Milho").id;
        let payload = app
            .producer()
            .cpf(VALID_CPF_FORMATTED)
            .farm(app.farm().crops(&[soja, milho]))
            .build();

        let (status, created) = app.create(payload).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        assert_eq!(created["cpf"], VALID_CPF);
        assert_eq!(created["cnpj"], Value::Null);
        assert_eq!(created["fazenda"]["area_total_hectares"], "100.00");
        assert_eq!(created["fazenda"]["area_agricultavel_hectares"], "80.00");
        assert_eq!(created["fazenda"]["area_vegetacao_hectares"], "20.00");
        let mut expected = vec![soja.get(), milho.get()];
        expected.sort_unstable();
        assert_eq!(created["fazenda"]["culturas_plantadas"], json!(expected));

        let uri = format!("/produtores-rurais/{}/", created["id"]);
        let (status, fetched) = app.authorized(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, list) = app.authorized(Method::GET, "/produtores-rurais/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([created]));
    }

    #[tokio::test]
    async fn test_company_producer_with_string_areas() {
        let app = test_app().await;
        let payload = app
            .producer()
            .cnpj(VALID_CNPJ_FORMATTED)
            .farm(app.farm().areas_str("250.5", "100", "150.5"))
            .build();

        let (status, created) = app.create(payload).await;

        assert_eq!(status, StatusCode::CREATED, "{created}");
        assert_eq!(created["cnpj"], VALID_CNPJ);
        assert_eq!(created["cpf"], Value::Null);
        assert_eq!(created["fazenda"]["area_total_hectares"], "250.50");
    }

    #[tokio::test]
    async fn test_both_identifiers_conflict() {
        let app = test_app().await;
        let payload = app.producer().set("cnpj", json!(VALID_CNPJ)).build();

        let (status, body) = app.create(payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_non_field_error(&body, &ValidationError::IdentityConflict.to_string());
        assert_eq!(app.rural.port.farm_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_identifier() {
        let app = test_app().await;
        let payload = app.producer().without_ids().build();

        let (status, body) = app.create(payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_non_field_error(&body, &ValidationError::IdentityMissing.to_string());
    }

    #[tokio::test]
    async fn test_invalid_cpf_reported_at_field() {
        let app = test_app().await;
        let (status, body) = app.create(app.producer().cpf(INVALID_CPF).build()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"cpf": ["CPF inválido."]}));
    }

    #[tokio::test]
    async fn test_farm_area_error_is_nested() {
        let app = test_app().await;
        let payload = app.producer().farm(app.farm().arable(90.0)).build();

        let (status, body) = app.create(payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_farm_non_field_error(&body, &ValidationError::AreaExceedsTotal.to_string());
        assert_no_errors_at(&body, "non_field_errors");
    }

    #[tokio::test]
    async fn test_area_sum_equal_to_total_is_accepted() {
        let app = test_app().await;
        let payload = app.producer().farm(app.farm().areas(100.0, 60.0, 40.0)).build();

        let (status, body) = app.create(payload).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    #[tokio::test]
    async fn test_unknown_references_and_missing_fields() {
        let app = test_app().await;
        let farm = app
            .farm()
            .set("cidade", json!(9999))
            .without("area_total_hectares");
        let payload = app.producer().without("nome").farm(farm).build();

        let (status, body) = app.create(payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_at(&body, &["nome"], "Este campo é obrigatório.");
        assert_error_at(&body, &["fazenda", "cidade"], "Pk inválido \"9999\" - objeto não existe.");
        assert_error_at(&body, &["fazenda", "area_total_hectares"], "Este campo é obrigatório.");
    }

    #[tokio::test]
    async fn test_duplicate_cpf_rejected() {
        let app = test_app().await;
        app.create_default().await;

        let (status, body) = app.create(app.producer().cpf(VALID_CPF_FORMATTED).build()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_at(
            &body,
            &["cpf"],
            &ValidationError::DuplicateTaxId(TaxIdKind::Individual).to_string(),
        );
        assert_eq!(app.rural.port.farm_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_past_precheck_returns_conflict() {
        let app = test_app().await;
        app.create_default().await;
        app.rural.port.serve_stale_uniqueness_reads().await;

        let (status, body) = app.create(app.producer().cpf(VALID_CPF_FORMATTED).build()).await;

        assert_eq!(status, StatusCode::CONFLICT, "{body}");
        assert!(body["detail"].is_string(), "{body}");
        assert_eq!(app.rural.port.farm_count().await, 1);
        assert_eq!(app.rural.port.producer_count().await, 1);
    }

    #[tokio::test]
    async fn test_partial_update_checks_merged_areas() {
        let app = test_app().await;
        let id = app.create_default().await;
        let uri = format!("/produtores-rurais/{id}/");
        let patch = ProducerPayloadBuilder::empty()
            .farm(FarmPayloadBuilder::empty().arable(90.0))
            .build();

        let (status, body) = app.authorized(Method::PATCH, &uri, Some(patch)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_non_field_error(&body, &ValidationError::AreaExceedsTotal.to_string());
        let (_, stored) = app.authorized(Method::GET, &uri, None).await;
        assert_eq!(stored["fazenda"]["area_agricultavel_hectares"], "80.00");
    }

    #[tokio::test]
    async fn test_partial_update_without_identifiers() {
        let app = test_app().await;
        let id = app.create_default().await;
        let patch = ProducerPayloadBuilder::empty().name("Ciclano").build();

        let (status, body) = app
            .authorized(Method::PATCH, &format!("/produtores-rurais/{id}/"), Some(patch))
            .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["nome"], "Ciclano");
        assert_eq!(body["cpf"], VALID_CPF);
    }

    #[tokio::test]
    async fn test_replace_overwrites_farm() {
        let app = test_app().await;
        let soja = app.rural.crop("Soja").id;
        let (_, created) = app
            .create(app.producer().farm(app.farm().crops(&[soja])).build())
            .await;
        let uri = format!("/produtores-rurais/{}/", created["id"]);
        let payload = app
            .producer()
            .farm(app.farm().city(app.rural.uberaba.id).areas(300.0, 100.0, 50.0))
            .build();

        let (status, body) = app.authorized(Method::PUT, &uri, Some(payload)).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["fazenda"]["id"], created["fazenda"]["id"]);
        assert_eq!(body["fazenda"]["cidade"], app.rural.uberaba.id.get());
        assert_eq!(body["fazenda"]["area_total_hectares"], "300.00");
        assert_eq!(body["fazenda"]["culturas_plantadas"], json!([]));
    }

    #[tokio::test]
    async fn test_delete_keeps_farm() {
        let app = test_app().await;
        let id = app.create_default().await;
        let uri = format!("/produtores-rurais/{id}/");

        let (status, _) = app.authorized(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = app.authorized(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_detail(&body, "Não encontrado.");
        assert_eq!(app.rural.port.producer_count().await, 0);
        assert_eq!(app.rural.port.farm_count().await, 1);

        let (status, _) = app.authorized(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let app = test_app().await;
        let (status, body) = app
            .authorized(Method::GET, "/produtores-rurais/abc/", None)
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_detail(&body, "Não encontrado.");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = test_app().await;
        let token = app.access_token();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/produtores-rurais/")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from("{\"nome\": "))
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].is_string());
    }
}

// ============================================================================
// Statistics
// ============================================================================

mod graphics_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_dashboard() {
        let app = test_app().await;
        let (status, body) = app.authorized(Method::GET, "/graphics/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_fazendas"], 0);
        assert_eq!(body["total_hectares"], "0.00");
        assert_eq!(body["total_fazendas_por_estado"], json!([]));
        assert_eq!(body["total_fazenda_culturas"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn test_dashboard_totals() {
        let app = test_app().await;
        let soja = app.rural.crop("Soja").id;
        let cafe = app.rural.crop("Café").id;
        app.create(app.producer().farm(app.farm().crops(&[soja, cafe])).build())
            .await;
        app.create(
            app.producer()
                .cpf(OTHER_CPF)
                .farm(
                    app.farm()
                        .city(app.rural.uberaba.id)
                        .areas(150.0, 100.0, 25.5)
                        .crops(&[soja]),
                )
                .build(),
        )
        .await;

        let (status, body) = app.authorized(Method::GET, "/graphics/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_fazendas"], 2);
        assert_eq!(body["total_hectares"], "250.00");
        assert_eq!(
            body["total_area_agricultavel"],
            json!({"total_agricultavel": "180.00", "total_vegetacao": "45.50"})
        );
        assert_eq!(
            body["total_fazenda_culturas"],
            json!([
                {"nome": "Algodão", "total": 0},
                {"nome": "Café", "total": 1},
                {"nome": "Cana de Açúcar", "total": 0},
                {"nome": "Milho", "total": 0},
                {"nome": "Soja", "total": 2}
            ])
        );
        assert_eq!(
            body["total_fazendas_por_estado"],
            json!([
                {"cidade__estado__nome": "Minas Gerais", "total": 1},
                {"cidade__estado__nome": "São Paulo", "total": 1}
            ])
        );
    }
}

// ============================================================================
// Authentication
// ============================================================================

mod auth_tests {
    use super::*;

    async fn obtain_pair(app: &TestApp) -> (String, String) {
        let (status, body) = app
            .send(
                Method::POST,
                "/token/",
                Some(json!({"email": TEST_EMAIL, "password": TEST_PASSWORD})),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["access"].as_str().unwrap().to_string(),
            body["refresh"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app().await;
        let (status, body) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = app.send(Method::GET, "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let app = test_app().await;
        let (status, body) = app
            .send(Method::GET, "/produtores-rurais/", None, None)
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_detail(&body, "Authentication credentials were not provided.");
    }

    #[tokio::test]
    async fn test_obtained_access_token_opens_protected_routes() {
        let app = test_app().await;
        let (access, refresh) = obtain_pair(&app).await;

        let (status, _) = app
            .send(Method::GET, "/graphics/", None, Some(&access))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .send(Method::GET, "/graphics/", None, Some(&refresh))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "token_not_valid");
    }

    #[tokio::test]
    async fn test_inactive_user_token_is_rejected() {
        let app = test_app().await;
        let token = app.access_token();
        app.users.port.set_active(app.users.user.id, false).await;

        let (status, body) = app
            .send(Method::GET, "/produtores-rurais/", None, Some(&token))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_detail(&body, "Given token not valid for any token type");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let app = test_app().await;
        let (status, body) = app
            .send(
                Method::POST,
                "/token/",
                Some(json!({"email": TEST_EMAIL, "password": "wrong"})),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_detail(&body, "No active account found with the given credentials");
    }

    #[tokio::test]
    async fn test_token_request_field_errors() {
        let app = test_app().await;
        let (status, body) = app
            .send(Method::POST, "/token/", Some(json!({"email": TEST_EMAIL})), None)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_at(&body, &["password"], "This field is required.");
    }

    #[tokio::test]
    async fn test_refresh_then_logout_revokes() {
        let app = test_app().await;
        let (_, refresh) = obtain_pair(&app).await;

        let (status, body) = app
            .send(Method::POST, "/token/refresh/", Some(json!({"refresh": refresh})), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let access = body["access"].as_str().unwrap().to_string();
        let (status, _) = app
            .send(Method::GET, "/produtores-rurais/", None, Some(&access))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send(Method::POST, "/logout/", Some(json!({"refresh_token": refresh})), None)
            .await;
        assert_eq!(status, StatusCode::RESET_CONTENT);

        let (status, body) = app
            .send(Method::POST, "/token/refresh/", Some(json!({"refresh": refresh})), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_detail(&body, "Token is invalid or expired");
        assert_eq!(body["code"], "token_not_valid");

        let (status, body) = app
            .send(Method::POST, "/logout/", Some(json!({"refresh_token": refresh})), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_detail(&body, "Invalid token");
    }

    #[tokio::test]
    async fn test_logout_rejects_access_and_garbage_tokens() {
        let app = test_app().await;
        let (access, _) = obtain_pair(&app).await;

        for token in [access.as_str(), "garbage", ""] {
            let (status, body) = app
                .send(Method::POST, "/logout/", Some(json!({"refresh_token": token})), None)
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "token {token:?}");
            assert_detail(&body, "Invalid token");
        }
    }
}
