use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test, web};
use serde_json::Value;

use fbref_stats::api::{self, AppState};
use fbref_stats::catalog::Category;
use fbref_stats::config::DatabaseLocation;
use fbref_stats::merge::MergedRecord;
use fbref_stats::normalize::StatValue;
use fbref_stats::store::{Team, append_category_records, insert_team_if_absent, open_db};

fn seeded_state() -> web::Data<AppState> {
    let mut conn = open_db(&DatabaseLocation::Memory).expect("in-memory db");
    for (id, name) in [("206d90db", "Barcelona"), ("53a2f082", "Real Madrid")] {
        insert_team_if_absent(
            &conn,
            &Team {
                id: id.to_string(),
                name: name.to_string(),
                league: "La Liga".to_string(),
            },
        )
        .unwrap();
    }
    let tx = conn.transaction().unwrap();
    append_category_records(
        &tx,
        Category::KeeperAdvanced,
        &[MergedRecord {
            team_id: "206d90db".to_string(),
            season: "2025-2026".to_string(),
            values: vec![
                ("gk_psxg_for".to_string(), StatValue::Float(8.4)),
                ("gk_psxg_against".to_string(), StatValue::Float(12.1)),
            ],
        }],
    )
    .unwrap();
    tx.commit().unwrap();
    web::Data::new(AppState::new(conn))
}

#[actix_web::test]
async fn root_reports_running() {
    let app = test::init_service(App::new().app_data(seeded_state()).configure(api::configure)).await;
    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "FBref stats API is running");
}

#[actix_web::test]
async fn lists_teams_with_paging() {
    let app = test::init_service(App::new().app_data(seeded_state()).configure(api::configure)).await;

    let req = test::TestRequest::get().uri("/teams").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let teams = body.as_array().expect("array");
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0]["id"], "206d90db");
    assert_eq!(teams[0]["league"], "La Liga");

    let req = test::TestRequest::get()
        .uri("/teams?offset=1&limit=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["name"], "Real Madrid");
}

#[actix_web::test]
async fn limit_above_cap_is_rejected() {
    let app = test::init_service(App::new().app_data(seeded_state()).configure(api::configure)).await;
    let req = test::TestRequest::get().uri("/teams?limit=101").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
}

#[actix_web::test]
async fn category_lookup_by_team_and_season() {
    let app = test::init_service(App::new().app_data(seeded_state()).configure(api::configure)).await;
    let req = test::TestRequest::get()
        .uri("/teams/206d90db/keeper-advanced?season=2025-2026")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["team_id"], "206d90db");
    assert_eq!(body["season"], "2025-2026");
    assert_eq!(body["gk_psxg_for"], 8.4);
    assert_eq!(body["gk_psxg_against"], 12.1);
}

#[actix_web::test]
async fn absent_record_is_null_not_an_error() {
    let app = test::init_service(App::new().app_data(seeded_state()).configure(api::configure)).await;
    for uri in [
        "/teams/206d90db/keeper-advanced?season=2019-2020",
        "/teams/53a2f082/keeper-advanced?season=2025-2026",
        "/teams/206d90db/possession?season=2025-2026",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert!(body.is_null(), "{uri}");
    }
}

#[actix_web::test]
async fn unknown_category_and_missing_season() {
    let app = test::init_service(App::new().app_data(seeded_state()).configure(api::configure)).await;

    let req = test::TestRequest::get()
        .uri("/teams/206d90db/keeper_adv?season=2025-2026")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");

    let req = test::TestRequest::get()
        .uri("/teams/206d90db/keeper-advanced")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
}

#[actix_web::test]
async fn malformed_paging_params_use_json_errors() {
    let app = test::init_service(App::new().app_data(seeded_state()).configure(api::configure)).await;
    for uri in ["/teams?limit=abc", "/teams?offset=-1"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error", "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}

#[actix_web::test]
async fn cors_preflight_allows_configured_origin() {
    let origin = "http://localhost:5173";
    let app = test::init_service(
        App::new()
            .app_data(seeded_state())
            .wrap(api::cors(origin))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/teams")
        .insert_header((header::ORIGIN, origin))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let headers = resp.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(origin)
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );

    let req = test::TestRequest::get()
        .uri("/teams")
        .insert_header((header::ORIGIN, origin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(origin)
    );
}
