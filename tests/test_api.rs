// HTTP API tests
// Author: Gabriel Demetrios Lafis

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value as JsonValue};

use data_sweeper::api::{configure, AppState};
use data_sweeper::chart::NO_NUMERIC_COLUMNS_WARNING;
use data_sweeper::storage::SessionStore;

const PEOPLE: &str = "name,age,city\nAnn,30,OSLO\nAnn,30,OSLO\nBob,,Bergen\nCid,41,Oslo\n";

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(
                    Arc::new(SessionStore::default()),
                    2,
                )))
                .configure(configure),
        )
        .await
    };
}

macro_rules! open_session {
    ($app:expr, $file_name:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions?filename={}", $file_name))
            .set_payload($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: JsonValue = test::read_body_json(resp).await;
        body["id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_health() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_upload_reports_file_details_and_preview() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/v1/sessions?filename=people.csv")
        .insert_header((header::CONTENT_TYPE, "text/csv"))
        .set_payload(PEOPLE)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: JsonValue = test::read_body_json(resp).await;
    assert_eq!(body["file"]["name"], "people.csv");
    assert_eq!(body["file"]["mime_type"], "text/csv");
    assert_eq!(body["file"]["size"], PEOPLE.len());
    assert_eq!(body["file"]["rows"], 4);
    assert_eq!(body["file"]["columns"], 3);
    assert_eq!(body["preview"]["rows"], 2);
    assert_eq!(body["preview"]["columns"][1]["data_type"], "integer");
    assert_eq!(body["preview"]["data"][0], json!(["Ann", 30, "OSLO"]));

    let id = body["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}", id))
        .to_request();
    let fetched: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["file"], body["file"]);
}

#[actix_web::test]
async fn test_unsupported_upload() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/v1/sessions?filename=picture.png")
        .set_payload("not a table")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: JsonValue = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Unsupported file format!");
}

#[actix_web::test]
async fn test_malformed_upload() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/v1/sessions?filename=broken.json")
        .set_payload("{oops")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_clean_session() {
    let app = app!();
    let id = open_session!(app, "people.csv", PEOPLE);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/clean", id))
        .set_json(json!({
            "renames": {"city": "town"},
            "drop_missing": true,
            "drop_duplicates": true,
            "lowercase": ["town"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: JsonValue = test::read_body_json(resp).await;
    assert_eq!(body["cleaned"]["rows"], 2);
    assert_eq!(
        body["cleaned"]["data"],
        json!([["Ann", 30, "oslo"], ["Cid", 41, "oslo"]])
    );
    assert_eq!(body["text_columns"], json!(["name", "town"]));
    assert_eq!(body["statistics"]["numeric"][0]["column"], "age");
    assert_eq!(body["statistics"]["numeric"][0]["count"], 2);
}

#[actix_web::test]
async fn test_clean_with_unknown_column() {
    let app = app!();
    let id = open_session!(app, "people.csv", PEOPLE);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/clean", id))
        .set_json(json!({"columns": ["nope"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: JsonValue = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_argument");
}

#[actix_web::test]
async fn test_chart_from_original_and_cleaned_data() {
    let app = app!();
    let id = open_session!(app, "people.csv", PEOPLE);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/chart", id))
        .set_json(json!({"x": "name", "y": "age"}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["source"], "original");
    assert_eq!(body["chart"]["title"], "name vs age");
    assert_eq!(body["chart"]["series"][0]["category"], "Ann");
    assert_eq!(body["chart"]["series"][0]["total"], 60.0);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/chart", id))
        .set_json(json!({
            "x": "name",
            "y": "age",
            "source": "cleaned",
            "options": {"drop_duplicates": true},
        }))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["source"], "cleaned");
    assert_eq!(body["chart"]["series"][0]["total"], 30.0);
}

#[actix_web::test]
async fn test_chart_without_numeric_columns() {
    let app = app!();
    let id = open_session!(app, "words.csv", "word,lang\nhei,no\nhello,en\n");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/chart/options", id))
        .set_json(json!({}))
        .to_request();
    let options: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(options["available"], false);
    assert_eq!(options["warning"], NO_NUMERIC_COLUMNS_WARNING);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/chart", id))
        .set_json(json!({"x": "word", "y": "lang"}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert!(body.get("chart").is_none());
    assert_eq!(body["warning"], NO_NUMERIC_COLUMNS_WARNING);
}

#[actix_web::test]
async fn test_export_downloads() {
    let app = app!();
    let id = open_session!(app, "people.csv", PEOPLE);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/export/csv", id))
        .set_json(json!({"drop_missing": true, "drop_duplicates": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/csv");
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"cleaned_data.csv\""
    );
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], b"name,age,city\nAnn,30,OSLO\nCid,41,Oslo\n");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/export/xlsx", id))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"cleaned_data.xlsx\""
    );
    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"PK"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/export/pdf", id))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_replace_and_delete_session() {
    let app = app!();
    let id = open_session!(app, "people.csv", PEOPLE);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/sessions/{}?filename=words.txt", id))
        .set_payload("word\tlang\nhei\tno\n")
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["file"]["name"], "words.txt");
    assert_eq!(body["file"]["mime_type"], "text/plain");
    assert_eq!(body["file"]["rows"], 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/sessions/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_chart_rendered_as_svg() {
    let app = app!();
    let id = open_session!(app, "people.csv", PEOPLE);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/chart/svg", id))
        .set_json(json!({"x": "city", "y": "age"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/svg+xml");

    let body = test::read_body(resp).await;
    let svg = std::str::from_utf8(&body).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("city vs age"));
    assert!(svg.contains("OSLO"));
    assert!(!svg.contains("Bergen"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/chart/svg", id))
        .set_json(json!({"x": "city", "y": "name"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_chart_svg_without_numeric_columns() {
    let app = app!();
    let id = open_session!(app, "words.csv", "word,lang\nhei,no\nhello,en\n");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/chart/svg", id))
        .set_json(json!({"x": "word", "y": "lang"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: JsonValue = test::read_body_json(resp).await;
    assert_eq!(body["message"], NO_NUMERIC_COLUMNS_WARNING);
}
