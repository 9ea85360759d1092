use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use admission_planner::config::AppConfig;
use admission_planner::data::AdmissionDataset;
use admission_planner::model::{AdmissionModel, FEATURE_NAMES};
use admission_planner::server::{configure, AppState, PredictResponse, ResourceReport};
use admission_planner::timetable::TimetableEntry;

const DATASET: &str = "\
Year,Total_Applicants,Seats_Available,Average_Salary,Admission_Competition_Ratio
2022,3000,600,80000,5.0
2022,1000,400,80000,2.5
2023,5000,800,80000,6.25
";

fn state(timetable_path: std::path::PathBuf) -> web::Data<AppState> {
    let dataset = AdmissionDataset::from_reader(DATASET.as_bytes()).unwrap();
    let names = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    let mut coefficients = vec![0.0; FEATURE_NAMES.len()];
    coefficients[0] = 0.5;
    let model = AdmissionModel::new(names, 20.0, coefficients).unwrap();

    let config = AppConfig {
        timetable_path,
        ..AppConfig::default()
    };
    web::Data::new(AppState::new(dataset, model, config).unwrap())
}

fn features() -> Value {
    json!({
        "high_school_percentage": 80.0,
        "entrance_exam_score": 200,
        "cgpa_1st_year": 8.0,
        "cgpa_2nd_year": 8.0,
        "cgpa_3rd_year": 8.0,
        "cgpa_4th_year": 8.0,
        "placement_rate": 75.0,
        "average_salary": 500000.0,
        "economic_condition_index": 5.0,
        "total_applicants": 4000,
        "seats_available": 500
    })
}

#[actix_web::test]
async fn health_endpoint_responds() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn resource_plan_for_known_year() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/resources/2022").to_request();
    let report: ResourceReport = test::call_and_read_body_json(&app, req).await;

    assert_eq!(report.headcount.seats_available, 1000);
    assert_eq!(report.resources.faculty_needed, 50);
    assert_eq!(report.resources.classrooms_needed, 25);
    assert_eq!(report.resources.labs_needed, 33);
    assert_eq!(report.budget.faculty_salary_budget, 4_000_000.0);
    assert_eq!(report.budget.marketing_budget, 100_000.0);
    assert_eq!(report.budget.infrastructure_budget, 4_550_000.0);
}

#[actix_web::test]
async fn unknown_year_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/resources/1990").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn years_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/resources/years").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "years": [2022, 2023] }));
}

#[actix_web::test]
async fn predict_returns_formatted_probability() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::post().uri("/predict").set_json(features()).to_request();
    let resp: PredictResponse = test::call_and_read_body_json(&app, req).await;
    assert!((resp.probability - 60.0).abs() < 1e-9);
    assert_eq!(resp.message, "Predicted Admission Probability: 60.00%");
}

#[actix_web::test]
async fn predict_rejects_out_of_range_input() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let mut body = features();
    body["seats_available"] = json!(0);
    let req = test::TestRequest::post().uri("/predict").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn dashboard_series() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/dashboard/trends").to_request();
    let trend: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(trend["labels"], json!(["2022", "2023"]));
    assert_eq!(trend["values"], json!([4000.0, 5000.0]));

    let histogram: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/dashboard/competition?bins=3").to_request(),
    )
    .await;
    assert_eq!(histogram["total"], json!(3));
    assert_eq!(histogram["bins"].as_array().unwrap().len(), 3);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/dashboard/competition?bins=0").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn timetable_falls_back_to_generation() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/timetable?seed=7").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["source"], "generated");
    assert_eq!(body["seed"], 7);
    assert!(body["notice"].is_string());
    assert_eq!(body["entries"].as_array().unwrap().len(), 100);
    assert_eq!(body["entries"][0]["Course"], "Computer Science");
    assert_eq!(body["entries"][0]["Day"], "Monday");
    assert_eq!(body["entries"][0]["Time Slot"], "9:00-10:00");

    let req = test::TestRequest::get().uri("/timetable?seed=7").to_request();
    let again: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(again["entries"], body["entries"]);
}

#[actix_web::test]
async fn timetable_csv_download() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/timetable.csv?seed=3").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("Content-Disposition").unwrap(),
        "attachment; filename=\"timetable.csv\""
    );

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.starts_with("Course,Day,Time Slot,Subject,Faculty,Location"));
    assert_eq!(text.lines().count(), 101);
}

#[actix_web::test]
async fn unreadable_store_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().to_path_buf())).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/timetable").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn download_matches_displayed_timetable() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/timetable").to_request();
    let shown: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(shown["source"], "generated");
    let seed = shown["seed"].as_u64().unwrap();
    let shown: Vec<TimetableEntry> = serde_json::from_value(shown["entries"].clone()).unwrap();

    let uri = format!("/timetable.csv?seed={seed}");
    let req = test::TestRequest::get().uri(&uri).to_request();
    let body = test::call_and_read_body(&app, req).await;
    let downloaded: Vec<TimetableEntry> = csv::Reader::from_reader(body.as_ref())
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(downloaded.len(), 100);
    assert_eq!(downloaded, shown);
}

#[actix_web::test]
async fn generated_seed_survives_json_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    for _ in 0..20 {
        let req = test::TestRequest::get().uri("/timetable").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let seed = body["seed"].as_u64().unwrap();
        assert_eq!(seed as f64 as u64, seed);
    }
}

async fn assert_json_bad_request<B: MessageBody>(resp: ServiceResponse<B>) {
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn malformed_requests_get_json_errors() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let mut body = features();
    body["entrance_exam_score"] = json!(210.5);
    let req = test::TestRequest::post().uri("/predict").set_json(body).to_request();
    assert_json_bad_request(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    assert_json_bad_request(test::call_service(&app, req).await).await;

    let req = test::TestRequest::get().uri("/dashboard/competition?bins=abc").to_request();
    assert_json_bad_request(test::call_service(&app, req).await).await;

    let req = test::TestRequest::get().uri("/timetable?seed=x").to_request();
    assert_json_bad_request(test::call_service(&app, req).await).await;

    let req = test::TestRequest::get().uri("/resources/abc").to_request();
    assert_json_bad_request(test::call_service(&app, req).await).await;
}

#[actix_web::test]
async fn homepage_escapes_server_text() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new().app_data(state(dir.path().join("t.csv"))).configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let page = std::str::from_utf8(&body).unwrap();
    assert!(page.contains("function escapeHtml"));
    assert!(page.contains("${escapeHtml(c)}"));
    assert!(page.contains("${escapeHtml(data.notice)}"));
    assert!(page.contains("/timetable.csv?seed=${data.seed}"));
}
