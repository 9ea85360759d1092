use actix_web::error::ErrorInternalServerError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use log::{debug, error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::analytics::{TrendsAnalyzer, DEFAULT_HISTOGRAM_BINS};
use crate::config::AppConfig;
use crate::data::{AdmissionDataset, HeadcountSample};
use crate::error::{PlannerError, Result};
use crate::model::{format_probability, AdmissionFeatures, AdmissionModel, FEATURE_NAMES};
use crate::resources::{plan_for_headcount, BudgetPlan, ResourcePlan};
use crate::store::{
    export_csv, load_or_generate, CsvTimetableStore, LoadedTimetable, TimetableSource,
};
use crate::timetable::{Timetable, TimetableRequest};

/// Everything a request handler may read. Built once in `main`, never mutated.
pub struct AppState {
    pub dataset: AdmissionDataset,
    pub model: AdmissionModel,
    pub config: AppConfig,
    pub store: CsvTimetableStore,
    pub timetable_request: TimetableRequest,
}

impl AppState {
    pub fn new(
        dataset: AdmissionDataset,
        model: AdmissionModel,
        config: AppConfig,
    ) -> Result<Self> {
        config.planning.validate()?;
        if model.feature_count() != FEATURE_NAMES.len() {
            return Err(PlannerError::ModelLoad {
                path: config.model_path.clone(),
                reason: format!(
                    "expected {} features, artifact has {}",
                    FEATURE_NAMES.len(),
                    model.feature_count()
                ),
            });
        }

        let store = CsvTimetableStore::new(config.timetable_path.clone());
        Ok(Self {
            dataset,
            model,
            config,
            store,
            timetable_request: TimetableRequest::default(),
        })
    }

    /// Loads the dataset and model named in `config`.
    pub fn load(config: AppConfig) -> Result<Self> {
        let dataset = AdmissionDataset::load(&config.dataset_path)?;
        let model = AdmissionModel::load(&config.model_path)?;
        Self::new(dataset, model, config)
    }

    /// The same seed always yields the same generated timetable, so the page
    /// and its CSV download agree.
    fn timetable(&self, seed: u64) -> Result<LoadedTimetable> {
        load_or_generate(
            &self.store,
            &self.timetable_request,
            self.config.persist_generated,
            &mut StdRng::seed_from_u64(seed),
        )
    }
}

impl ResponseError for PlannerError {
    fn status_code(&self) -> StatusCode {
        match self {
            PlannerError::InvalidConfiguration(_)
            | PlannerError::InvalidInput(_)
            | PlannerError::FeatureCount { .. } => StatusCode::BAD_REQUEST,
            PlannerError::UnknownYear(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("{self}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PredictResponse {
    pub probability: f64,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResourceReport {
    pub year: i32,
    pub headcount: HeadcountSample,
    pub average_salary: f64,
    pub resources: ResourcePlan,
    pub budget: BudgetPlan,
}

#[derive(Serialize, Debug)]
pub struct TimetableResponse {
    pub source: TimetableSource,
    /// Pass back as `?seed=` to download this exact timetable.
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub entries: Timetable,
}

#[derive(Deserialize, Debug)]
pub struct TimetableQuery {
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct HistogramQuery {
    pub bins: Option<usize>,
}

// Dashboard endpoints
async fn yearly_trends(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(TrendsAnalyzer::new(&state.dataset).yearly_applicant_trend())
}

async fn competition_ratio(
    state: web::Data<AppState>,
    query: web::Query<HistogramQuery>,
) -> Result<HttpResponse> {
    let bins = query.bins.unwrap_or(DEFAULT_HISTOGRAM_BINS);
    let histogram = TrendsAnalyzer::new(&state.dataset).competition_ratio_histogram(bins)?;
    Ok(HttpResponse::Ok().json(histogram))
}

// Prediction endpoint
async fn predict(
    state: web::Data<AppState>,
    req: web::Json<AdmissionFeatures>,
) -> Result<HttpResponse> {
    let probability = state.model.predict_admission(&req)?;
    debug!("prediction for {:?}: {probability}", req.0);
    Ok(HttpResponse::Ok().json(PredictResponse {
        probability,
        message: format_probability(probability),
    }))
}

// Resource planning endpoints
async fn planning_years(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "years": state.dataset.years() }))
}

async fn resource_plan(state: web::Data<AppState>, year: web::Path<i32>) -> Result<HttpResponse> {
    let year = year.into_inner();
    let headcount = state.dataset.headcount_for_year(year)?;
    let average_salary = state.dataset.average_salary();
    let (resources, budget) =
        plan_for_headcount(headcount.seats_available, average_salary, &state.config.planning)?;

    Ok(HttpResponse::Ok().json(ResourceReport {
        year,
        headcount,
        average_salary,
        resources,
        budget,
    }))
}

// Operational tools endpoints

/// Largest integer a browser can read back from JSON without rounding.
const MAX_JS_SAFE_SEED: u64 = (1 << 53) - 1;

fn fresh_seed() -> u64 {
    rand::thread_rng().gen_range(0..=MAX_JS_SAFE_SEED)
}

async fn load_timetable(
    state: web::Data<AppState>,
    seed: u64,
) -> actix_web::Result<LoadedTimetable> {
    let loaded = tokio::task::spawn_blocking(move || state.timetable(seed))
        .await
        .map_err(ErrorInternalServerError)??;
    Ok(loaded)
}

async fn timetable(
    state: web::Data<AppState>,
    query: web::Query<TimetableQuery>,
) -> actix_web::Result<HttpResponse> {
    let seed = query.seed.unwrap_or_else(fresh_seed);
    let loaded = load_timetable(state, seed).await?;
    Ok(HttpResponse::Ok().json(TimetableResponse {
        source: loaded.source,
        seed,
        notice: loaded.notice,
        entries: loaded.timetable,
    }))
}

async fn timetable_csv(
    state: web::Data<AppState>,
    query: web::Query<TimetableQuery>,
) -> actix_web::Result<HttpResponse> {
    let seed = query.seed.unwrap_or_else(fresh_seed);
    let loaded = load_timetable(state, seed).await?;
    let body = export_csv(&loaded.timetable)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", "attachment; filename=\"timetable.csv\""))
        .body(body))
}

// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("Admission Planner API is running!")
}

// Homepage endpoint
async fn serve_homepage() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(HOMEPAGE)
}

fn invalid_input(message: String) -> actix_web::Error {
    PlannerError::InvalidInput(message).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // extractor rejections use the same JSON error body as handler errors
    let json = web::JsonConfig::default().error_handler(|err, _| invalid_input(err.to_string()));
    let query = web::QueryConfig::default().error_handler(|err, _| invalid_input(err.to_string()));
    let path = web::PathConfig::default().error_handler(|err, _| invalid_input(err.to_string()));

    cfg.app_data(json)
        .app_data(query)
        .app_data(path)
        .route("/", web::get().to(serve_homepage))
        .route("/health", web::get().to(health_check))
        .route("/dashboard/trends", web::get().to(yearly_trends))
        .route("/dashboard/competition", web::get().to(competition_ratio))
        .route("/predict", web::post().to(predict))
        .route("/resources/years", web::get().to(planning_years))
        .route("/resources/{year}", web::get().to(resource_plan))
        .route("/timetable", web::get().to(timetable))
        .route("/timetable.csv", web::get().to(timetable_csv));
}

const HOMEPAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>College Admission Prediction</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 0; display: flex; }
        nav { width: 220px; background: #f0f2f6; min-height: 100vh; padding: 20px; }
        nav button { display: block; width: 100%; margin: 8px 0; padding: 10px; border: none; border-radius: 4px; background: #007bff; color: white; cursor: pointer; }
        main { flex: 1; padding: 30px; }
        section { display: none; }
        section.active { display: block; }
        label { display: block; margin-top: 8px; font-weight: bold; }
        input, select { padding: 6px; width: 240px; }
        table { border-collapse: collapse; margin-top: 15px; }
        th, td { padding: 6px 10px; border-bottom: 1px solid #ddd; text-align: left; }
        .notice { background: #f8d7da; color: #721c24; padding: 10px; border-radius: 4px; }
        .result { background: #d4edda; color: #155724; padding: 10px; border-radius: 4px; margin-top: 10px; }
    </style>
</head>
<body>
    <nav>
        <h3>Navigation</h3>
        <button onclick="show('dashboard')">Dashboard</button>
        <button onclick="show('predict')">Predict Admissions</button>
        <button onclick="show('resources')">Resource Planning</button>
        <button onclick="show('tools')">Operational Tools</button>
    </nav>
    <main>
        <section id="dashboard" class="active">
            <h1>Admission Prediction Dashboard</h1>
            <p>Analyze past admission trends and forecast future enrollments.</p>
            <h3>Yearly Admission Trends</h3>
            <table id="trend-table"></table>
            <h3>Admission Competition Ratio</h3>
            <table id="ratio-table"></table>
        </section>

        <section id="predict">
            <h1>Admission Prediction</h1>
            <div id="feature-form"></div>
            <button onclick="predict()">Predict Admission Probability</button>
            <div id="prediction"></div>
        </section>

        <section id="resources">
            <h1>Resource Allocation Planning</h1>
            <label for="year">Select Year</label>
            <select id="year" onchange="plan()"></select>
            <div id="plan"></div>
        </section>

        <section id="tools">
            <h1>Operational Efficiency Tools</h1>
            <h3>Timetable Generation</h3>
            <a id="download" href="/timetable.csv">Download Timetable CSV</a>
            <div id="timetable"></div>
        </section>
    </main>

    <script>
        const fields = [
            ['high_school_percentage', 'High School Percentage'],
            ['entrance_exam_score', 'Entrance Exam Score'],
            ['cgpa_1st_year', 'CGPA 1st Year'],
            ['cgpa_2nd_year', 'CGPA 2nd Year'],
            ['cgpa_3rd_year', 'CGPA 3rd Year'],
            ['cgpa_4th_year', 'CGPA 4th Year'],
            ['placement_rate', 'Placement Rate'],
            ['average_salary', 'Average Salary'],
            ['economic_condition_index', 'Economic Condition Index'],
            ['total_applicants', 'Total Applicants'],
            ['seats_available', 'Seats Available'],
        ];
        const money = v => '₹' + v.toLocaleString('en-IN', {minimumFractionDigits: 2, maximumFractionDigits: 2});

        function show(id) {
            document.querySelectorAll('section').forEach(s => s.classList.toggle('active', s.id === id));
            if (id === 'resources') loadYears();
            if (id === 'tools') loadTimetable();
        }

        function escapeHtml(value) {
            return String(value).replace(/[&<>"']/g, c => ({
                '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
            })[c]);
        }

        function rows(header, data) {
            return '<tr>' + header.map(h => `<th>${escapeHtml(h)}</th>`).join('') + '</tr>' +
                data.map(r => '<tr>' + r.map(c => `<td>${escapeHtml(c)}</td>`).join('') + '</tr>').join('');
        }

        async function loadDashboard() {
            const trend = await (await fetch('/dashboard/trends')).json();
            document.getElementById('trend-table').innerHTML =
                rows(['Year', 'Total Applicants'], trend.labels.map((l, i) => [l, trend.values[i]]));
            const ratio = await (await fetch('/dashboard/competition')).json();
            document.getElementById('ratio-table').innerHTML =
                rows(['Range', 'Count'], ratio.bins.map(b => [`${b.lower.toFixed(2)} - ${b.upper.toFixed(2)}`, b.count]));
        }

        async function predict() {
            const body = {};
            fields.forEach(([key]) => body[key] = parseFloat(document.getElementById(key).value || '0'));
            const response = await fetch('/predict', {
                method: 'POST',
                headers: {'Content-Type': 'application/json'},
                body: JSON.stringify(body)
            });
            const data = await response.json();
            document.getElementById('prediction').innerHTML = response.ok
                ? `<div class="result">${escapeHtml(data.message)}</div>`
                : `<div class="notice">${escapeHtml(data.error)}</div>`;
        }

        async function loadYears() {
            const select = document.getElementById('year');
            if (select.options.length) return;
            const data = await (await fetch('/resources/years')).json();
            select.innerHTML = data.years.map(y => `<option>${escapeHtml(y)}</option>`).join('');
            plan();
        }

        async function plan() {
            const year = document.getElementById('year').value;
            const data = await (await fetch(`/resources/${year}`)).json();
            document.getElementById('plan').innerHTML = `
                <h3>Resource Requirements for ${escapeHtml(data.year)}</h3>
                <p>Estimated Faculty Required: ${escapeHtml(data.resources.faculty_needed)}</p>
                <p>Estimated Classrooms Required: ${escapeHtml(data.resources.classrooms_needed)}</p>
                <p>Estimated Labs Required: ${escapeHtml(data.resources.labs_needed)}</p>
                <h3>Budget Estimation</h3>
                <p>Faculty Salary Budget: ${money(data.budget.faculty_salary_budget)}</p>
                <p>Suggested Marketing Budget: ${money(data.budget.marketing_budget)}</p>
                <p>Infrastructure Budget: ${money(data.budget.infrastructure_budget)}</p>`;
        }

        async function loadTimetable() {
            const response = await fetch('/timetable');
            const data = await response.json();
            const div = document.getElementById('timetable');
            if (!response.ok) {
                div.innerHTML = `<div class="notice">${escapeHtml(data.error)}</div>`;
                return;
            }
            document.getElementById('download').href = `/timetable.csv?seed=${data.seed}`;
            div.innerHTML = (data.notice ? `<div class="notice">${escapeHtml(data.notice)}</div>` : '') +
                '<table>' + rows(['Course', 'Day', 'Time Slot', 'Subject', 'Faculty', 'Location'],
                    data.entries.map(e => [e.Course, e.Day, e['Time Slot'], e.Subject, e.Faculty, e.Location])) + '</table>';
        }

        document.getElementById('feature-form').innerHTML = fields
            .map(([key, label]) => `<label for="${key}">${label}</label><input type="number" id="${key}" step="any">`)
            .join('');
        loadDashboard();
    </script>
</body>
</html>
"#;
