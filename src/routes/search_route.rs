use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

use crate::domain::lead::SearchRequest;
use crate::services::SearchPipeline;

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    min_intent: i32,
}

#[post("")]
async fn search_leads(
    pipeline: web::Data<SearchPipeline>,
    body: web::Json<SearchRequest>,
    params: web::Query<SearchParams>,
) -> HttpResponse {
    let report = pipeline.run(&body, params.min_intent).await;

    HttpResponse::Ok().json(report)
}
