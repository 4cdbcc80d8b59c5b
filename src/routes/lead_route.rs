use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::dal::lead_db::{LeadQuery, LeadStore};

#[derive(Deserialize)]
struct GetLeadsParams {
    #[serde(default)]
    min_intent: i32,
    domain: Option<String>,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    20
}

#[get("")]
async fn get_leads(
    store: web::Data<dyn LeadStore>,
    params: web::Query<GetLeadsParams>,
) -> HttpResponse {
    let filter = LeadQuery {
        min_intent: params.min_intent,
        domain: params.domain.clone(),
        limit: params.limit,
    };

    match store.query(&filter).await {
        Ok(leads) => HttpResponse::Ok().json(json!({
            "count": leads.len(),
            "filters": filter,
            "leads": leads,
        })),
        Err(e) => {
            log::error!("Failed to query leads: {:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
