use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};

use crate::{
    dal::lead_db::LeadStore,
    routes::{default_route, lead_route, search_route},
    services::SearchPipeline,
};

pub fn run(
    listener: TcpListener,
    pipeline: SearchPipeline,
    lead_store: Arc<dyn LeadStore>,
) -> Result<Server, std::io::Error> {
    let pipeline = web::Data::new(pipeline);
    let lead_store: Data<dyn LeadStore> = Data::from(lead_store);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(web::scope("/search").service(search_route::search_leads))
            .service(web::scope("/leads").service(lead_route::get_leads))
            .app_data(pipeline.clone())
            .app_data(lead_store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
