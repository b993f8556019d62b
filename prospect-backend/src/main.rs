use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

use prospect_backend::agent::{HttpFetcher, PageFetcher};
use prospect_backend::ai::{CompletionBackend, OpenAIClient};
use prospect_backend::config::Config;
use prospect_backend::db::Database;
use prospect_backend::{controllers, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    log::info!("Initializing completion client with model {}", config.openai_model);
    let completion: Arc<dyn CompletionBackend> = Arc::new(
        OpenAIClient::new(&config.openai_api_key, &config.openai_model)
            .expect("Failed to create OpenAI client"),
    );
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new());

    log::info!(
        "Starting lead research server on port {} (step budget {}, step delay {}ms)",
        port,
        config.step_budget,
        config.step_delay_ms
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
                completion: Arc::clone(&completion),
                fetcher: Arc::clone(&fetcher),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::leads::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
