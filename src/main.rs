use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use surefire_runner::api::{configure_routes, AppState};
use surefire_runner::banner;
use surefire_runner::config::RunnerConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  No .env file loaded: {}", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = RunnerConfig::from_env().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    log::info!(
        "Build command: {} {} (descriptor: {}, reports: {})",
        config.build_program,
        config.build_args.join(" "),
        config.descriptor_file,
        config.reports_dir.display()
    );

    let bind_address = config.bind_address();
    let state = AppState::new(config);

    println!("🚀 Listening on http://{}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
