use onlycats::devserver::{DevServer, DevSettings};
use onlycats::logging::init_logging;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    init_logging("onlycats=info,actix_web=info");

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse::<u16>()
        .unwrap_or(8000);

    let server = DevServer::start(DevSettings::from_env(), ("0.0.0.0", port)).await?;
    info!(url = %server.base_url(), "point ONLYCATS_API_URL here");
    server.wait().await
}
