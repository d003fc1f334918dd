// --- Seguimiento de Tareas / War Room Táctico - Archivo principal ---

use seguimiento_tareas::{run_server, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::desde_entorno();
    tracing::info!("=== Seguimiento de Tareas (API) === http://{}", config.bind);
    run_server(config).await
}
