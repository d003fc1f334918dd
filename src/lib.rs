// Biblioteca raíz del crate `seguimiento-tareas`.
// Carga el archivo de tareas, calcula KPIs, desgloses y simulaciones, y los
// expone por una API JSON (`server`).
pub mod config;
pub mod error;
pub mod models;
pub mod fuente;
pub mod analisis;
pub mod auth;
pub mod api_json;
pub mod server;

pub use config::Config;
pub use error::{Result, TareasError};
/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
