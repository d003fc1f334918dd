//! Cálculos del tablero: filtros, KPIs, desgloses y simuladores.
//!
//! Todo es puro y síncrono: cada interacción vuelve a ejecutar el pipeline
//! completo sobre el dataset en memoria (`tablero::construir_tablero`).

pub mod filtros;
pub mod kpis;
pub mod desglose;
pub mod simulador;
pub mod tablero;

pub use filtros::{categorias_de, filtrar, opciones_filtro, subcanales_de, OpcionesFiltro, VistaFiltrada};
pub use kpis::{resumir, Kpis};
pub use simulador::{planificar, simular, EntradaEscenario, EntradaPlan, Escenario, PlanRecuperacion};

/// `num / den * 100`, o 0 cuando el denominador es cero o negativo.
pub fn porcentaje(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den * 100.0 } else { 0.0 }
}
