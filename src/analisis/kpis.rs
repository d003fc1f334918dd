use serde::Serialize;

use crate::analisis::filtros::VistaFiltrada;
use crate::analisis::porcentaje;

/// Métricas principales del encabezado del tablero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Kpis {
    /// Σ VALIDADA GEO (esfuerzo)
    pub visitas: f64,
    /// Σ VALIDADA VENTA (éxito)
    pub ventas: f64,
    /// ventas / visitas * 100, 0 si no hay visitas
    pub tasa_conversion: f64,
    /// Σ VALIDADA FINAL
    pub cumplidas: f64,
}

pub fn resumir(vista: &VistaFiltrada<'_>) -> Kpis {
    let (visitas, ventas, cumplidas) = vista.iter().fold((0.0, 0.0, 0.0), |acc, t| {
        (
            acc.0 + t.validada_geo,
            acc.1 + t.validada_venta,
            acc.2 + t.validada_final,
        )
    });
    Kpis {
        visitas,
        ventas,
        tasa_conversion: porcentaje(ventas, visitas),
        cumplidas,
    }
}
