//! Simuladores de ventas ("One Year Plan" y "War Room").
//!
//! Son fórmulas cerradas: escalan visitas y tasa de conversión y proyectan
//! las ventas resultantes. Sin estado; mismas entradas => mismas salidas.

use serde::{Deserialize, Serialize};

use crate::analisis::filtros::VistaFiltrada;
use crate::analisis::kpis::resumir;
use crate::analisis::porcentaje;

/// Meta por defecto: 110% de las ventas actuales.
pub const FACTOR_META_POR_DEFECTO: f64 = 1.10;

/// `v` incrementado en `pct` por ciento.
fn crecer(v: f64, pct: f64) -> f64 {
    v + v * pct / 100.0
}

/// Ventas esperadas para `visitas` a una tasa `pct`.
fn ventas_a_tasa(visitas: f64, pct: f64) -> f64 {
    visitas * pct / 100.0
}

pub fn meta_por_defecto(ventas: f64) -> f64 {
    ventas * FACTOR_META_POR_DEFECTO
}

// ---------------------------------------------------------------------------
// Escenario simple por subcanal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntradaEscenario {
    /// Visitas actuales del segmento perturbado.
    pub visitas_base: f64,
    /// Ventas actuales del segmento perturbado.
    pub ventas_base_segmento: f64,
    /// Conversión actual del segmento (valor inicial del slider).
    pub conversion_base_pct: f64,
    /// Ventas actuales de toda la vista.
    pub ventas_globales: f64,
    pub delta_visitas_pct: f64,
    pub nueva_conversion_pct: f64,
}

impl EntradaEscenario {
    /// Toma la línea base del subcanal `subcanal` y la global de la misma vista.
    /// Sin `nueva_conversion_pct` se usa la conversión actual del subcanal.
    pub fn desde_segmento(
        vista: &VistaFiltrada<'_>,
        subcanal: &str,
        delta_visitas_pct: f64,
        nueva_conversion_pct: Option<f64>,
    ) -> EntradaEscenario {
        let segmento = resumir(&vista.donde(|t| t.subcanal == subcanal));
        let global = resumir(vista);
        EntradaEscenario {
            visitas_base: segmento.visitas,
            ventas_base_segmento: segmento.ventas,
            conversion_base_pct: segmento.tasa_conversion,
            ventas_globales: global.ventas,
            delta_visitas_pct,
            nueva_conversion_pct: nueva_conversion_pct.unwrap_or(segmento.tasa_conversion),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Escenario {
    pub nuevas_visitas: f64,
    pub nuevas_ventas: f64,
    /// Venta extra aportada por el segmento (puede ser negativa).
    pub delta_ventas: f64,
    pub ventas_actuales: f64,
    pub total_proyectado: f64,
    /// Variación global en %, 0 si no hay ventas actuales.
    pub lift_pct: f64,
}

/// El cambio del segmento se suma a la línea base global: se asume que los
/// segmentos son independientes y no se solapan.
pub fn simular(e: &EntradaEscenario) -> Escenario {
    let nuevas_visitas = crecer(e.visitas_base, e.delta_visitas_pct);
    let nuevas_ventas = ventas_a_tasa(nuevas_visitas, e.nueva_conversion_pct);
    let delta_ventas = nuevas_ventas - e.ventas_base_segmento;
    let total_proyectado = e.ventas_globales + delta_ventas;
    Escenario {
        nuevas_visitas,
        nuevas_ventas,
        delta_ventas,
        ventas_actuales: e.ventas_globales,
        total_proyectado,
        lift_pct: porcentaje(total_proyectado - e.ventas_globales, e.ventas_globales),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Medida {
    Relativa,
    Total,
}

/// Un escalón del gráfico de cascada.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TramoPuente {
    pub etiqueta: String,
    pub valor: f64,
    pub medida: Medida,
}

/// Puente de ventas: actuales -> impacto del segmento -> proyectadas.
pub fn puente_ventas(escenario: &Escenario, segmento: &str) -> Vec<TramoPuente> {
    vec![
        TramoPuente {
            etiqueta: "Ventas Actuales".to_string(),
            valor: escenario.ventas_actuales,
            medida: Medida::Relativa,
        },
        TramoPuente {
            etiqueta: format!("Impacto {}", segmento),
            valor: escenario.delta_ventas,
            medida: Medida::Relativa,
        },
        TramoPuente {
            etiqueta: "Ventas Proyectadas".to_string(),
            valor: escenario.total_proyectado,
            medida: Medida::Total,
        },
    ]
}

// ---------------------------------------------------------------------------
// Plan de recuperación (dos palancas)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntradaPlan {
    pub ventas_base: f64,
    pub visitas_base: f64,
    pub conversion_base_pct: f64,
    pub meta_ventas: f64,
    pub aumento_visitas_pct: f64,
    pub conversion_objetivo_pct: f64,
}

impl EntradaPlan {
    /// Línea base desde los KPIs de la vista; meta por defecto = 110% de las ventas.
    pub fn desde_vista(
        vista: &VistaFiltrada<'_>,
        meta_ventas: Option<f64>,
        aumento_visitas_pct: f64,
        conversion_objetivo_pct: f64,
    ) -> EntradaPlan {
        let k = resumir(vista);
        EntradaPlan {
            ventas_base: k.ventas,
            visitas_base: k.visitas,
            conversion_base_pct: k.tasa_conversion,
            meta_ventas: meta_ventas.unwrap_or_else(|| meta_por_defecto(k.ventas)),
            aumento_visitas_pct,
            conversion_objetivo_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlanRecuperacion {
    /// meta - ventas actuales
    pub brecha: f64,
    pub nuevas_visitas: f64,
    /// Efecto de crecer visitas manteniendo la conversión actual.
    pub aporte_volumen: f64,
    /// Efecto de subir la conversión, medido sobre las visitas ya crecidas.
    pub aporte_efectividad: f64,
    pub ventas_proyectadas: f64,
    /// ventas proyectadas / meta * 100; 0 si la meta no es positiva.
    pub pct_meta: f64,
}

/// Descompone la ganancia en volumen (primero) y efectividad (sobre la base
/// nueva de visitas). Con ese orden se cumple exactamente
/// `ventas_base + aporte_volumen + aporte_efectividad == ventas_proyectadas`.
pub fn planificar(e: &EntradaPlan) -> PlanRecuperacion {
    let nuevas_visitas = crecer(e.visitas_base, e.aumento_visitas_pct);
    let ventas_solo_volumen = ventas_a_tasa(nuevas_visitas, e.conversion_base_pct);
    let ventas_proyectadas = ventas_a_tasa(nuevas_visitas, e.conversion_objetivo_pct);

    PlanRecuperacion {
        brecha: e.meta_ventas - e.ventas_base,
        nuevas_visitas,
        aporte_volumen: ventas_solo_volumen - e.ventas_base,
        aporte_efectividad: ventas_proyectadas - ventas_solo_volumen,
        ventas_proyectadas,
        pct_meta: porcentaje(ventas_proyectadas, e.meta_ventas),
    }
}
