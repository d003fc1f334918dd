//! Controlador del tablero: una ejecución completa del pipeline
//! (filtros -> KPIs -> desgloses) por cada interacción del usuario.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::analisis::desglose::{
    self, ConteoCuadrante, FilaCanal, FilaCategoria, FilaEfectividad, FilaItem, FilaVendedor, MapaCalor,
};
use crate::analisis::filtros::{categorias_de, filtrar, opciones_filtro, subcanales_de, OpcionesFiltro, VistaFiltrada};
use crate::analisis::kpis::{resumir, Kpis};
use crate::analisis::simulador::meta_por_defecto;
use crate::auth::Sesion;
use crate::error::Result;
use crate::models::{Dataset, Mes};

/// Los dos tableros comparten cálculos y difieren en la presentación.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variante {
    #[default]
    Seguimiento,
    WarRoom,
}

impl Variante {
    pub fn titulo(&self) -> &'static str {
        match self {
            Variante::Seguimiento => "SEGUIMIENTO DE TAREAS & ONE YEAR PLAN",
            Variante::WarRoom => "War Room Táctico",
        }
    }
}

/// Estado de los selectores. `None` = valor por defecto del selector
/// (todos los meses / todos los canales / primera categoría de la vista).
/// `Some(vec![])` es una selección vacía explícita.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Seleccion {
    #[serde(default)]
    pub meses: Option<Vec<Mes>>,
    #[serde(default)]
    pub canales: Option<Vec<String>>,
    #[serde(default)]
    pub categoria: Option<String>,
}

impl Seleccion {
    pub fn todo() -> Seleccion {
        Seleccion::default()
    }

    fn resolver(&self, opciones: &OpcionesFiltro) -> (HashSet<Mes>, HashSet<String>) {
        let meses = match &self.meses {
            Some(m) => m.iter().copied().collect(),
            None => opciones.meses.iter().copied().collect(),
        };
        let canales = match &self.canales {
            Some(c) => c.iter().cloned().collect(),
            None => opciones.canales.iter().cloned().collect(),
        };
        (meses, canales)
    }

    /// Aplica meses y canales sobre el dataset.
    pub fn aplicar<'a>(&self, dataset: &'a Dataset) -> VistaFiltrada<'a> {
        let (meses, canales) = self.resolver(&opciones_filtro(dataset));
        filtrar(dataset, &meses, &canales)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Tablero {
    pub variante: Variante,
    pub titulo: &'static str,
    pub archivo: String,
    pub filas_filtradas: usize,
    pub kpis: Kpis,
    pub por_macrocanal: Vec<FilaCanal>,
    pub top_subcanales: Vec<FilaCanal>,
    pub vendedores: Vec<FilaVendedor>,
    pub cuadrantes: Vec<ConteoCuadrante>,
    pub por_categoria: Vec<FilaCategoria>,
    pub top_items: Vec<FilaItem>,
    /// Categoría usada para `efectividad_items`; `None` si la vista no tiene categorías.
    pub categoria: Option<String>,
    pub efectividad_items: Vec<FilaEfectividad>,
    pub mapa_calor: MapaCalor,
    /// Opciones del selector de subcanal del simulador.
    pub subcanales: Vec<String>,
    /// Valor inicial del campo "meta" del plan de recuperación.
    pub meta_por_defecto: f64,
}

/// Pipeline completo para una interacción. Con la sesión sin autenticar no
/// se calcula nada.
pub fn construir_tablero(sesion: &Sesion, dataset: &Dataset, seleccion: &Seleccion, variante: Variante) -> Result<Tablero> {
    sesion.exigir()?;

    let opciones = opciones_filtro(dataset);
    let (meses, canales) = seleccion.resolver(&opciones);
    let vista = filtrar(dataset, &meses, &canales);
    let kpis = resumir(&vista);

    let vendedores = desglose::por_vendedor(&vista);
    let cuadrantes = desglose::distribucion_cuadrantes(&vendedores);

    let categoria = seleccion
        .categoria
        .clone()
        .or_else(|| categorias_de(&vista).into_iter().next());
    let efectividad_items = match &categoria {
        Some(c) => desglose::efectividad_items(&vista, c, desglose::TOP_ITEMS),
        None => Vec::new(),
    };

    tracing::debug!(
        filas = vista.len(),
        meses = meses.len(),
        canales = canales.len(),
        "tablero calculado"
    );

    Ok(Tablero {
        variante,
        titulo: variante.titulo(),
        archivo: dataset.archivo.clone(),
        filas_filtradas: vista.len(),
        kpis,
        por_macrocanal: desglose::por_macrocanal(&vista),
        top_subcanales: desglose::top_subcanales(&vista, desglose::TOP_SUBCANALES),
        vendedores,
        cuadrantes,
        por_categoria: desglose::por_categoria(&vista, dataset.tiene_cliente),
        top_items: desglose::top_items_vendidos(&vista, desglose::TOP_ITEMS),
        categoria,
        efectividad_items,
        mapa_calor: desglose::mapa_calor(&vista, desglose::TOP_MAPA_CALOR),
        subcanales: subcanales_de(&vista),
        meta_por_defecto: meta_por_defecto(kpis.ventas),
    })
}
