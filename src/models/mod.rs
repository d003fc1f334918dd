// Estructuras de datos principales

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mes calendario. El orden de las variantes es el orden canónico usado
/// para mostrar meses (nunca el orden de aparición ni el alfabético).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mes {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl Mes {
    pub const TODOS: [Mes; 12] = [
        Mes::Enero,
        Mes::Febrero,
        Mes::Marzo,
        Mes::Abril,
        Mes::Mayo,
        Mes::Junio,
        Mes::Julio,
        Mes::Agosto,
        Mes::Septiembre,
        Mes::Octubre,
        Mes::Noviembre,
        Mes::Diciembre,
    ];

    pub fn nombre(&self) -> &'static str {
        match self {
            Mes::Enero => "Enero",
            Mes::Febrero => "Febrero",
            Mes::Marzo => "Marzo",
            Mes::Abril => "Abril",
            Mes::Mayo => "Mayo",
            Mes::Junio => "Junio",
            Mes::Julio => "Julio",
            Mes::Agosto => "Agosto",
            Mes::Septiembre => "Septiembre",
            Mes::Octubre => "Octubre",
            Mes::Noviembre => "Noviembre",
            Mes::Diciembre => "Diciembre",
        }
    }

    /// Coincidencia exacta con el nombre canónico (se ignoran espacios externos).
    pub fn desde_nombre(s: &str) -> Option<Mes> {
        let s = s.trim();
        Mes::TODOS.iter().copied().find(|m| m.nombre() == s)
    }
}

/// Nombres de columna del archivo fuente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columnas {
    pub mes: String,
    pub macrocanal: String,
    pub subcanal: String,
    pub categoria: String,
    pub pregunta: String,
    pub geo: String,
    pub venta: String,
    pub final_: String,
    pub vendedor: String,
    /// Identificador de cliente/local. Opcional: sólo alimenta `clientes_unicos`.
    pub cliente: String,
}

impl Default for Columnas {
    fn default() -> Self {
        Columnas {
            mes: "Mes_Nombre".to_string(),
            macrocanal: "Macrocanal".to_string(),
            subcanal: "Subcanal".to_string(),
            categoria: "Categoria".to_string(),
            pregunta: "Pregunta".to_string(),
            geo: "VALIDADA GEO".to_string(),
            venta: "VALIDADA VENTA".to_string(),
            final_: "VALIDADA FINAL".to_string(),
            vendedor: "Piramide Ventas.Vendedor".to_string(),
            cliente: "Cliente".to_string(),
        }
    }
}

impl Columnas {
    /// Columnas obligatorias en el orden en que se validan.
    pub fn requeridas(&self) -> [&str; 9] {
        [
            &self.mes,
            &self.macrocanal,
            &self.subcanal,
            &self.categoria,
            &self.pregunta,
            &self.geo,
            &self.venta,
            &self.final_,
            &self.vendedor,
        ]
    }
}

/// Una tarea asignada en terreno (una fila del archivo fuente).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tarea {
    pub mes: String,
    pub macrocanal: String,
    pub subcanal: String,
    pub vendedor: String,
    pub categoria: String,
    pub cliente: Option<String>,
    pub pregunta: String,
    /// Visita validada geográficamente.
    pub validada_geo: f64,
    /// Venta validada. No se exige que sea subconjunto de `validada_geo`.
    pub validada_venta: f64,
    /// Tarea cumplida.
    pub validada_final: f64,
}

impl Tarea {
    pub fn mes_canonico(&self) -> Option<Mes> {
        Mes::desde_nombre(&self.mes)
    }
}

/// Tabla completa cargada una vez por proceso. No se modifica tras la carga.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub tareas: Vec<Tarea>,
    /// Nombre del archivo del que se leyó (para mostrarlo al usuario).
    pub archivo: String,
    pub cargado_en: DateTime<Utc>,
    /// `true` si el archivo traía la columna de cliente.
    pub tiene_cliente: bool,
}

impl Dataset {
    pub fn nuevo(tareas: Vec<Tarea>, archivo: impl Into<String>, tiene_cliente: bool) -> Dataset {
        Dataset {
            tareas,
            archivo: archivo.into(),
            cargado_en: Utc::now(),
            tiene_cliente,
        }
    }

    pub fn len(&self) -> usize {
        self.tareas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tareas.is_empty()
    }
}
