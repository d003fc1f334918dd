//! Motor de filtros: mes × macrocanal sobre el dataset completo.
//!
//! Los filtros producen una vista prestada (no copian filas) y se pueden
//! aplicar cuantas veces se quiera sobre el mismo `Dataset`.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Dataset, Mes, Tarea};

/// Subconjunto de filas del dataset seleccionado por los filtros actuales.
#[derive(Debug, Clone, Default)]
pub struct VistaFiltrada<'a> {
    pub filas: Vec<&'a Tarea>,
}

impl<'a> VistaFiltrada<'a> {
    /// Vista con todas las tareas dadas (sin filtrar).
    pub fn completa(tareas: &'a [Tarea]) -> VistaFiltrada<'a> {
        VistaFiltrada { filas: tareas.iter().collect() }
    }

    pub fn len(&self) -> usize {
        self.filas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Tarea> + '_ {
        self.filas.iter().copied()
    }

    /// Sub-vista con las filas que cumplen `pred`.
    pub fn donde<F>(&self, pred: F) -> VistaFiltrada<'a>
    where
        F: Fn(&Tarea) -> bool,
    {
        VistaFiltrada {
            filas: self.filas.iter().copied().filter(|t| pred(*t)).collect(),
        }
    }
}

/// Aplica los filtros de mes y macrocanal. Una fila entra si su mes está en
/// `meses` Y su macrocanal está en `canales`. Conjuntos vacíos => vista vacía.
pub fn filtrar<'a>(dataset: &'a Dataset, meses: &HashSet<Mes>, canales: &HashSet<String>) -> VistaFiltrada<'a> {
    if meses.is_empty() || canales.is_empty() {
        return VistaFiltrada::default();
    }
    let filas = dataset
        .tareas
        .iter()
        .filter(|t| t.mes_canonico().is_some_and(|m| meses.contains(&m)) && canales.contains(&t.macrocanal))
        .collect();
    VistaFiltrada { filas }
}

/// Valores disponibles para los selectores de la barra lateral.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpcionesFiltro {
    /// Meses presentes, en orden calendario.
    pub meses: Vec<Mes>,
    /// Macrocanales en orden de primera aparición.
    pub canales: Vec<String>,
    /// Categorías no vacías, ordenadas.
    pub categorias: Vec<String>,
}

fn distintos_en_orden<'a, I>(valores: I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut vistos: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for v in valores {
        if vistos.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

pub fn opciones_filtro(dataset: &Dataset) -> OpcionesFiltro {
    let presentes: HashSet<Mes> = dataset.tareas.iter().filter_map(|t| t.mes_canonico()).collect();
    let meses = Mes::TODOS.iter().copied().filter(|m| presentes.contains(m)).collect();

    let canales = distintos_en_orden(dataset.tareas.iter().map(|t| t.macrocanal.as_str()));

    let mut categorias = distintos_en_orden(
        dataset
            .tareas
            .iter()
            .map(|t| t.categoria.as_str())
            .filter(|c| !c.is_empty()),
    );
    categorias.sort();

    OpcionesFiltro { meses, canales, categorias }
}

/// Subcanales de una vista en orden de primera aparición (selector del simulador).
pub fn subcanales_de(vista: &VistaFiltrada<'_>) -> Vec<String> {
    distintos_en_orden(vista.iter().map(|t| t.subcanal.as_str()))
}

/// Categorías no vacías presentes en la vista, ordenadas (selector de efectividad).
pub fn categorias_de(vista: &VistaFiltrada<'_>) -> Vec<String> {
    let mut categorias = distintos_en_orden(vista.iter().map(|t| t.categoria.as_str()).filter(|c| !c.is_empty()));
    categorias.sort();
    categorias
}
