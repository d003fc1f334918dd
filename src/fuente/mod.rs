//! Módulo `fuente`: localización y lectura del archivo de tareas.
//!
//! Submódulos:
//! - `io`: parseo de CSV / Excel / ZIP a una `Tabla` cruda
//! - `esquema`: validación de columnas y conversión a `Tarea`
//! - `cache`: memoización del dataset por directorio durante la vida del proceso

/// Helpers de IO para CSV, Excel y ZIP
pub mod io;

/// Validación de columnas requeridas y normalización de filas
pub mod esquema;

/// Caché en memoria del dataset cargado
pub mod cache;

pub use cache::{cache_stats, dataset_cached};
pub use io::Tabla;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TareasError};
use crate::models::{Columnas, Dataset};

/// Texto que debe aparecer en el nombre del archivo fuente.
pub const MARCA_ARCHIVO: &str = "Tareas";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoArchivo {
    Zip,
    Csv,
    Xlsx,
}

impl TipoArchivo {
    pub fn desde_nombre(nombre: &str) -> Option<TipoArchivo> {
        if nombre.ends_with(".zip") {
            Some(TipoArchivo::Zip)
        } else if nombre.ends_with(".csv") {
            Some(TipoArchivo::Csv)
        } else if nombre.ends_with(".xlsx") {
            Some(TipoArchivo::Xlsx)
        } else {
            None
        }
    }
}

fn nombres_en_orden(dir: &Path) -> Vec<(String, PathBuf)> {
    let read = match fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(?dir, error = %e, "no se pudo listar el directorio de datos");
            return Vec::new();
        }
    };

    let mut out = Vec::new();
    for entry in read.flatten() {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        if let Some(name) = p.file_name().and_then(|s| s.to_str()).map(|s| s.to_string()) {
            out.push((name, p));
        }
    }
    out
}

/// Busca el archivo de tareas en `dir`.
///
/// Regla de selección (determinista, dependiente del orden del listado):
/// 1. el primer archivo cuyo nombre contenga `Tareas` y termine en `.zip`;
/// 2. si no hay ZIP, el primero que contenga `Tareas` y termine en `.csv` o `.xlsx`.
///
/// El desempate es el orden en que el sistema operativo lista el directorio.
pub fn buscar_archivo_tareas(dir: &Path) -> Option<PathBuf> {
    let nombres = nombres_en_orden(dir);
    seleccionar_candidato(&nombres).map(|i| nombres[i].1.clone())
}

/// Aplica la regla de selección sobre nombres ya listados; devuelve el índice elegido.
pub fn seleccionar_candidato(nombres: &[(String, PathBuf)]) -> Option<usize> {
    let con_marca = |n: &str| n.contains(MARCA_ARCHIVO);

    // Primero ZIP (prioridad)
    if let Some(i) = nombres
        .iter()
        .position(|(n, _)| con_marca(n) && TipoArchivo::desde_nombre(n) == Some(TipoArchivo::Zip))
    {
        return Some(i);
    }

    // Luego CSV o Excel, en una sola pasada
    nombres.iter().position(|(n, _)| {
        con_marca(n)
            && matches!(
                TipoArchivo::desde_nombre(n),
                Some(TipoArchivo::Csv) | Some(TipoArchivo::Xlsx)
            )
    })
}

/// Parsea el archivo indicado según su extensión.
pub fn leer_tabla(path: &Path) -> Result<Tabla> {
    let nombre = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    match TipoArchivo::desde_nombre(&nombre) {
        Some(TipoArchivo::Zip) => {
            let f = fs::File::open(path).map_err(|e| TareasError::lectura(&nombre, e))?;
            io::leer_zip(std::io::BufReader::new(f), &nombre)
        }
        Some(TipoArchivo::Csv) => {
            let f = fs::File::open(path).map_err(|e| TareasError::lectura(&nombre, e))?;
            io::leer_csv(f).map_err(|e| TareasError::lectura(&nombre, e))
        }
        Some(TipoArchivo::Xlsx) => io::leer_xlsx(path).map_err(|e| TareasError::lectura(&nombre, e)),
        None => Err(TareasError::lectura(&nombre, "formato no soportado")),
    }
}

/// Localiza, lee y valida el archivo de tareas de `dir`.
pub fn cargar_dataset(dir: &Path, columnas: &Columnas) -> Result<Dataset> {
    let path = buscar_archivo_tareas(dir).ok_or_else(|| TareasError::FuenteNoEncontrada {
        dir: dir.to_path_buf(),
    })?;
    let nombre = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    tracing::info!(archivo = %nombre, "cargando archivo de tareas");
    let tabla = leer_tabla(&path)?;
    let dataset = esquema::normalizar(tabla, columnas, &nombre)?;
    tracing::info!(archivo = %nombre, filas = dataset.len(), "archivo de tareas cargado");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nombres(ns: &[&str]) -> Vec<(String, PathBuf)> {
        ns.iter().map(|n| (n.to_string(), PathBuf::from(n))).collect()
    }

    #[test]
    fn zip_tiene_prioridad_aunque_aparezca_despues() {
        let ns = nombres(&["Tareas_2025.csv", "otro.zip", "Tareas_2025.zip"]);
        assert_eq!(seleccionar_candidato(&ns), Some(2));
    }

    #[test]
    fn csv_y_xlsx_comparten_prioridad() {
        let ns = nombres(&["Tareas.xlsx", "Tareas.csv"]);
        assert_eq!(seleccionar_candidato(&ns), Some(0));
        let ns = nombres(&["Tareas.csv", "Tareas.xlsx"]);
        assert_eq!(seleccionar_candidato(&ns), Some(0));
    }

    #[test]
    fn marca_distingue_mayusculas() {
        let ns = nombres(&["tareas.csv", "TAREAS.xlsx", "Reporte.csv"]);
        assert_eq!(seleccionar_candidato(&ns), None);
    }

    #[test]
    fn extension_no_soportada_se_ignora() {
        let ns = nombres(&["Tareas.xls", "Tareas.txt", "Tareas.csv.bak"]);
        assert_eq!(seleccionar_candidato(&ns), None);
    }
}
