//! Validación de columnas requeridas y normalización de filas a `Tarea`.
//!
//! Las columnas se revisan una por una, en el orden de `Columnas::requeridas`,
//! y se informa la primera que falte. La columna de cliente es opcional.

use strsim::jaro_winkler;

use crate::error::{Result, TareasError};
use crate::fuente::io::Tabla;
use crate::models::{Columnas, Dataset, Tarea};

/// Umbral de similitud para sugerir un encabezado parecido.
const UMBRAL_SUGERENCIA: f64 = 0.85;

/// Posición de cada columna dentro de la tabla cruda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indices {
    pub mes: usize,
    pub macrocanal: usize,
    pub subcanal: usize,
    pub categoria: usize,
    pub pregunta: usize,
    pub geo: usize,
    pub venta: usize,
    pub final_: usize,
    pub vendedor: usize,
    pub cliente: Option<usize>,
}

fn posicion(encabezados: &[String], columna: &str) -> Option<usize> {
    encabezados.iter().position(|h| h.trim() == columna)
}

fn sugerir(encabezados: &[String], columna: &str) -> Option<String> {
    encabezados
        .iter()
        .map(|h| (jaro_winkler(h.trim(), columna), h))
        .filter(|(score, _)| *score >= UMBRAL_SUGERENCIA)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, h)| h.trim().to_string())
}

fn requerir(encabezados: &[String], columna: &str) -> Result<usize> {
    posicion(encabezados, columna).ok_or_else(|| TareasError::ColumnaFaltante {
        columna: columna.to_string(),
        sugerencia: sugerir(encabezados, columna),
    })
}

/// Verifica las columnas requeridas y devuelve sus posiciones.
pub fn validar_columnas(encabezados: &[String], columnas: &Columnas) -> Result<Indices> {
    // Se resuelven en el mismo orden que `Columnas::requeridas`
    let mes = requerir(encabezados, &columnas.mes)?;
    let macrocanal = requerir(encabezados, &columnas.macrocanal)?;
    let subcanal = requerir(encabezados, &columnas.subcanal)?;
    let categoria = requerir(encabezados, &columnas.categoria)?;
    let pregunta = requerir(encabezados, &columnas.pregunta)?;
    let geo = requerir(encabezados, &columnas.geo)?;
    let venta = requerir(encabezados, &columnas.venta)?;
    let final_ = requerir(encabezados, &columnas.final_)?;
    let vendedor = requerir(encabezados, &columnas.vendedor)?;
    let cliente = posicion(encabezados, &columnas.cliente);

    Ok(Indices {
        mes,
        macrocanal,
        subcanal,
        categoria,
        pregunta,
        geo,
        venta,
        final_,
        vendedor,
        cliente,
    })
}

/// Interpreta una celda de bandera (0/1 o conteo). Vacío cuenta como 0.
/// Acepta coma decimal y booleanos. Devuelve `None` si no es un número
/// finito no negativo.
pub fn parsear_bandera(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    match s.to_lowercase().as_str() {
        "true" | "verdadero" => return Some(1.0),
        "false" | "falso" => return Some(0.0),
        _ => {}
    }
    let v = s.replace(',', ".").parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 { Some(v) } else { None }
}

fn celda(fila: &[String], idx: usize) -> &str {
    fila.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Convierte la tabla cruda en un `Dataset` validado.
pub fn normalizar(tabla: Tabla, columnas: &Columnas, archivo: &str) -> Result<Dataset> {
    let idx = validar_columnas(&tabla.encabezados, columnas)?;

    let bandera = |fila: &[String], i: usize, nombre: &str, n_fila: usize| -> Result<f64> {
        let raw = celda(fila, i);
        parsear_bandera(raw).ok_or_else(|| {
            TareasError::lectura(
                archivo,
                format!("valor no numérico '{}' en columna '{}' (fila {})", raw, nombre, n_fila),
            )
        })
    };

    let mut tareas = Vec::with_capacity(tabla.filas.len());
    for (i, fila) in tabla.filas.iter().enumerate() {
        if fila.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        // fila 1 = encabezados
        let n_fila = i + 2;
        let cliente = idx
            .cliente
            .map(|c| celda(fila, c).to_string())
            .filter(|c| !c.is_empty());

        tareas.push(Tarea {
            mes: celda(fila, idx.mes).to_string(),
            macrocanal: celda(fila, idx.macrocanal).to_string(),
            subcanal: celda(fila, idx.subcanal).to_string(),
            vendedor: celda(fila, idx.vendedor).to_string(),
            categoria: celda(fila, idx.categoria).to_string(),
            cliente,
            pregunta: celda(fila, idx.pregunta).to_string(),
            validada_geo: bandera(fila, idx.geo, &columnas.geo, n_fila)?,
            validada_venta: bandera(fila, idx.venta, &columnas.venta, n_fila)?,
            validada_final: bandera(fila, idx.final_, &columnas.final_, n_fila)?,
        });
    }

    Ok(Dataset::nuevo(tareas, archivo, idx.cliente.is_some()))
}
