use calamine::{open_workbook_auto, Data, Range, Reader, Xlsx};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::{Result, TareasError};

/// Tabla cruda tal como viene del archivo: encabezados + filas de texto.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tabla {
    pub encabezados: Vec<String>,
    pub filas: Vec<Vec<String>>,
}

impl Tabla {
    /// Primera fila = encabezados; el resto son datos.
    pub fn desde_filas(mut rows: Vec<Vec<String>>) -> Tabla {
        if rows.is_empty() {
            return Tabla::default();
        }
        let encabezados = rows.remove(0).into_iter().map(|h| h.trim().to_string()).collect();
        Tabla { encabezados, filas: rows }
    }
}

/// Convierte un `Data` de calamine a String (versión genérica para celdas)
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Lee un CSV delimitado por comas con fila de encabezados.
pub fn leer_csv<R: Read>(reader: R) -> std::result::Result<Tabla, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let encabezados: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            // BOM de UTF-8 en el primer encabezado (exportaciones de Excel)
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();

    let mut filas = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        filas.push(rec.iter().map(|s| s.to_string()).collect());
    }

    Ok(Tabla { encabezados, filas })
}

fn rango_a_filas(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect::<Vec<String>>())
        .collect()
}

/// Lee la primera hoja de un .xlsx en disco.
pub fn leer_xlsx<P: AsRef<Path>>(path: P) -> std::result::Result<Tabla, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let primera = match workbook.sheet_names().first() {
        Some(n) => n.clone(),
        None => return Err("el libro no contiene hojas".to_string()),
    };
    let range = workbook.worksheet_range(&primera).map_err(|e| e.to_string())?;
    Ok(Tabla::desde_filas(rango_a_filas(&range)))
}

/// Lee la primera hoja de un .xlsx ya cargado en memoria (entrada de un ZIP).
pub fn leer_xlsx_bytes(bytes: Vec<u8>) -> std::result::Result<Tabla, String> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let primera = match workbook.sheet_names().first() {
        Some(n) => n.clone(),
        None => return Err("el libro no contiene hojas".to_string()),
    };
    let range = workbook.worksheet_range(&primera).map_err(|e| e.to_string())?;
    Ok(Tabla::desde_filas(rango_a_filas(&range)))
}

/// Abre un ZIP y parsea la primera entrada (en orden del archivo) que sea .csv o .xlsx.
pub fn leer_zip<R: Read + Seek>(reader: R, archivo: &str) -> Result<Tabla> {
    let mut archive = zip::ZipArchive::new(reader).map_err(|e| TareasError::lectura(archivo, e))?;

    for i in 0..archive.len() {
        let mut entrada = archive.by_index(i).map_err(|e| TareasError::lectura(archivo, e))?;
        let nombre = entrada.name().to_string();

        if nombre.ends_with(".csv") {
            tracing::debug!(archivo, entrada = %nombre, "leyendo CSV dentro del ZIP");
            let mut buf = Vec::new();
            entrada.read_to_end(&mut buf)?;
            return leer_csv(&buf[..]).map_err(|e| TareasError::lectura(format!("{}/{}", archivo, nombre), e));
        } else if nombre.ends_with(".xlsx") {
            tracing::debug!(archivo, entrada = %nombre, "leyendo Excel dentro del ZIP");
            let mut buf = Vec::new();
            entrada.read_to_end(&mut buf)?;
            return leer_xlsx_bytes(buf).map_err(|e| TareasError::lectura(format!("{}/{}", archivo, nombre), e));
        }
    }

    Err(TareasError::lectura(archivo, "el ZIP no contiene ningún archivo .csv o .xlsx"))
}
