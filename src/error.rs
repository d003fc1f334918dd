//! Errores del tablero de tareas.
//!
//! Cada variante corresponde a una condición que detiene el render actual:
//! falta el archivo fuente, el archivo no se pudo leer, falta una columna
//! requerida, la sesión no está autenticada o un parámetro de entrada está
//! fuera de rango. Los denominadores en cero NO son errores (ver
//! `analisis::porcentaje`).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TareasError {
    #[error("no se encontró archivo de datos (Excel, CSV o ZIP con 'Tareas' en el nombre) en {dir:?}")]
    FuenteNoEncontrada { dir: PathBuf },

    #[error("error leyendo el archivo '{archivo}': {causa}")]
    Lectura { archivo: String, causa: String },

    #[error("falta columna '{columna}'{}", sufijo_sugerencia(.sugerencia))]
    ColumnaFaltante {
        columna: String,
        sugerencia: Option<String>,
    },

    #[error("contraseña incorrecta")]
    AccesoDenegado,

    #[error("parámetro inválido: {0}")]
    ParametroInvalido(String),

    #[error("error de IO: {0}")]
    Io(#[from] std::io::Error),
}

fn sufijo_sugerencia(sugerencia: &Option<String>) -> String {
    match sugerencia {
        Some(s) => format!(" (¿quisiste decir '{}'?)", s),
        None => String::new(),
    }
}

impl TareasError {
    pub fn lectura(archivo: impl Into<String>, causa: impl std::fmt::Display) -> Self {
        TareasError::Lectura {
            archivo: archivo.into(),
            causa: causa.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TareasError>;
