//! Configuración del servidor leída desde variables de entorno (y `.env` si existe).
//!
//! Variables reconocidas:
//! - `TAREAS_DATA_DIR`: directorio donde se busca el archivo de tareas (por defecto `.`)
//! - `TAREAS_BIND`: dirección de escucha (por defecto `127.0.0.1:8080`)
//! - `TAREAS_CLAVE`: clave compartida de acceso
//! - `TAREAS_COLUMNA_VENDEDOR` / `TAREAS_COLUMNA_CLIENTE`: nombres de columna alternativos

use std::path::PathBuf;

use crate::models::Columnas;

pub const CLAVE_POR_DEFECTO: &str = "clave_2026";
pub const BIND_POR_DEFECTO: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind: String,
    pub clave: String,
    pub columnas: Columnas,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            bind: BIND_POR_DEFECTO.to_string(),
            clave: CLAVE_POR_DEFECTO.to_string(),
            columnas: Columnas::default(),
        }
    }
}

// carga .env si existe (no es error que falte)
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

impl Config {
    /// Lee la configuración del proceso (entorno + `.env`).
    pub fn desde_entorno() -> Config {
        load_dotenv();
        let cfg = Config::desde_fuente(|k| std::env::var(k).ok());
        if cfg.clave == CLAVE_POR_DEFECTO {
            tracing::warn!("TAREAS_CLAVE no definida: usando la clave por defecto");
        }
        cfg
    }

    /// Construye la configuración a partir de una función de búsqueda arbitraria.
    /// Valores vacíos se tratan como ausentes.
    pub fn desde_fuente<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defecto = Config::default();

        let mut columnas = defecto.columnas.clone();
        if let Some(v) = get("TAREAS_COLUMNA_VENDEDOR") {
            columnas.vendedor = v;
        }
        if let Some(v) = get("TAREAS_COLUMNA_CLIENTE") {
            columnas.cliente = v;
        }

        Config {
            data_dir: get("TAREAS_DATA_DIR").map(PathBuf::from).unwrap_or(defecto.data_dir),
            bind: get("TAREAS_BIND").unwrap_or(defecto.bind),
            clave: get("TAREAS_CLAVE").unwrap_or(defecto.clave),
            columnas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn valores_por_defecto() {
        let cfg = Config::desde_fuente(|_| None);
        assert_eq!(cfg.data_dir, PathBuf::from("."));
        assert_eq!(cfg.bind, "127.0.0.1:8080");
        assert_eq!(cfg.clave, "clave_2026");
        assert_eq!(cfg.columnas.vendedor, "Piramide Ventas.Vendedor");
    }

    #[test]
    fn sobrescribe_desde_fuente() {
        let mut env: HashMap<&str, &str> = HashMap::new();
        env.insert("TAREAS_DATA_DIR", "/tmp/datos");
        env.insert("TAREAS_CLAVE", "secreta");
        env.insert("TAREAS_COLUMNA_CLIENTE", "Codigo Local");
        env.insert("TAREAS_BIND", "   ");
        let cfg = Config::desde_fuente(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/datos"));
        assert_eq!(cfg.clave, "secreta");
        assert_eq!(cfg.columnas.cliente, "Codigo Local");
        // vacío => por defecto
        assert_eq!(cfg.bind, BIND_POR_DEFECTO);
    }
}
