//! Caché simple en memoria para el dataset de tareas
//!
//! Proporciona dataset_cached(dir, columnas) -> Arc<Dataset>, que lee el archivo
//! de tareas una sola vez por directorio durante la vida del proceso.
//!
//! Key notes:
//! - la clave es el directorio canonicalizado (si se puede), de modo que `.` y
//!   su ruta absoluta comparten entrada;
//! - la lectura se hace con el Mutex tomado: dos peticiones concurrentes en frío
//!   no leen el archivo dos veces;
//! - sólo se guardan cargas exitosas. Si falta el archivo o está corrupto, la
//!   siguiente interacción vuelve a intentarlo.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::Result;
use crate::models::{Columnas, Dataset};

static DATASET_CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<Dataset>>>> = OnceLock::new();
static HITS: AtomicUsize = AtomicUsize::new(0);
static MISSES: AtomicUsize = AtomicUsize::new(0);

fn clave(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

/// Devuelve el dataset de `dir`, leyéndolo sólo la primera vez.
pub fn dataset_cached(dir: &Path, columnas: &Columnas) -> Result<Arc<Dataset>> {
    let cache = DATASET_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = clave(dir);

    let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = guard.get(&key) {
        HITS.fetch_add(1, Ordering::Relaxed);
        return Ok(Arc::clone(existing));
    }

    MISSES.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(dir = ?key, "dataset no está en caché, leyendo desde disco");
    let dataset = Arc::new(super::cargar_dataset(dir, columnas)?);
    guard.insert(key, Arc::clone(&dataset));
    Ok(dataset)
}

/// (hits, misses, entradas)
pub fn cache_stats() -> (usize, usize, usize) {
    let entries = DATASET_CACHE
        .get()
        .map(|c| c.lock().unwrap_or_else(|e| e.into_inner()).len())
        .unwrap_or(0);
    (HITS.load(Ordering::Relaxed), MISSES.load(Ordering::Relaxed), entries)
}
