//! Desgloses agrupados del tablero.
//!
//! `agrupar` es el motor genérico (clave × lista de métricas). Los desgloses
//! con nombre (`por_macrocanal`, `por_vendedor`, ...) se construyen encima y
//! sólo agregan el orden y el recorte que cada vista necesita.
//!
//! Como en un group-by tabular, las filas cuya clave está vacía no forman grupo.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::analisis::filtros::VistaFiltrada;
use crate::analisis::porcentaje;
use crate::models::{Mes, Tarea};

pub const TOP_SUBCANALES: usize = 10;
pub const TOP_ITEMS: usize = 10;
pub const TOP_MAPA_CALOR: usize = 15;
/// Items ofrecidos esta cantidad de veces o menos no son significativos.
pub const MINIMO_OFRECIDO: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Columna {
    Mes,
    Macrocanal,
    Subcanal,
    Vendedor,
    Categoria,
    Cliente,
    Pregunta,
}

impl Columna {
    pub fn valor<'a>(&self, t: &'a Tarea) -> Option<&'a str> {
        let v = match self {
            Columna::Mes => t.mes.as_str(),
            Columna::Macrocanal => t.macrocanal.as_str(),
            Columna::Subcanal => t.subcanal.as_str(),
            Columna::Vendedor => t.vendedor.as_str(),
            Columna::Categoria => t.categoria.as_str(),
            Columna::Cliente => t.cliente.as_deref()?,
            Columna::Pregunta => t.pregunta.as_str(),
        };
        if v.is_empty() { None } else { Some(v) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bandera {
    Geo,
    Venta,
    Final,
}

impl Bandera {
    pub fn valor(&self, t: &Tarea) -> f64 {
        match self {
            Bandera::Geo => t.validada_geo,
            Bandera::Venta => t.validada_venta,
            Bandera::Final => t.validada_final,
        }
    }
}

/// Denominador de un porcentaje.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Conteo,
    Suma(Bandera),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metrica {
    /// Cantidad de filas del grupo.
    Conteo,
    /// Suma de una bandera.
    Suma(Bandera),
    /// Σ numerador / base * 100, 0 si la base es 0.
    Porcentaje { numerador: Bandera, denominador: Base },
    /// Cantidad de valores distintos (no vacíos) de otra columna.
    Distintos(Columna),
}

/// Una clave de agrupación con un valor por métrica pedida (mismo orden).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaDesglose {
    pub clave: String,
    pub valores: Vec<f64>,
}

struct Acumulador<'a> {
    conteo: f64,
    sumas: [f64; 3],
    distintos: Vec<HashSet<&'a str>>,
}

fn indice(b: Bandera) -> usize {
    match b {
        Bandera::Geo => 0,
        Bandera::Venta => 1,
        Bandera::Final => 2,
    }
}

/// Agrupa la vista por `clave` y calcula `metricas` para cada grupo.
/// Los grupos salen en orden de primera aparición.
pub fn agrupar(vista: &VistaFiltrada<'_>, clave: Columna, metricas: &[Metrica]) -> Vec<FilaDesglose> {
    let columnas_distintas: Vec<Columna> = metricas
        .iter()
        .filter_map(|m| match m {
            Metrica::Distintos(c) => Some(*c),
            _ => None,
        })
        .collect();

    let mut orden: Vec<&str> = Vec::new();
    let mut grupos: HashMap<&str, Acumulador<'_>> = HashMap::new();

    for t in vista.iter() {
        let k = match clave.valor(t) {
            Some(k) => k,
            None => continue,
        };
        let acc = grupos.entry(k).or_insert_with(|| {
            orden.push(k);
            Acumulador {
                conteo: 0.0,
                sumas: [0.0; 3],
                distintos: vec![HashSet::new(); columnas_distintas.len()],
            }
        });
        acc.conteo += 1.0;
        acc.sumas[0] += t.validada_geo;
        acc.sumas[1] += t.validada_venta;
        acc.sumas[2] += t.validada_final;
        for (set, col) in acc.distintos.iter_mut().zip(columnas_distintas.iter()) {
            if let Some(v) = col.valor(t) {
                set.insert(v);
            }
        }
    }

    orden
        .into_iter()
        .filter_map(|k| grupos.get(k).map(|acc| (k, acc)))
        .map(|(k, acc)| {
            let mut n_distinto = 0;
            let valores = metricas
                .iter()
                .map(|m| match m {
                    Metrica::Conteo => acc.conteo,
                    Metrica::Suma(b) => acc.sumas[indice(*b)],
                    Metrica::Porcentaje { numerador, denominador } => {
                        let den = match denominador {
                            Base::Conteo => acc.conteo,
                            Base::Suma(b) => acc.sumas[indice(*b)],
                        };
                        porcentaje(acc.sumas[indice(*numerador)], den)
                    }
                    Metrica::Distintos(_) => {
                        let v = acc.distintos[n_distinto].len() as f64;
                        n_distinto += 1;
                        v
                    }
                })
                .collect();
            FilaDesglose { clave: k.to_string(), valores }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Canales
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaCanal {
    pub canal: String,
    pub visitas: f64,
    pub ventas: f64,
    pub tasa_conversion: f64,
}

fn filas_canal(vista: &VistaFiltrada<'_>, columna: Columna) -> Vec<FilaCanal> {
    let metricas = [
        Metrica::Suma(Bandera::Geo),
        Metrica::Suma(Bandera::Venta),
        Metrica::Porcentaje {
            numerador: Bandera::Venta,
            denominador: Base::Suma(Bandera::Geo),
        },
    ];
    agrupar(vista, columna, &metricas)
        .into_iter()
        .map(|f| FilaCanal {
            canal: f.clave,
            visitas: f.valores[0],
            ventas: f.valores[1],
            tasa_conversion: f.valores[2],
        })
        .collect()
}

/// Visitas, ventas y conversión por macrocanal, ordenado por nombre.
pub fn por_macrocanal(vista: &VistaFiltrada<'_>) -> Vec<FilaCanal> {
    let mut filas = filas_canal(vista, Columna::Macrocanal);
    filas.sort_by(|a, b| a.canal.cmp(&b.canal));
    filas
}

/// Los `n` subcanales con más visitas.
pub fn top_subcanales(vista: &VistaFiltrada<'_>, n: usize) -> Vec<FilaCanal> {
    let mut filas = filas_canal(vista, Columna::Subcanal);
    filas.sort_by(|a, b| b.visitas.total_cmp(&a.visitas).then_with(|| a.canal.cmp(&b.canal)));
    filas.truncate(n);
    filas
}

// ---------------------------------------------------------------------------
// Fuerza de ventas
// ---------------------------------------------------------------------------

/// Nivel de cumplimiento de un vendedor. Intervalos semiabiertos por abajo;
/// el último no tiene techo (un % sobre 100 por datos inconsistentes cae en Alto).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Cuadrante {
    Critico,
    Bajo,
    Medio,
    Alto,
}

impl Cuadrante {
    pub const TODOS: [Cuadrante; 4] = [Cuadrante::Critico, Cuadrante::Bajo, Cuadrante::Medio, Cuadrante::Alto];

    pub fn desde_pct(pct: f64) -> Cuadrante {
        if pct < 25.0 {
            Cuadrante::Critico
        } else if pct < 50.0 {
            Cuadrante::Bajo
        } else if pct < 75.0 {
            Cuadrante::Medio
        } else {
            Cuadrante::Alto
        }
    }

    pub fn etiqueta(&self) -> &'static str {
        match self {
            Cuadrante::Critico => "0-25% (Crítico)",
            Cuadrante::Bajo => "25-50% (Bajo)",
            Cuadrante::Medio => "50-75% (Medio)",
            Cuadrante::Alto => "75-100% (Alto)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaVendedor {
    pub vendedor: String,
    pub tareas: usize,
    pub cumplidas: f64,
    pub pct_cumplimiento: f64,
    pub visitas: f64,
    pub ventas: f64,
    pub tasa_conversion: f64,
    pub cuadrante: Cuadrante,
}

/// Detalle por vendedor, ordenado por % de cumplimiento descendente.
pub fn por_vendedor(vista: &VistaFiltrada<'_>) -> Vec<FilaVendedor> {
    let metricas = [
        Metrica::Conteo,
        Metrica::Suma(Bandera::Final),
        Metrica::Porcentaje {
            numerador: Bandera::Final,
            denominador: Base::Conteo,
        },
        Metrica::Suma(Bandera::Geo),
        Metrica::Suma(Bandera::Venta),
        Metrica::Porcentaje {
            numerador: Bandera::Venta,
            denominador: Base::Suma(Bandera::Geo),
        },
    ];
    let mut filas: Vec<FilaVendedor> = agrupar(vista, Columna::Vendedor, &metricas)
        .into_iter()
        .map(|f| FilaVendedor {
            vendedor: f.clave,
            tareas: f.valores[0] as usize,
            cumplidas: f.valores[1],
            pct_cumplimiento: f.valores[2],
            visitas: f.valores[3],
            ventas: f.valores[4],
            tasa_conversion: f.valores[5],
            cuadrante: Cuadrante::desde_pct(f.valores[2]),
        })
        .collect();
    filas.sort_by(|a, b| {
        b.pct_cumplimiento
            .total_cmp(&a.pct_cumplimiento)
            .then_with(|| a.vendedor.cmp(&b.vendedor))
    });
    filas
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConteoCuadrante {
    pub cuadrante: Cuadrante,
    pub etiqueta: &'static str,
    pub vendedores: usize,
}

/// Cantidad de vendedores por cuadrante; siempre los cuatro, en orden.
pub fn distribucion_cuadrantes(vendedores: &[FilaVendedor]) -> Vec<ConteoCuadrante> {
    Cuadrante::TODOS
        .iter()
        .map(|c| ConteoCuadrante {
            cuadrante: *c,
            etiqueta: c.etiqueta(),
            vendedores: vendedores.iter().filter(|v| v.cuadrante == *c).count(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Clientes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaCategoria {
    pub categoria: String,
    pub asignadas: usize,
    pub cumplidas: f64,
    pub pct_cumplimiento: f64,
    /// Clientes/locales distintos atendidos. `None` si el archivo no trae la columna.
    pub clientes_unicos: Option<usize>,
}

/// Asignadas vs cumplidas por categoría de cliente, ordenado por % descendente.
pub fn por_categoria(vista: &VistaFiltrada<'_>, con_clientes: bool) -> Vec<FilaCategoria> {
    let metricas = [
        Metrica::Conteo,
        Metrica::Suma(Bandera::Final),
        Metrica::Porcentaje {
            numerador: Bandera::Final,
            denominador: Base::Conteo,
        },
        Metrica::Distintos(Columna::Cliente),
    ];
    let mut filas: Vec<FilaCategoria> = agrupar(vista, Columna::Categoria, &metricas)
        .into_iter()
        .map(|f| FilaCategoria {
            categoria: f.clave,
            asignadas: f.valores[0] as usize,
            cumplidas: f.valores[1],
            pct_cumplimiento: f.valores[2],
            clientes_unicos: if con_clientes { Some(f.valores[3] as usize) } else { None },
        })
        .collect();
    filas.sort_by(|a, b| {
        b.pct_cumplimiento
            .total_cmp(&a.pct_cumplimiento)
            .then_with(|| a.categoria.cmp(&b.categoria))
    });
    filas
}

// ---------------------------------------------------------------------------
// Portafolio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaItem {
    pub item: String,
    pub ventas: usize,
}

/// Items más vendidos: sólo filas con VALIDADA FINAL == 1.
pub fn top_items_vendidos(vista: &VistaFiltrada<'_>, n: usize) -> Vec<FilaItem> {
    let vendidas = vista.donde(|t| t.validada_final == 1.0);
    let mut filas: Vec<FilaItem> = agrupar(&vendidas, Columna::Pregunta, &[Metrica::Conteo])
        .into_iter()
        .map(|f| FilaItem {
            item: f.clave,
            ventas: f.valores[0] as usize,
        })
        .collect();
    filas.sort_by(|a, b| b.ventas.cmp(&a.ventas).then_with(|| a.item.cmp(&b.item)));
    filas.truncate(n);
    filas
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaEfectividad {
    pub item: String,
    pub ofrecido: usize,
    pub vendido: f64,
    pub efectividad: f64,
}

/// Items con mejor % de cierre dentro de una categoría. Se descartan los
/// ofrecidos `MINIMO_OFRECIDO` veces o menos antes de ordenar y recortar.
pub fn efectividad_items(vista: &VistaFiltrada<'_>, categoria: &str, n: usize) -> Vec<FilaEfectividad> {
    let de_categoria = vista.donde(|t| t.categoria == categoria);
    let metricas = [
        Metrica::Conteo,
        Metrica::Suma(Bandera::Final),
        Metrica::Porcentaje {
            numerador: Bandera::Final,
            denominador: Base::Conteo,
        },
    ];
    let mut filas: Vec<FilaEfectividad> = agrupar(&de_categoria, Columna::Pregunta, &metricas)
        .into_iter()
        .map(|f| FilaEfectividad {
            item: f.clave,
            ofrecido: f.valores[0] as usize,
            vendido: f.valores[1],
            efectividad: f.valores[2],
        })
        .filter(|f| f.ofrecido > MINIMO_OFRECIDO)
        .collect();
    filas.sort_by(|a, b| {
        b.efectividad
            .total_cmp(&a.efectividad)
            .then_with(|| b.ofrecido.cmp(&a.ofrecido))
            .then_with(|| a.item.cmp(&b.item))
    });
    filas.truncate(n);
    filas
}

// ---------------------------------------------------------------------------
// Mapa de calor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaMapaCalor {
    pub subcanal: String,
    /// Un conteo por cada mes de `MapaCalor::meses`.
    pub conteos: Vec<usize>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapaCalor {
    pub meses: Vec<Mes>,
    pub filas: Vec<FilaMapaCalor>,
}

/// Cantidad de tareas por (subcanal, mes). Filas ordenadas por total descendente.
pub fn mapa_calor(vista: &VistaFiltrada<'_>, n: usize) -> MapaCalor {
    let mut por_subcanal: HashMap<&str, [usize; 12]> = HashMap::new();
    let mut presentes = [false; 12];

    for t in vista.iter() {
        let (Some(sub), Some(mes)) = (Columna::Subcanal.valor(t), t.mes_canonico()) else {
            continue;
        };
        let i = mes as usize;
        presentes[i] = true;
        por_subcanal.entry(sub).or_insert([0; 12])[i] += 1;
    }

    let meses: Vec<Mes> = Mes::TODOS.iter().copied().filter(|m| presentes[*m as usize]).collect();

    let mut filas: Vec<FilaMapaCalor> = por_subcanal
        .into_iter()
        .map(|(sub, conteos)| {
            let conteos: Vec<usize> = meses.iter().map(|m| conteos[*m as usize]).collect();
            let total = conteos.iter().sum();
            FilaMapaCalor {
                subcanal: sub.to_string(),
                conteos,
                total,
            }
        })
        .collect();
    filas.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.subcanal.cmp(&b.subcanal)));
    filas.truncate(n);

    MapaCalor { meses, filas }
}
