use serde::{Deserialize, Serialize};

use crate::analisis::filtros::{opciones_filtro, subcanales_de, OpcionesFiltro};
use crate::analisis::simulador::{
    planificar, puente_ventas, simular, EntradaEscenario, EntradaPlan, Escenario, PlanRecuperacion, TramoPuente,
};
use crate::analisis::tablero::{Seleccion, Variante};
use crate::auth::Sesion;
use crate::error::{Result, TareasError};
use crate::models::{Dataset, Mes};

/// Rango del slider de variación de visitas del escenario simple.
pub const RANGO_DELTA_VISITAS: (f64, f64) = (-50.0, 100.0);
/// Rango de los sliders de porcentaje restantes.
pub const RANGO_PORCENTAJE: (f64, f64) = (0.0, 100.0);

fn validar_rango(nombre: &str, valor: f64, (min, max): (f64, f64)) -> Result<()> {
    if !valor.is_finite() || valor < min || valor > max {
        return Err(TareasError::ParametroInvalido(format!(
            "{} debe estar entre {} y {} (recibido {})",
            nombre, min, max, valor
        )));
    }
    Ok(())
}

/// Cuerpo de `POST /tablero`.
///
/// ```json
/// { "meses": ["Enero", "Febrero"], "canales": ["Tradicional"], "categoria": "Oro", "variante": "war_room" }
/// ```
/// Todos los campos son opcionales.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeticionTablero {
    #[serde(flatten)]
    pub seleccion: Seleccion,
    #[serde(default)]
    pub variante: Variante,
}

/// Cuerpo de `POST /simulacion` (escenario simple sobre un subcanal).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeticionSimulacion {
    #[serde(default)]
    pub meses: Option<Vec<Mes>>,
    #[serde(default)]
    pub canales: Option<Vec<String>>,
    /// Subcanal a perturbar; por defecto el primero de la vista.
    #[serde(default)]
    pub subcanal: Option<String>,
    pub delta_visitas_pct: f64,
    /// Por defecto la conversión actual del subcanal.
    #[serde(default)]
    pub nueva_conversion_pct: Option<f64>,
}

impl PeticionSimulacion {
    pub fn validar(&self) -> Result<()> {
        validar_rango("delta_visitas_pct", self.delta_visitas_pct, RANGO_DELTA_VISITAS)?;
        if let Some(c) = self.nueva_conversion_pct {
            validar_rango("nueva_conversion_pct", c, RANGO_PORCENTAJE)?;
        }
        Ok(())
    }

    fn seleccion(&self) -> Seleccion {
        Seleccion {
            meses: self.meses.clone(),
            canales: self.canales.clone(),
            categoria: None,
        }
    }
}

/// Cuerpo de `POST /plan` (plan de recuperación con dos palancas).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeticionPlan {
    #[serde(default)]
    pub meses: Option<Vec<Mes>>,
    #[serde(default)]
    pub canales: Option<Vec<String>>,
    /// Por defecto 110% de las ventas actuales.
    #[serde(default)]
    pub meta_ventas: Option<f64>,
    pub aumento_visitas_pct: f64,
    pub conversion_objetivo_pct: f64,
}

impl PeticionPlan {
    pub fn validar(&self) -> Result<()> {
        validar_rango("aumento_visitas_pct", self.aumento_visitas_pct, RANGO_PORCENTAJE)?;
        validar_rango("conversion_objetivo_pct", self.conversion_objetivo_pct, RANGO_PORCENTAJE)?;
        if let Some(m) = self.meta_ventas {
            if !m.is_finite() {
                return Err(TareasError::ParametroInvalido("meta_ventas debe ser un número finito".to_string()));
            }
        }
        Ok(())
    }

    fn seleccion(&self) -> Seleccion {
        Seleccion {
            meses: self.meses.clone(),
            canales: self.canales.clone(),
            categoria: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RespuestaOpciones {
    pub archivo: String,
    pub cargado_en: String,
    pub filas: usize,
    pub opciones: OpcionesFiltro,
}

#[derive(Debug, Clone, Serialize)]
pub struct RespuestaSimulacion {
    /// `None` cuando la vista no tiene subcanales.
    pub subcanal: Option<String>,
    pub entrada: EntradaEscenario,
    pub escenario: Escenario,
    pub puente: Vec<TramoPuente>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RespuestaPlan {
    pub entrada: EntradaPlan,
    pub plan: PlanRecuperacion,
}

pub fn opciones(sesion: &Sesion, dataset: &Dataset) -> Result<RespuestaOpciones> {
    sesion.exigir()?;
    Ok(RespuestaOpciones {
        archivo: dataset.archivo.clone(),
        cargado_en: dataset.cargado_en.to_rfc3339(),
        filas: dataset.len(),
        opciones: opciones_filtro(dataset),
    })
}

pub fn ejecutar_simulacion(sesion: &Sesion, dataset: &Dataset, peticion: &PeticionSimulacion) -> Result<RespuestaSimulacion> {
    sesion.exigir()?;
    peticion.validar()?;

    let vista = peticion.seleccion().aplicar(dataset);
    let subcanal = peticion
        .subcanal
        .clone()
        .or_else(|| subcanales_de(&vista).into_iter().next());

    let entrada = match &subcanal {
        Some(s) => EntradaEscenario::desde_segmento(&vista, s, peticion.delta_visitas_pct, peticion.nueva_conversion_pct),
        None => EntradaEscenario {
            delta_visitas_pct: peticion.delta_visitas_pct,
            nueva_conversion_pct: peticion.nueva_conversion_pct.unwrap_or(0.0),
            ..Default::default()
        },
    };
    let escenario = simular(&entrada);
    let puente = puente_ventas(&escenario, subcanal.as_deref().unwrap_or(""));

    Ok(RespuestaSimulacion {
        subcanal,
        entrada,
        escenario,
        puente,
    })
}

pub fn ejecutar_plan(sesion: &Sesion, dataset: &Dataset, peticion: &PeticionPlan) -> Result<RespuestaPlan> {
    sesion.exigir()?;
    peticion.validar()?;

    let vista = peticion.seleccion().aplicar(dataset);
    let entrada = EntradaPlan::desde_vista(
        &vista,
        peticion.meta_ventas,
        peticion.aumento_visitas_pct,
        peticion.conversion_objetivo_pct,
    );
    let plan = planificar(&entrada);
    Ok(RespuestaPlan { entrada, plan })
}

/// Ejemplos de cuerpos para `GET /help`.
pub fn ejemplos() -> serde_json::Value {
    serde_json::json!({
        "tablero": {
            "meses": ["Enero", "Febrero"],
            "canales": ["Tradicional"],
            "categoria": "Oro",
            "variante": "seguimiento"
        },
        "simulacion": PeticionSimulacion {
            meses: None,
            canales: None,
            subcanal: Some("Almacenes".to_string()),
            delta_visitas_pct: 20.0,
            nueva_conversion_pct: Some(15.0),
        },
        "plan": PeticionPlan {
            meses: Some(vec![Mes::Enero]),
            canales: None,
            meta_ventas: None,
            aumento_visitas_pct: 10.0,
            conversion_objetivo_pct: 12.0,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tarea;

    fn dataset() -> Dataset {
        let mk = |sub: &str, geo: f64, venta: f64| Tarea {
            mes: "Enero".to_string(),
            macrocanal: "Tradicional".to_string(),
            subcanal: sub.to_string(),
            validada_geo: geo,
            validada_venta: venta,
            ..Default::default()
        };
        Dataset::nuevo(
            vec![mk("Almacenes", 1.0, 1.0), mk("Almacenes", 1.0, 0.0), mk("Kioscos", 2.0, 1.0)],
            "Tareas.csv",
            false,
        )
    }

    fn abierta() -> Sesion {
        Sesion { autenticada: true }
    }

    #[test]
    fn peticion_tablero_acepta_cuerpo_vacio() {
        let p: PeticionTablero = serde_json::from_str("{}").unwrap();
        assert_eq!(p.seleccion, Seleccion::default());
        assert_eq!(p.variante, Variante::Seguimiento);

        let p: PeticionTablero =
            serde_json::from_str(r#"{"canales":[],"categoria":"Oro","variante":"war_room"}"#).unwrap();
        assert_eq!(p.seleccion.canales, Some(Vec::new()));
        assert_eq!(p.seleccion.categoria.as_deref(), Some("Oro"));
        assert_eq!(p.variante, Variante::WarRoom);
    }

    #[test]
    fn rangos_de_sliders() {
        let mut p = PeticionSimulacion {
            delta_visitas_pct: -50.0,
            ..Default::default()
        };
        assert!(p.validar().is_ok());
        p.delta_visitas_pct = -50.5;
        assert!(matches!(p.validar(), Err(TareasError::ParametroInvalido(_))));
        p.delta_visitas_pct = 100.0;
        p.nueva_conversion_pct = Some(101.0);
        assert!(p.validar().is_err());
        p.nueva_conversion_pct = Some(f64::NAN);
        assert!(p.validar().is_err());

        let mut plan = PeticionPlan {
            aumento_visitas_pct: 0.0,
            conversion_objetivo_pct: 100.0,
            ..Default::default()
        };
        assert!(plan.validar().is_ok());
        plan.aumento_visitas_pct = -1.0;
        assert!(plan.validar().is_err());
        plan.aumento_visitas_pct = 10.0;
        plan.meta_ventas = Some(f64::INFINITY);
        assert!(plan.validar().is_err());
    }

    #[test]
    fn simulacion_usa_primer_subcanal_por_defecto() {
        let ds = dataset();
        let p = PeticionSimulacion {
            delta_visitas_pct: 100.0,
            ..Default::default()
        };
        let r = ejecutar_simulacion(&abierta(), &ds, &p).unwrap();
        assert_eq!(r.subcanal.as_deref(), Some("Almacenes"));
        assert_eq!(r.entrada.visitas_base, 2.0);
        assert_eq!(r.entrada.nueva_conversion_pct, 50.0);
        assert_eq!(r.entrada.ventas_globales, 2.0);
        // 4 visitas al 50% => 2 ventas, +1 sobre la base del segmento
        assert!((r.escenario.total_proyectado - 3.0).abs() < 1e-9);
        assert_eq!(r.puente.len(), 3);
        assert_eq!(r.puente[1].etiqueta, "Impacto Almacenes");
    }

    #[test]
    fn simulacion_sobre_vista_vacia_da_ceros() {
        let ds = dataset();
        let p = PeticionSimulacion {
            canales: Some(Vec::new()),
            delta_visitas_pct: 10.0,
            ..Default::default()
        };
        let r = ejecutar_simulacion(&abierta(), &ds, &p).unwrap();
        assert_eq!(r.subcanal, None);
        assert_eq!(r.escenario.total_proyectado, 0.0);
        assert_eq!(r.escenario.lift_pct, 0.0);
    }

    #[test]
    fn plan_con_meta_por_defecto() {
        let ds = dataset();
        let p = PeticionPlan {
            aumento_visitas_pct: 0.0,
            conversion_objetivo_pct: 50.0,
            ..Default::default()
        };
        let r = ejecutar_plan(&abierta(), &ds, &p).unwrap();
        assert_eq!(r.entrada.ventas_base, 2.0);
        assert!((r.entrada.meta_ventas - 2.2).abs() < 1e-9);
        // 4 visitas al 50% => 2 ventas
        assert!((r.plan.ventas_proyectadas - 2.0).abs() < 1e-9);
    }

    #[test]
    fn sin_sesion_no_hay_calculo() {
        let ds = dataset();
        assert!(matches!(opciones(&Sesion::anonima(), &ds), Err(TareasError::AccesoDenegado)));
        assert!(ejecutar_plan(&Sesion::anonima(), &ds, &PeticionPlan::default()).is_err());
    }
}
