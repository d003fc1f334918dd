use actix_cors::Cors;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::analisis::tablero::construir_tablero;
use crate::api_json::{self, PeticionPlan, PeticionSimulacion, PeticionTablero};
use crate::auth::{Sesion, CABECERA_CLAVE};
use crate::config::Config;
use crate::error::{Result, TareasError};
use crate::fuente::cache::{cache_stats, dataset_cached};
use crate::models::Dataset;

/// Estado compartido entre workers.
pub type Estado = web::Data<Config>;

fn sesion_de(req: &HttpRequest, cfg: &Config) -> Sesion {
    let provista = req.headers().get(CABECERA_CLAVE).and_then(|v| v.to_str().ok());
    Sesion::verificar(&cfg.clave, provista)
}

/// Traduce un error del dominio a la respuesta HTTP que ve el cliente.
fn respuesta_error(e: &TareasError) -> HttpResponse {
    let cuerpo = json!({"error": e.to_string()});
    match e {
        TareasError::AccesoDenegado => HttpResponse::Unauthorized().json(cuerpo),
        TareasError::ParametroInvalido(_) => HttpResponse::BadRequest().json(cuerpo),
        TareasError::FuenteNoEncontrada { .. }
        | TareasError::Lectura { .. }
        | TareasError::ColumnaFaltante { .. }
        | TareasError::Io(_) => HttpResponse::InternalServerError().json(cuerpo),
    }
}

fn parsear<T: DeserializeOwned>(body: serde_json::Value) -> std::result::Result<T, HttpResponse> {
    serde_json::from_value(body)
        .map_err(|e| HttpResponse::BadRequest().json(json!({"error": format!("invalid JSON body: {}", e)})))
}

/// Carga (o toma del cache) el dataset y ejecuta `calculo` fuera del runtime async.
/// La sesión se verifica antes de tocar el disco.
async fn con_dataset<T, F>(req: &HttpRequest, cfg: Estado, calculo: F) -> HttpResponse
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Sesion, &Dataset) -> Result<T> + Send + 'static,
{
    let sesion = sesion_de(req, &cfg);
    if let Err(e) = sesion.exigir() {
        tracing::warn!(ruta = %req.path(), "acceso denegado");
        return respuesta_error(&e);
    }

    let cfg = cfg.into_inner();
    let handle = tokio::task::spawn_blocking(move || {
        let dataset = dataset_cached(&cfg.data_dir, &cfg.columnas)?;
        calculo(&sesion, dataset.as_ref())
    });

    match handle.await {
        Ok(Ok(valor)) => HttpResponse::Ok().json(valor),
        Ok(Err(e)) => {
            tracing::error!(ruta = %req.path(), error = %e, "fallo al procesar la petición");
            respuesta_error(&e)
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": format!("task join error: {}", e)})),
    }
}

async fn salud_handler() -> impl Responder {
    let (hits, misses, entradas) = cache_stats();
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "cache": {"hits": hits, "misses": misses, "entradas": entradas}
    }))
}

/// GET /opciones: valores disponibles para los selectores.
async fn opciones_handler(req: HttpRequest, cfg: Estado) -> impl Responder {
    con_dataset(&req, cfg, api_json::opciones).await
}

/// POST /tablero: KPIs y desgloses para la selección dada.
async fn tablero_handler(req: HttpRequest, cfg: Estado, body: web::Json<serde_json::Value>) -> impl Responder {
    let peticion: PeticionTablero = match parsear(body.into_inner()) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    con_dataset(&req, cfg, move |sesion, ds| {
        construir_tablero(sesion, ds, &peticion.seleccion, peticion.variante)
    })
    .await
}

async fn simulacion_handler(req: HttpRequest, cfg: Estado, body: web::Json<serde_json::Value>) -> impl Responder {
    let peticion: PeticionSimulacion = match parsear(body.into_inner()) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    con_dataset(&req, cfg, move |sesion, ds| api_json::ejecutar_simulacion(sesion, ds, &peticion)).await
}

async fn plan_handler(req: HttpRequest, cfg: Estado, body: web::Json<serde_json::Value>) -> impl Responder {
    let peticion: PeticionPlan = match parsear(body.into_inner()) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    con_dataset(&req, cfg, move |sesion, ds| api_json::ejecutar_plan(sesion, ds, &peticion)).await
}

async fn help_handler() -> impl Responder {
    let help = json!({
        "description": "API del tablero de seguimiento de tareas. Todas las rutas salvo /salud y /help requieren la cabecera 'x-clave-acceso'. Los campos 'meses' y 'canales' omitidos seleccionan todos los valores; una lista vacía no selecciona nada.",
        "rutas": {
            "GET /salud": "estado del servicio y del cache",
            "GET /opciones": "meses, canales y categorías disponibles",
            "POST /tablero": "KPIs y desgloses",
            "POST /simulacion": "escenario simple sobre un subcanal",
            "POST /plan": "plan de recuperación (volumen + efectividad)"
        },
        "ejemplos": api_json::ejemplos(),
        "variantes": ["seguimiento", "war_room"]
    });
    HttpResponse::Ok().json(help)
}

/// Registra las rutas. Separado de `run_server` para poder montarlas en tests.
pub fn rutas(cfg: &mut web::ServiceConfig) {
    cfg.route("/salud", web::get().to(salud_handler))
        .route("/opciones", web::get().to(opciones_handler))
        .route("/tablero", web::post().to(tablero_handler))
        .route("/simulacion", web::post().to(simulacion_handler))
        .route("/plan", web::post().to(plan_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind = config.bind.clone();
    tracing::info!(%bind, data_dir = %config.data_dir.display(), "iniciando servidor");
    let estado = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(estado.clone())
            .wrap(Cors::permissive())
            .configure(rutas)
    })
    .bind(bind)?
    .run()
    .await
}
