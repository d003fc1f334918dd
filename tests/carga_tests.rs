mod common;

use std::sync::Arc;

use seguimiento_tareas::fuente::{buscar_archivo_tareas, cache_stats, cargar_dataset, dataset_cached};
use seguimiento_tareas::models::Columnas;
use seguimiento_tareas::TareasError;
use tempfile::tempdir;

use common::{csv_enero_febrero, escribir, escribir_zip, ENCABEZADO};

#[test]
fn test_carga_csv_plano() {
    let dir = tempdir().unwrap();
    escribir(dir.path(), "Tareas_2025.csv", csv_enero_febrero().as_bytes());

    let ds = cargar_dataset(dir.path(), &Columnas::default()).expect("debe cargar el CSV");
    assert_eq!(ds.len(), 15);
    assert_eq!(ds.archivo, "Tareas_2025.csv");
    assert!(ds.tiene_cliente);
    assert_eq!(ds.tareas[0].mes, "Enero");
    assert_eq!(ds.tareas[0].validada_venta, 1.0);
    assert_eq!(ds.tareas[14].macrocanal, "B");
    assert_eq!(ds.tareas[14].cliente.as_deref(), Some("C-B1"));
}

#[test]
fn test_csv_con_bom_y_coma_decimal() {
    let dir = tempdir().unwrap();
    let mut contenido = vec![0xEF, 0xBB, 0xBF];
    contenido.extend_from_slice(
        format!("{}\nMarzo,A,A1,Oro,Item,1,\"0,5\",,Ana,X\n", ENCABEZADO).as_bytes(),
    );
    escribir(dir.path(), "Tareas.csv", &contenido);

    let ds = cargar_dataset(dir.path(), &Columnas::default()).unwrap();
    assert_eq!(ds.len(), 1);
    assert_eq!(ds.tareas[0].mes, "Marzo");
    assert_eq!(ds.tareas[0].validada_venta, 0.5);
    assert_eq!(ds.tareas[0].validada_final, 0.0);
}

#[test]
fn test_zip_con_csv_interno() {
    let dir = tempdir().unwrap();
    let csv = csv_enero_febrero();
    escribir_zip(
        dir.path(),
        "Tareas.zip",
        &[("LEEME.txt", &b"no es tabla"[..]), ("datos/tareas.csv", csv.as_bytes())],
    );

    let ds = cargar_dataset(dir.path(), &Columnas::default()).unwrap();
    assert_eq!(ds.len(), 15);
    assert_eq!(ds.archivo, "Tareas.zip");
}

#[test]
fn test_zip_gana_sobre_csv() {
    let dir = tempdir().unwrap();
    escribir(dir.path(), "Tareas.csv", format!("{}\n", ENCABEZADO).as_bytes());
    escribir_zip(dir.path(), "Tareas_backup.zip", &[("t.csv", csv_enero_febrero().as_bytes())]);

    let elegido = buscar_archivo_tareas(dir.path()).unwrap();
    assert_eq!(elegido.file_name().unwrap(), "Tareas_backup.zip");
    assert_eq!(cargar_dataset(dir.path(), &Columnas::default()).unwrap().len(), 15);
}

#[test]
fn test_zip_sin_tabla_es_error_de_lectura() {
    let dir = tempdir().unwrap();
    escribir_zip(dir.path(), "Tareas.zip", &[("notas.txt", &b"hola"[..])]);

    match cargar_dataset(dir.path(), &Columnas::default()) {
        Err(TareasError::Lectura { archivo, .. }) => assert_eq!(archivo, "Tareas.zip"),
        other => panic!("se esperaba Lectura, obtuve {:?}", other.map(|d| d.len())),
    }
}

#[test]
fn test_zip_corrupto_es_error_de_lectura() {
    let dir = tempdir().unwrap();
    escribir(dir.path(), "Tareas.zip", b"esto no es un zip");
    assert!(matches!(
        cargar_dataset(dir.path(), &Columnas::default()),
        Err(TareasError::Lectura { .. })
    ));
}

#[test]
fn test_directorio_sin_candidato() {
    let dir = tempdir().unwrap();
    escribir(dir.path(), "tareas.csv", csv_enero_febrero().as_bytes());
    escribir(dir.path(), "Reporte.csv", csv_enero_febrero().as_bytes());

    match cargar_dataset(dir.path(), &Columnas::default()) {
        Err(e @ TareasError::FuenteNoEncontrada { .. }) => {
            assert!(e.to_string().contains("no se encontró archivo de datos"));
        }
        other => panic!("se esperaba FuenteNoEncontrada, obtuve {:?}", other.map(|d| d.len())),
    }
}

#[test]
fn test_columna_faltante_con_sugerencia() {
    let dir = tempdir().unwrap();
    let csv = "Mes Nombre,Macrocanal,Subcanal,Categoria,Pregunta,VALIDADA GEO,VALIDADA VENTA,VALIDADA FINAL,Piramide Ventas.Vendedor\nEnero,A,A1,Oro,I,1,1,1,Ana\n";
    escribir(dir.path(), "Tareas.csv", csv.as_bytes());

    match cargar_dataset(dir.path(), &Columnas::default()) {
        Err(TareasError::ColumnaFaltante { columna, sugerencia }) => {
            assert_eq!(columna, "Mes_Nombre");
            assert_eq!(sugerencia.as_deref(), Some("Mes Nombre"));
        }
        other => panic!("se esperaba ColumnaFaltante, obtuve {:?}", other.map(|d| d.len())),
    }
}

#[test]
fn test_cliente_es_opcional() {
    let dir = tempdir().unwrap();
    let csv = "Mes_Nombre,Macrocanal,Subcanal,Categoria,Pregunta,VALIDADA GEO,VALIDADA VENTA,VALIDADA FINAL,Piramide Ventas.Vendedor\nEnero,A,A1,Oro,I,1,1,1,Ana\n";
    escribir(dir.path(), "Tareas.csv", csv.as_bytes());

    let ds = cargar_dataset(dir.path(), &Columnas::default()).unwrap();
    assert!(!ds.tiene_cliente);
    assert_eq!(ds.tareas[0].cliente, None);
}

#[test]
fn test_bandera_invalida_indica_fila_y_columna() {
    let dir = tempdir().unwrap();
    let csv = format!("{}\nEnero,A,A1,Oro,I,1,1,1,Ana,X\nEnero,A,A1,Oro,I,si,1,1,Ana,X\n", ENCABEZADO);
    escribir(dir.path(), "Tareas.csv", csv.as_bytes());

    let err = cargar_dataset(dir.path(), &Columnas::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("VALIDADA GEO"), "{}", msg);
    assert!(msg.contains("fila 3"), "{}", msg);
}

#[test]
fn test_cache_lee_una_sola_vez_y_no_guarda_fallos() {
    let dir = tempdir().unwrap();
    let columnas = Columnas::default();

    // sin archivo: falla y no queda en caché
    assert!(dataset_cached(dir.path(), &columnas).is_err());

    escribir(dir.path(), "Tareas.csv", csv_enero_febrero().as_bytes());
    let a = dataset_cached(dir.path(), &columnas).unwrap();
    let (hits_antes, _, entradas) = cache_stats();
    assert!(entradas >= 1);

    // aunque cambie el archivo, se sigue sirviendo el dataset ya leído
    escribir(dir.path(), "Tareas.csv", format!("{}\n", ENCABEZADO).as_bytes());
    let b = dataset_cached(dir.path(), &columnas).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(b.len(), 15);

    let (hits_despues, _, _) = cache_stats();
    assert!(hits_despues > hits_antes);
}
