// Utilidades compartidas por los tests de integración.
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

pub const ENCABEZADO: &str = "Mes_Nombre,Macrocanal,Subcanal,Categoria,Pregunta,VALIDADA GEO,VALIDADA VENTA,VALIDADA FINAL,Piramide Ventas.Vendedor,Cliente";

/// Una fila CSV con los campos en el orden de `ENCABEZADO`.
pub fn fila(mes: &str, canal: &str, sub: &str, geo: u8, venta: u8, fin: u8) -> String {
    format!("{mes},{canal},{sub},Oro,Coca Cola 1L,{geo},{venta},{fin},Ana,C-{sub}")
}

/// Escenario de referencia: 10 filas Enero/A vendidas y 5 filas Febrero/B sin venta.
pub fn csv_enero_febrero() -> String {
    let mut lineas = vec![ENCABEZADO.to_string()];
    for _ in 0..10 {
        lineas.push(fila("Enero", "A", "A1", 1, 1, 1));
    }
    for _ in 0..5 {
        lineas.push(fila("Febrero", "B", "B1", 1, 0, 0));
    }
    lineas.join("\n") + "\n"
}

pub fn escribir(dir: &Path, nombre: &str, contenido: &[u8]) {
    let mut f = std::fs::File::create(dir.join(nombre)).expect("crear archivo de prueba");
    f.write_all(contenido).expect("escribir archivo de prueba");
}

/// ZIP en disco con las entradas dadas, en ese orden.
pub fn escribir_zip(dir: &Path, nombre: &str, entradas: &[(&str, &[u8])]) {
    let f = std::fs::File::create(dir.join(nombre)).expect("crear zip de prueba");
    let mut zw = zip::ZipWriter::new(f);
    let opciones = zip::write::FileOptions::default();
    for (n, contenido) in entradas {
        zw.start_file(*n, opciones).expect("start_file");
        zw.write_all(contenido).expect("write entry");
    }
    zw.finish().expect("finish zip");
}
