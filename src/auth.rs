//! Acceso con clave compartida.
//!
//! No hay usuarios: quien conoce la clave ve el tablero. El estado se pasa
//! explícitamente como `Sesion` a cada cálculo en lugar de vivir en una
//! variable global.

use crate::error::{Result, TareasError};

/// Cabecera HTTP donde el cliente envía la clave.
pub const CABECERA_CLAVE: &str = "x-clave-acceso";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sesion {
    pub autenticada: bool,
}

impl Sesion {
    pub fn anonima() -> Sesion {
        Sesion { autenticada: false }
    }

    /// Compara la clave provista con la configurada. Una clave ausente
    /// deja la sesión sin autenticar.
    pub fn verificar(clave_configurada: &str, provista: Option<&str>) -> Sesion {
        let autenticada = provista.is_some_and(|p| p == clave_configurada);
        Sesion { autenticada }
    }

    pub fn exigir(&self) -> Result<()> {
        if self.autenticada {
            Ok(())
        } else {
            Err(TareasError::AccesoDenegado)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clave_correcta_autentica() {
        let s = Sesion::verificar("clave_2026", Some("clave_2026"));
        assert!(s.autenticada);
        assert!(s.exigir().is_ok());
    }

    #[test]
    fn clave_incorrecta_o_ausente_deniega() {
        for provista in [Some("otra"), Some(""), Some("clave_2026 "), None] {
            let s = Sesion::verificar("clave_2026", provista);
            assert!(!s.autenticada);
            assert!(matches!(s.exigir(), Err(TareasError::AccesoDenegado)));
        }
        assert!(Sesion::anonima().exigir().is_err());
    }
}
