use thiserror::Error;

/// Fallos del canal de comandos hacia el periférico. El comando nunca se
/// reintenta solo: el fallo se reporta y queda en manos del usuario.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanalError {
    #[error("comando vacío, nada que enviar")]
    ComandoVacio,
    #[error("no hay conexión activa")]
    SinConexion,
    #[error("el canal de comandos está cerrado")]
    CanalCerrado,
}

/// Recorta y valida un comando ANTES de que toque el canal: un comando vacío
/// o de puro espacio se rechaza acá.
pub fn validar(comando: &str) -> Result<String, CanalError> {
    let limpio = comando.trim();
    if limpio.is_empty() {
        return Err(CanalError::ComandoVacio);
    }
    Ok(limpio.to_string())
}
