use chrono::Local;

/// Severidad inferida del contenido de un registro, para que el renderizador
/// pueda colorearlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severidad {
    Error,
    Advertencia,
    Exito,
    Info,
    Ninguna,
}

impl Severidad {
    /// Escanea el texto buscando marcadores conocidos. La primera regla que
    /// coincide gana, en este orden fijo: error, advertencia, éxito, info.
    pub fn inferir(texto: &str) -> Self {
        if texto.contains("ERROR") || texto.contains("❌") {
            Severidad::Error
        } else if texto.contains("WARNING") || texto.contains("⚠️") {
            Severidad::Advertencia
        } else if texto.contains("SUCCESS") || texto.contains("✅") {
            Severidad::Exito
        } else if texto.contains("INFO") || texto.contains("ℹ️") || texto.contains("💡") {
            Severidad::Info
        } else {
            Severidad::Ninguna
        }
    }
}

/// Registro listo para mostrar. Inmutable una vez creado; el sink lo consume
/// exactamente una vez.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub texto: String,
    /// Marca de tiempo ISO-8601 local, si la configuración la pide.
    pub timestamp: Option<String>,
    pub severidad: Severidad,
}

impl LogRecord {
    pub fn nuevo(texto: String, con_timestamp: bool) -> Self {
        let severidad = Severidad::inferir(&texto);
        let timestamp = con_timestamp.then(|| Local::now().to_rfc3339());
        LogRecord {
            texto,
            timestamp,
            severidad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infiere_error_por_palabra_y_emoji() {
        assert_eq!(Severidad::inferir("ERROR: sensor"), Severidad::Error);
        assert_eq!(Severidad::inferir("❌ falló"), Severidad::Error);
    }

    #[test]
    fn infiere_advertencia_exito_e_info() {
        assert_eq!(Severidad::inferir("WARNING baja señal"), Severidad::Advertencia);
        assert_eq!(Severidad::inferir("⚠️ ojo"), Severidad::Advertencia);
        assert_eq!(Severidad::inferir("SUCCESS"), Severidad::Exito);
        assert_eq!(Severidad::inferir("✅ listo"), Severidad::Exito);
        assert_eq!(Severidad::inferir("INFO arranque"), Severidad::Info);
        assert_eq!(Severidad::inferir("💡 dato"), Severidad::Info);
    }

    #[test]
    fn error_gana_sobre_exito() {
        assert_eq!(Severidad::inferir("SUCCESS pero ERROR"), Severidad::Error);
    }

    #[test]
    fn sin_marcadores_es_ninguna() {
        assert_eq!(Severidad::inferir("123 ok"), Severidad::Ninguna);
    }

    #[test]
    fn timestamp_opcional() {
        let con = LogRecord::nuevo("x".to_string(), true);
        assert!(con.timestamp.is_some());
        let sin = LogRecord::nuevo("x".to_string(), false);
        assert!(sin.timestamp.is_none());
    }
}
