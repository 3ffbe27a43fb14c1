use std::{fs, io::Write, path::Path, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use log::info;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::stream_processor::OpcionesProceso;

/// Configuración del monitor. Las opciones se leen al procesar cada evento,
/// no al conectar, así un cambio recargado aplica de inmediato.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Conservar los marcadores `<EN>`/`<BK>` en vez de sustituirlos.
    #[serde(default)]
    pub passthrough_tokens: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Tope duro del remanente: al alcanzarlo se fuerza una emisión sin
    /// esperar al debounce.
    #[serde(default = "default_max_pendiente_bytes")]
    pub max_pendiente_bytes: usize,
    #[serde(default = "default_incluir_timestamp")]
    pub incluir_timestamp: bool,
    /// Vaciar el remanente como último registro al desconectar, en vez de
    /// descartarlo.
    #[serde(default)]
    pub vaciar_al_desconectar: bool,
    #[serde(default = "default_recargar_configuracion")]
    pub recargar_configuracion: bool,
}

fn default_debounce_ms() -> u64 {
    500
}
fn default_max_pendiente_bytes() -> usize {
    8192
}
fn default_incluir_timestamp() -> bool {
    true
}
fn default_recargar_configuracion() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            passthrough_tokens: false,
            debounce_ms: default_debounce_ms(),
            max_pendiente_bytes: default_max_pendiente_bytes(),
            incluir_timestamp: default_incluir_timestamp(),
            vaciar_al_desconectar: false,
            recargar_configuracion: default_recargar_configuracion(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Error leyendo archivo de configuración {}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Error parseando archivo TOML con serde")?;
        Ok(config)
    }

    /// Carga el archivo si existe; sin archivo se usan los valores por
    /// defecto (el monitor funciona sin configuración alguna).
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            info!("📄 Sin archivo {}, usando configuración por defecto", path);
            Ok(Config::default())
        }
    }

    /// Instantánea de las opciones que consume el procesador.
    pub fn opciones_proceso(&self) -> OpcionesProceso {
        OpcionesProceso {
            passthrough_tokens: self.passthrough_tokens,
            debounce: Duration::from_millis(self.debounce_ms),
            max_pendiente_bytes: self.max_pendiente_bytes,
            incluir_timestamp: self.incluir_timestamp,
            vaciar_al_desconectar: self.vaciar_al_desconectar,
        }
    }

    pub fn log_config(&self) {
        info!("📦 Configuración cargada:");
        info!("  Passthrough tokens    : {}", self.passthrough_tokens);
        info!("  Debounce (ms)         : {}", self.debounce_ms);
        info!("  Tope pendiente (bytes): {}", self.max_pendiente_bytes);
        info!("  Incluir timestamp     : {}", self.incluir_timestamp);
        info!("  Vaciar al desconectar : {}", self.vaciar_al_desconectar);
        info!("  Recarga configuración : {}", self.recargar_configuracion);
    }
}

pub fn init_logging() {
    use env_logger::Builder;
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();
}

/// Relee el archivo cada 5 segundos y publica la configuración nueva cuando
/// cambia, mientras `recargar_configuracion` siga activa.
pub fn spawn_reload_thread(path: &str, shared: Arc<RwLock<Config>>) {
    let path = path.to_string();

    thread::spawn(move || {
        let mut ultima_config = shared.read().clone();

        if !ultima_config.recargar_configuracion {
            log::info!("📴 Recarga de configuración desactivada por archivo de configuración");
            return;
        }

        loop {
            thread::sleep(Duration::from_secs(5));
            match Config::load_from_file(&path) {
                Ok(nueva_config) => {
                    if !nueva_config.recargar_configuracion {
                        log::info!("📴 Recarga de configuración desactivada dinámicamente");
                        break;
                    }

                    if nueva_config != ultima_config {
                        *shared.write() = nueva_config.clone();
                        log::info!("🔄 Configuración recargada desde {}", path);
                        nueva_config.log_config();
                        ultima_config = nueva_config;
                    }
                }
                Err(e) => {
                    log::warn!("⚠️ Error recargando configuración: {}", e);
                }
            }
        }
    });
}
