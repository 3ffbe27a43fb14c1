use std::io::Read;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use flume::unbounded;

use monitor_hc05::config::{self, Config};
use monitor_hc05::session::Sesion;
use monitor_hc05::sink::ConsolaSink;
use monitor_hc05::stream_reader::{self, EventoStream};

fn main() -> Result<()> {
    config::init_logging();

    // Leer el argumento de línea de comandos (opcional)
    let args: Vec<String> = std::env::args().collect();
    let config_path = if args.len() > 1 {
        args[1].clone()
    } else {
        "config.toml".to_string()
    };

    log::info!("📄 Cargando configuración desde {}", config_path);
    let initial_config = Config::load_or_default(&config_path)?;
    let shared_config = Arc::new(parking_lot::RwLock::new(initial_config));
    shared_config.read().log_config();

    config::spawn_reload_thread(&config_path, shared_config.clone());

    let (tx_eventos, rx_eventos) = unbounded();
    let (tx_comandos, rx_comandos) = unbounded::<String>();

    // Transporte de salida sustituto: deja constancia de los comandos que
    // irían hacia el periférico.
    thread::spawn(move || {
        for comando in rx_comandos.iter() {
            log::info!("📡 Comando hacia el periférico: {}", comando);
        }
    });

    log::info!("✅ Inicializando reensamblado del stream...");
    let sesion = Sesion::nueva(tx_comandos);
    let lector = stream_reader::iniciar_lector(
        sesion,
        rx_eventos,
        Box::new(ConsolaSink::nuevo()),
        shared_config,
    );

    // Alimentador sustituto del transporte: stdin fragmentado tal cual llega.
    let mut stdin = std::io::stdin();
    let mut buffer = [0u8; 1024];
    loop {
        match stdin.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buffer[..n]).to_string();
                if tx_eventos.send(EventoStream::Datos(chunk)).is_err() {
                    break;
                }
            }
            Err(e) => {
                log::warn!("❌ Error leyendo la entrada: {}", e);
                break;
            }
        }
    }

    let _ = tx_eventos.send(EventoStream::Cierre);
    if let Ok(sesion) = lector.join() {
        log::info!(
            "📊 Sesión terminada: {} mensajes, {} puntos en la serie",
            sesion.mensajes(),
            sesion.serie().len()
        );
    }

    Ok(())
}
