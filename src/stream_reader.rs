use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use flume::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};
use parking_lot::RwLock;

use crate::config::Config;
use crate::record::LogRecord;
use crate::session::Sesion;
use crate::sink::RecordSink;
use crate::stream_utils::sanitizar_para_log;

/// Eventos que el exterior entrega al núcleo. El transporte ya decodificó
/// los bytes: acá solo llega texto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventoStream {
    /// Fragmento de texto de longitud arbitraria, sin alineación a líneas.
    Datos(String),
    /// Comando del usuario hacia el periférico.
    Comando(String),
    /// El transporte cerró la conexión.
    Cierre,
}

/// Lanza el hilo que posee la sesión y serializa todo el trabajo del núcleo:
/// fragmentos, comandos y vencimientos de flush pasan por un único dueño,
/// así `al_recibir_chunk` y `al_vencer_flush` jamás se entrelazan.
///
/// La espera usa el vencimiento armado del búfer como plazo de `recv`, de
/// modo que el debounce expira exactamente cuando no llegan eventos nuevos
/// y rearmarlo es solo sobrescribir el plazo.
pub fn iniciar_lector(
    mut sesion: Sesion,
    rx_eventos: Receiver<EventoStream>,
    mut sink: Box<dyn RecordSink>,
    config: Arc<RwLock<Config>>,
) -> JoinHandle<Sesion> {
    thread::spawn(move || {
        info!("🟡 Hilo lector iniciado. Esperando datos del periférico...");
        sesion.conectar();

        let mut cola: VecDeque<EventoStream> = VecDeque::new();

        loop {
            let op = config.read().opciones_proceso();

            if cola.is_empty() {
                let evento = match sesion.proximo_vencimiento() {
                    Some(vencimiento) => match rx_eventos.recv_deadline(vencimiento) {
                        Ok(evento) => evento,
                        Err(RecvTimeoutError::Timeout) => {
                            if let Some(registro) = sesion.al_vencer_flush(&op) {
                                debug!(
                                    "⏱️ Vaciado por debounce: {}",
                                    sanitizar_para_log(&registro.texto)
                                );
                                sink.aceptar(registro);
                            }
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => EventoStream::Cierre,
                    },
                    None => match rx_eventos.recv() {
                        Ok(evento) => evento,
                        Err(_) => EventoStream::Cierre,
                    },
                };
                cola.push_back(evento);
                // Traer también todo lo ya encolado, para ver la ráfaga entera.
                while let Ok(evento) = rx_eventos.try_recv() {
                    cola.push_back(evento);
                }
            }

            let Some(evento) = cola.pop_front() else {
                continue;
            };

            match evento {
                EventoStream::Datos(mut chunk) => {
                    // Fragmentos consecutivos de la misma ráfaga se procesan
                    // como una sola llegada: las líneas simultáneas salen
                    // coalescidas en un único registro.
                    while matches!(cola.front(), Some(EventoStream::Datos(_))) {
                        if let Some(EventoStream::Datos(mas)) = cola.pop_front() {
                            chunk.push_str(&mas);
                        }
                    }
                    debug!("📥 Fragmento recibido: {}", sanitizar_para_log(&chunk));
                    for registro in sesion.al_recibir_chunk(&chunk, &op) {
                        info!("✅ Registro emitido: {}", sanitizar_para_log(&registro.texto));
                        sink.aceptar(registro);
                    }
                }
                EventoStream::Comando(comando) => match sesion.enviar_comando(&comando, &op) {
                    Ok(eco) => sink.aceptar(eco),
                    Err(e) => {
                        warn!("⚠️ Comando rechazado: {}", e);
                        sink.aceptar(LogRecord::nuevo(
                            format!("⚠️ {}\n", e),
                            op.incluir_timestamp,
                        ));
                    }
                },
                EventoStream::Cierre => {
                    if let Some(registro) = sesion.desconectar(&op) {
                        info!(
                            "🧹 Remanente vaciado al desconectar: {}",
                            sanitizar_para_log(&registro.texto)
                        );
                        sink.aceptar(registro);
                    }
                    sink.aceptar(LogRecord::nuevo(
                        "⚠️ Lectura finalizada\n".to_string(),
                        op.incluir_timestamp,
                    ));
                    info!("🔌 Sesión desconectada");
                    break;
                }
            }
        }

        sesion
    })
}
