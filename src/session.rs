use std::time::{Duration, Instant};

use flume::Sender;
use log::info;

use crate::command::{self, CanalError};
use crate::record::LogRecord;
use crate::series::SerieVentana;
use crate::stream_processor::{BufferLineas, OpcionesProceso};

/// Estado de una sesión con el periférico. Posee el búfer de reensamblado,
/// la ventana de la serie y el extremo de escritura del canal de comandos;
/// se construye una por conexión lógica y el hilo lector es su único dueño.
pub struct Sesion {
    conectada: bool,
    conectada_desde: Option<Instant>,
    buffer: BufferLineas,
    serie: SerieVentana,
    tx_comandos: Sender<String>,
}

impl Sesion {
    pub fn nueva(tx_comandos: Sender<String>) -> Self {
        Sesion {
            conectada: false,
            conectada_desde: None,
            buffer: BufferLineas::nuevo(),
            serie: SerieVentana::nueva(),
            tx_comandos,
        }
    }

    /// Nueva conexión: el búfer arranca vacío; la serie y el contador de
    /// mensajes sobreviven de la conexión anterior.
    pub fn conectar(&mut self) {
        self.buffer.descartar();
        self.conectada = true;
        self.conectada_desde = Some(Instant::now());
        info!("✅ Sesión conectada");
    }

    /// Fin de la conexión. Según la opción `vaciar_al_desconectar`, el
    /// remanente sale como último registro o se descarta sin emitirse.
    pub fn desconectar(&mut self, op: &OpcionesProceso) -> Option<LogRecord> {
        self.conectada = false;
        self.conectada_desde = None;
        if op.vaciar_al_desconectar {
            let registro = self.buffer.al_vencer_flush(op);
            if let Some(r) = &registro {
                self.serie.observar(&r.texto);
            }
            registro
        } else {
            self.buffer.descartar();
            None
        }
    }

    /// Fragmento crudo entregado por el transporte. Cada registro emitido
    /// actualiza la serie antes de devolverse, en orden de emisión.
    pub fn al_recibir_chunk(&mut self, chunk: &str, op: &OpcionesProceso) -> Vec<LogRecord> {
        let registros = self.buffer.al_recibir_chunk(chunk, op);
        for registro in &registros {
            self.serie.observar(&registro.texto);
        }
        registros
    }

    /// Venció el debounce del búfer.
    pub fn al_vencer_flush(&mut self, op: &OpcionesProceso) -> Option<LogRecord> {
        let registro = self.buffer.al_vencer_flush(op);
        if let Some(r) = &registro {
            self.serie.observar(&r.texto);
        }
        registro
    }

    /// Valida y envía un comando por el canal de salida. Con éxito devuelve
    /// el registro de eco `📤 [CMD] ...` para el sink; el envío es único,
    /// sin reintentos.
    pub fn enviar_comando(
        &self,
        comando: &str,
        op: &OpcionesProceso,
    ) -> Result<LogRecord, CanalError> {
        let limpio = command::validar(comando)?;
        if !self.conectada {
            return Err(CanalError::SinConexion);
        }
        self.tx_comandos
            .send(limpio.clone())
            .map_err(|_| CanalError::CanalCerrado)?;
        info!("📤 Comando enviado: {}", limpio);
        Ok(LogRecord::nuevo(
            format!("📤 [CMD] {}\n", limpio),
            op.incluir_timestamp,
        ))
    }

    pub fn proximo_vencimiento(&self) -> Option<Instant> {
        self.buffer.vencimiento()
    }

    pub fn conectada(&self) -> bool {
        self.conectada
    }

    /// Tiempo transcurrido desde la conexión, si la sesión está activa.
    pub fn tiempo_activo(&self) -> Option<Duration> {
        self.conectada_desde.map(|d| d.elapsed())
    }

    pub fn mensajes(&self) -> u64 {
        self.buffer.mensajes_emitidos()
    }

    pub fn serie(&self) -> &SerieVentana {
        &self.serie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::unbounded;

    fn opciones() -> OpcionesProceso {
        OpcionesProceso {
            passthrough_tokens: false,
            debounce: Duration::from_millis(500),
            max_pendiente_bytes: 8192,
            incluir_timestamp: false,
            vaciar_al_desconectar: false,
        }
    }

    fn sesion_conectada() -> (Sesion, flume::Receiver<String>) {
        let (tx, rx) = unbounded();
        let mut sesion = Sesion::nueva(tx);
        sesion.conectar();
        (sesion, rx)
    }

    #[test]
    fn la_serie_sobrevive_a_la_reconexion_y_el_buffer_no() {
        let op = opciones();
        let (mut sesion, _rx) = sesion_conectada();

        sesion.al_recibir_chunk("99 listo\n", &op);
        assert_eq!(sesion.serie().valores(), vec![99]);
        assert_eq!(sesion.mensajes(), 1);

        sesion.al_recibir_chunk("parcial", &op);
        assert!(sesion.desconectar(&op).is_none());
        sesion.conectar();

        // El remanente se perdió; la serie y el contador siguen.
        assert!(sesion.al_vencer_flush(&op).is_none());
        sesion.al_recibir_chunk("7 mas\n", &op);
        assert_eq!(sesion.serie().valores(), vec![99, 7]);
        assert_eq!(sesion.mensajes(), 2);
    }

    #[test]
    fn desconectar_puede_vaciar_el_remanente() {
        let op = OpcionesProceso {
            vaciar_al_desconectar: true,
            ..opciones()
        };
        let (mut sesion, _rx) = sesion_conectada();
        sesion.al_recibir_chunk("42 a medias", &op);
        let registro = sesion.desconectar(&op);
        assert_eq!(registro.map(|r| r.texto), Some("42 a medias".to_string()));
        assert_eq!(sesion.serie().valores(), vec![42]);
    }

    #[test]
    fn comando_vacio_se_rechaza_antes_del_canal() {
        let op = opciones();
        let (sesion, rx) = sesion_conectada();
        assert_eq!(
            sesion.enviar_comando("   ", &op),
            Err(CanalError::ComandoVacio)
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn comando_sin_conexion_se_rechaza() {
        let op = opciones();
        let (tx, rx) = unbounded();
        let sesion = Sesion::nueva(tx);
        assert_eq!(
            sesion.enviar_comando("W", &op),
            Err(CanalError::SinConexion)
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn comando_valido_llega_recortado_y_genera_eco() {
        let op = opciones();
        let (sesion, rx) = sesion_conectada();
        let eco = sesion.enviar_comando("  LED ON  ", &op);
        assert_eq!(rx.try_recv(), Ok("LED ON".to_string()));
        assert_eq!(eco.map(|r| r.texto), Ok("📤 [CMD] LED ON\n".to_string()));
    }

    #[test]
    fn canal_cerrado_se_reporta() {
        let op = opciones();
        let (sesion, rx) = sesion_conectada();
        drop(rx);
        assert_eq!(
            sesion.enviar_comando("W", &op),
            Err(CanalError::CanalCerrado)
        );
    }

    #[test]
    fn tiempo_activo_solo_con_conexion() {
        let (mut sesion, _rx) = sesion_conectada();
        assert!(sesion.tiempo_activo().is_some());
        sesion.desconectar(&opciones());
        assert!(sesion.tiempo_activo().is_none());
    }
}
