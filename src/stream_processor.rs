use std::time::{Duration, Instant};

use crate::record::LogRecord;
use crate::tokens;

/// Opciones que el procesamiento lee en el momento de atender cada evento,
/// no al conectar. Instantánea tomada de la configuración compartida.
#[derive(Debug, Clone, Copy)]
pub struct OpcionesProceso {
    pub passthrough_tokens: bool,
    pub debounce: Duration,
    pub max_pendiente_bytes: usize,
    pub incluir_timestamp: bool,
    pub vaciar_al_desconectar: bool,
}

/// Ensambla líneas completas a partir de fragmentos arbitrarios del stream.
///
/// Mantiene un remanente (`pendiente`) con los bytes que todavía no forman
/// una línea y a lo sumo UN vencimiento de vaciado armado: cada fragmento
/// entrante cancela el anterior y arma uno nuevo, así el remanente de un
/// stream que se queda en silencio llega al sink dentro del intervalo de
/// debounce.
#[derive(Debug)]
pub struct BufferLineas {
    pendiente: String,
    vencimiento: Option<Instant>,
    mensajes: u64,
}

impl BufferLineas {
    pub fn nuevo() -> Self {
        BufferLineas {
            pendiente: String::new(),
            vencimiento: None,
            mensajes: 0,
        }
    }

    /// Atiende un fragmento crudo.
    ///
    /// Las líneas completas acumuladas se filtran (las vacías o de puro
    /// espacio se descartan) y se emiten como UN solo registro combinado con
    /// salto de línea final; el último segmento del split queda como nuevo
    /// remanente. El contador avanza una vez por registro, no por línea
    /// fuente. El vencimiento se rearma siempre, haya emisión o no.
    ///
    /// Devuelve a lo sumo dos registros: el combinado de líneas completas y,
    /// solo si el remanente alcanzó `max_pendiente_bytes`, un vaciado forzado
    /// que no espera al vencimiento.
    pub fn al_recibir_chunk(&mut self, chunk: &str, op: &OpcionesProceso) -> Vec<LogRecord> {
        self.pendiente.push_str(chunk);
        self.vencimiento = None;

        let mut emitidos = Vec::new();

        if self.pendiente.contains('\n') {
            let acumulado = std::mem::take(&mut self.pendiente);
            let mut segmentos: Vec<&str> = acumulado.split('\n').collect();
            // El último segmento puede ser parcial (o vacío) y vuelve al
            // remanente; todos los anteriores son líneas completas.
            let resto = segmentos.pop().unwrap_or("");
            self.pendiente = resto.to_string();

            let combinado = segmentos
                .iter()
                .filter(|s| !s.trim().is_empty())
                .copied()
                .collect::<Vec<&str>>()
                .join("\n");

            if !combinado.is_empty() {
                let texto = tokens::normalizar(&combinado, op.passthrough_tokens);
                emitidos.push(self.emitir(format!("{}\n", texto), op));
            }
        }

        // Tope duro: un stream sin saltos de línea que sigue mandando datos
        // rearma el vencimiento una y otra vez; el remanente no puede crecer
        // sin límite entre rearmes.
        if self.pendiente.len() >= op.max_pendiente_bytes {
            if let Some(registro) = self.vaciar(op) {
                emitidos.push(registro);
            }
        }

        self.vencimiento = Some(Instant::now() + op.debounce);
        emitidos
    }

    /// Venció el debounce sin fragmentos nuevos: el remanente, si existe, se
    /// emite sin salto de línea final y el buffer queda vacío. Con remanente
    /// vacío no pasa nada. El vencimiento queda desarmado en ambos casos.
    pub fn al_vencer_flush(&mut self, op: &OpcionesProceso) -> Option<LogRecord> {
        self.vencimiento = None;
        self.vaciar(op)
    }

    fn vaciar(&mut self, op: &OpcionesProceso) -> Option<LogRecord> {
        if self.pendiente.is_empty() {
            return None;
        }
        let crudo = std::mem::take(&mut self.pendiente);
        let texto = tokens::normalizar(&crudo, op.passthrough_tokens);
        Some(self.emitir(texto, op))
    }

    fn emitir(&mut self, texto: String, op: &OpcionesProceso) -> LogRecord {
        self.mensajes += 1;
        LogRecord::nuevo(texto, op.incluir_timestamp)
    }

    /// Descarta el remanente sin emitirlo y desarma el vencimiento. El
    /// contador de mensajes se conserva.
    pub fn descartar(&mut self) {
        self.pendiente.clear();
        self.vencimiento = None;
    }

    /// Instante del próximo vaciado armado, si lo hay. Nunca existe más de
    /// uno: rearmar es sobrescribir este campo.
    pub fn vencimiento(&self) -> Option<Instant> {
        self.vencimiento
    }

    pub fn pendiente(&self) -> &str {
        &self.pendiente
    }

    pub fn mensajes_emitidos(&self) -> u64 {
        self.mensajes
    }
}

impl Default for BufferLineas {
    fn default() -> Self {
        Self::nuevo()
    }
}
