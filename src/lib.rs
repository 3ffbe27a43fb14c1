//! Núcleo del monitor HC-05: recibe fragmentos de texto arbitrarios desde un
//! transporte serial/Bluetooth externo, los reensambla en registros de log
//! con marca de tiempo y severidad, y mantiene una serie numérica acotada
//! para el graficador.
//!
//! El transporte físico (abrir/cerrar el puerto) y el renderizado quedan
//! fuera: el núcleo consume eventos [`stream_reader::EventoStream`] y entrega
//! registros a un [`sink::RecordSink`].

pub mod command;
pub mod config;
pub mod record;
pub mod series;
pub mod session;
pub mod sink;
pub mod stream_processor;
pub mod stream_reader;
pub mod stream_utils;
pub mod tokens;
