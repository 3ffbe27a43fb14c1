use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;

/// Capacidad fija de la ventana: los últimos 50 puntos recibidos.
pub const CAPACIDAD_VENTANA: usize = 50;

static RE_DIGITOS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Extrae la primera corrida de dígitos decimales del texto como entero.
/// Solo enteros, sin signo ni punto decimal; una corrida demasiado larga
/// para `i64` se trata como ausencia de número.
pub fn extraer_numero(texto: &str) -> Option<i64> {
    RE_DIGITOS.find(texto).and_then(|m| m.as_str().parse().ok())
}

/// Ventana deslizante de valores numéricos para el graficador. FIFO: al
/// exceder la capacidad se expulsa el valor más antiguo. Se crea vacía y
/// sobrevive a las reconexiones de la sesión.
#[derive(Debug, Default)]
pub struct SerieVentana {
    valores: VecDeque<i64>,
}

impl SerieVentana {
    pub fn nueva() -> Self {
        SerieVentana {
            valores: VecDeque::with_capacity(CAPACIDAD_VENTANA),
        }
    }

    /// Agrega un valor al final; expulsa el más antiguo si la ventana excede
    /// la capacidad. O(1) amortizado.
    pub fn empujar(&mut self, valor: i64) {
        self.valores.push_back(valor);
        if self.valores.len() > CAPACIDAD_VENTANA {
            self.valores.pop_front();
        }
    }

    /// Observa un registro emitido: si contiene un número, entra a la serie.
    /// Sin dígitos no es un error, simplemente no hay punto nuevo.
    pub fn observar(&mut self, texto: &str) {
        if let Some(valor) = extraer_numero(texto) {
            self.empujar(valor);
        }
    }

    /// Valores en orden de llegada, el más antiguo primero.
    pub fn valores(&self) -> Vec<i64> {
        self.valores.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.valores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valores.is_empty()
    }

    /// Puntos escalados a `[0, 1]` según el mínimo y máximo actuales de la
    /// ventana, como los espera el graficador. Con un solo valor repetido
    /// (mínimo == máximo) el rango cae a 1 para no dividir por cero. Ventana
    /// vacía devuelve un vector vacío: el estado "esperando datos".
    pub fn puntos_normalizados(&self) -> Vec<f64> {
        let Some(&max) = self.valores.iter().max() else {
            return Vec::new();
        };
        let min = *self.valores.iter().min().unwrap_or(&max);
        let rango = match max - min {
            0 => 1.0,
            r => r as f64,
        };
        self.valores
            .iter()
            .map(|&v| (v - min) as f64 / rango)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrae_primera_corrida_de_digitos() {
        assert_eq!(extraer_numero("123 ok"), Some(123));
        assert_eq!(extraer_numero("a12b34"), Some(12));
        assert_eq!(extraer_numero("sin numeros"), None);
    }

    #[test]
    fn corrida_gigante_se_descarta() {
        assert_eq!(extraer_numero("99999999999999999999999999"), None);
    }

    #[test]
    fn la_ventana_no_supera_la_capacidad() {
        let mut serie = SerieVentana::nueva();
        for i in 0..51 {
            serie.empujar(i);
        }
        assert_eq!(serie.len(), CAPACIDAD_VENTANA);
        let valores = serie.valores();
        assert_eq!(valores.first(), Some(&1));
        assert_eq!(valores.last(), Some(&50));
        assert_eq!(valores, (1..=50).collect::<Vec<i64>>());
    }

    #[test]
    fn observar_ignora_texto_sin_digitos() {
        let mut serie = SerieVentana::nueva();
        serie.observar("hola");
        assert!(serie.is_empty());
        serie.observar("temp 21");
        assert_eq!(serie.valores(), vec![21]);
    }

    #[test]
    fn normalizados_escala_a_cero_uno() {
        let mut serie = SerieVentana::nueva();
        serie.empujar(10);
        serie.empujar(20);
        serie.empujar(30);
        assert_eq!(serie.puntos_normalizados(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn normalizados_con_rango_degenerado() {
        let mut serie = SerieVentana::nueva();
        serie.empujar(7);
        serie.empujar(7);
        assert_eq!(serie.puntos_normalizados(), vec![0.0, 0.0]);
    }

    #[test]
    fn normalizados_vacia_es_esperando_datos() {
        assert!(SerieVentana::nueva().puntos_normalizados().is_empty());
    }
}
