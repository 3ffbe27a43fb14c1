/// Convierte un fragmento de texto en una representación imprimible para los
/// logs, con los caracteres de control escapados para no romper la salida de
/// journald. El carácter DEL se ignora por completo.
pub fn sanitizar_para_log(texto: &str) -> String {
    texto
        .chars()
        .filter_map(|c| match c {
            '\u{7F}' => None,
            '\r' => Some("\\r".to_string()),
            '\n' => Some("\\n".to_string()),
            c if c.is_control() => Some(format!("\\x{:02X}", c as u32)),
            c => Some(c.to_string()),
        })
        .collect()
}
