/// Marcador en banda de salto de línea que emite el periférico.
pub const TOKEN_ENTER: &str = "<EN>";
/// Marcador en banda de retroceso (tecla de borrado).
pub const TOKEN_BACKSPACE: &str = "<BK>";

/// Reescribe los marcadores del protocolo dentro de un texto.
///
/// Con `passthrough` activo el texto se devuelve intacto, con los marcadores
/// visibles para inspección. Si no, cada `<EN>` pasa a ser un salto de línea
/// y cada `<BK>` se elimina. Los dos reemplazos no se solapan, así que el
/// orden entre ellos no importa.
pub fn normalizar(texto: &str, passthrough: bool) -> String {
    if passthrough {
        return texto.to_string();
    }
    texto.replace(TOKEN_ENTER, "\n").replace(TOKEN_BACKSPACE, "")
}
