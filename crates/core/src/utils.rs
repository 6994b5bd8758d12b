/// Column title used for a category's count column, e.g.
/// "Envoi de devis" -> "Nombre_Envoi_de_devis"
pub fn count_column_label(category: &str) -> String {
    format!("Nombre_{}", category.replace(' ', "_"))
}

/// Turns a worksheet name into something usable as a file stem.
/// Path separators, reserved characters and whitespace become '_'.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        "worksheet".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_column_label() {
        assert_eq!(count_column_label("Envoi de devis"), "Nombre_Envoi_de_devis");
        assert_eq!(
            count_column_label("Message de rappel d'injoignabilité"),
            "Nombre_Message_de_rappel_d'injoignabilité"
        );
    }

    #[test]
    fn test_count_column_label_without_spaces() {
        assert_eq!(count_column_label("devis"), "Nombre_devis");
    }

    #[test]
    fn test_sanitize_filename_plain() {
        assert_eq!(sanitize_filename("message_de_suivis_devis"), "message_de_suivis_devis");
    }

    #[test]
    fn test_sanitize_filename_spaces_and_separators() {
        assert_eq!(sanitize_filename("  suivi devis/2024  "), "suivi_devis_2024");
        assert_eq!(sanitize_filename("a:b*c?d"), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_filename_empty_falls_back() {
        assert_eq!(sanitize_filename("   "), "worksheet");
    }
}
