/// Minúsculas, sin bordes y con los huecos internos reducidos a un espacio.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Igualdad exacta tras normalizar; no hay coincidencia aproximada.
pub fn is_correct(answer: &str, expected: &str) -> bool {
    normalize(answer) == normalize(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_whitespace_are_ignored() {
        assert!(is_correct(" Tanmirt ", "Tanmirt"));
        assert!(is_correct("tanmirt", "Tanmirt"));
        assert!(is_correct("azul   fellak\t", "Azul fellak"));
        assert!(!is_correct("tanmirt!", "Tanmirt"));
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["", "  ", " A  b\nC ", "ⴰⵣⵓⵍ  ⴼⵍⵍⴰⴽ", "ÀÉÏ  òú", "مرحبا   بك"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn empty_answer_is_just_wrong() {
        assert_eq!(normalize("   "), "");
        assert!(!is_correct("", "Tanmirt"));
    }
}
