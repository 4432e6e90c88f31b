/// `true` si la URL empieza por un esquema (`https://`, `data:`, ...).
fn has_absolute_scheme(url: &str) -> bool {
    if url.starts_with("data:") || url.starts_with("blob:") {
        return true;
    }
    match url.find("://") {
        Some(idx) if idx > 0 => {
            let scheme = &url[..idx];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Resuelve una URL de medio guardada: las absolutas (p.ej. un CDN) se
/// devuelven tal cual, las relativas se cuelgan de la URL base del API.
pub fn resolve_media_url(base: &str, url: Option<&str>) -> String {
    let url = match url.map(str::trim) {
        Some(u) if !u.is_empty() => u,
        _ => return String::new(),
    };
    if has_absolute_scheme(url) {
        return url.to_string();
    }
    let base = base.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_media_url;

    #[test]
    fn absolute_urls_are_untouched() {
        assert_eq!(
            resolve_media_url("http://api.local", Some("https://cdn.example/a.mp3")),
            "https://cdn.example/a.mp3"
        );
        assert_eq!(
            resolve_media_url("http://api.local", Some("blob:http://x/123")),
            "blob:http://x/123"
        );
    }

    #[test]
    fn relative_urls_get_the_base() {
        assert_eq!(
            resolve_media_url("http://api.local", Some("/media/a.mp3")),
            "http://api.local/media/a.mp3"
        );
        assert_eq!(
            resolve_media_url("http://api.local/", Some("media/a.mp3")),
            "http://api.local/media/a.mp3"
        );
        // "://" más adelante en la ruta no es un esquema
        assert_eq!(
            resolve_media_url("http://api.local", Some("/proxy?u=http://x")),
            "http://api.local/proxy?u=http://x"
        );
    }

    #[test]
    fn missing_urls_resolve_to_empty() {
        assert_eq!(resolve_media_url("http://api.local", None), "");
        assert_eq!(resolve_media_url("http://api.local", Some("  ")), "");
    }
}
