/// Resolve an image location against the radar service base.
///
/// The service hands out paths such as `/api/radar/{suburb}/{state}/frame/3`,
/// which only make sense relative to the service origin. Absolute
/// `http://` / `https://` locations and empty strings pass through untouched.
pub fn resolve_image_url(url: &str, service_url: &str) -> String {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    // exactly one trailing slash
    let base_url = service_url.strip_suffix('/').unwrap_or(service_url);

    if url.starts_with('/') {
        format!("{}{}", base_url, url)
    } else {
        format!("{}/{}", base_url, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_pass_through() {
        for base in ["http://svc", "https://other/", ""] {
            assert_eq!(resolve_image_url("http://x/y", base), "http://x/y");
            assert_eq!(resolve_image_url("https://cdn/a.png", base), "https://cdn/a.png");
        }
    }

    #[test]
    fn leading_slash_strips_base_trailing_slash_once() {
        assert_eq!(resolve_image_url("/a/b", "http://svc/"), "http://svc/a/b");
        assert_eq!(resolve_image_url("/a/b", "http://svc//"), "http://svc//a/b");
    }

    #[test]
    fn bare_path_gets_one_separator() {
        assert_eq!(resolve_image_url("a/b", "http://svc"), "http://svc/a/b");
        assert_eq!(resolve_image_url("a/b", "http://svc/"), "http://svc/a/b");
    }

    #[test]
    fn empty_path_is_left_alone() {
        assert_eq!(resolve_image_url("", "http://svc"), "");
    }
}
