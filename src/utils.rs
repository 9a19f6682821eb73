// src/utils.rs
use crate::config::ClientConfig;
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// Build a site URL with the configured prefix (deployments under a sub-path).
pub fn resource_url(site_prefix: &str, path: &str) -> String {
    let base = site_prefix.trim_end_matches('/');
    let clean_path = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{}", clean_path)
    } else {
        format!("{}/{}", base, clean_path)
    }
}

/// Replace `{name}` placeholders with percent-encoded values.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |url, (name, value)| {
        url.replace(&format!("{{{}}}", name), &urlencoding::encode(value))
    })
}

pub fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// CSRF token for write requests: configured value first, then the `csrftoken` cookie.
pub fn csrf_token(config: &ClientConfig) -> Option<String> {
    if let Some(token) = &config.csrf_token {
        return Some(token.clone());
    }
    let cookies = gloo_utils::document()
        .dyn_into::<HtmlDocument>()
        .ok()?
        .cookie()
        .ok()?;
    cookie_value(&cookies, "csrftoken").map(str::to_string)
}
