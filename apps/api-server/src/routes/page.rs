use axum::{
    http::{header::USER_AGENT, HeaderMap},
    response::Html,
};

const INDEX_TEMPLATE: &str = include_str!("index.html");
const CAPTURE_PLACEHOLDER: &str = "{{capture}}";

const MOBILE_MARKERS: &[&str] = &[
    "Android",
    "iPhone",
    "iPad",
    "iPod",
    "Mobile",
    "webOS",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

/// Mobile browsers get the rear camera as the input source, everyone else
/// gets a file picker plus the webcam snapshot button.
pub async fn index(headers: HeaderMap) -> Html<String> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Html(render_index(is_mobile(user_agent)))
}

pub fn is_mobile(user_agent: &str) -> bool {
    MOBILE_MARKERS
        .iter()
        .any(|marker| user_agent.contains(marker))
}

fn render_index(mobile: bool) -> String {
    let capture = if mobile {
        r#"capture="environment""#
    } else {
        ""
    };
    INDEX_TEMPLATE.replace(CAPTURE_PLACEHOLDER, capture)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_mobile() {
        assert!(is_mobile(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15"
        ));
        assert!(is_mobile(
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Mobile Safari/537.36"
        ));
        assert!(!is_mobile(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/126.0 Safari/537.36"
        ));
        assert!(!is_mobile(""));
    }

    #[test]
    fn test_render_index() {
        let page = render_index(true);
        assert!(page.contains(r#"capture="environment""#));
        assert!(!page.contains(CAPTURE_PLACEHOLDER));

        let page = render_index(false);
        assert!(!page.contains("capture="));
        assert!(page.contains("Image Captioning Feed"));
    }
}
