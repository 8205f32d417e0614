//! Image recognition and embedding

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Extensions recognized as images
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

fn extension(name: &str) -> Option<String> {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether an entry name carries a recognized image extension
pub fn is_image(name: &str) -> bool {
    extension(name)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// MIME type for an image entry; unknown extensions are treated as JPEG
pub fn image_mime(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Self-contained `data:` URI for an image
pub fn data_uri(name: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", image_mime(name), BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image() {
        assert!(is_image("OEBPS/images/cover.JPG"));
        assert!(is_image("page.webp"));
        assert!(!is_image("styles/main.css"));
        assert!(!is_image("images.d/README"));
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("a.jpeg"), "image/jpeg");
        assert_eq!(image_mime("a.PNG"), "image/png");
        assert_eq!(image_mime("a.gif"), "image/gif");
        assert_eq!(image_mime("a.webp"), "image/webp");
        assert_eq!(image_mime("a.bmp"), "image/jpeg");
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri("x.png", b"abc"), "data:image/png;base64,YWJj");
    }
}
