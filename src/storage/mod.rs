// Storage layer: folders under the storage root and public URLs for them

pub mod local;

pub use local::*;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::UploadConfig;

/// Characters left alone by RFC 3986 path-segment encoding.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build `<base url><asset root>/<folder>/<filename>` with both path
/// segments percent-encoded.
pub fn public_url(config: &UploadConfig, folder: &str, filename: &str) -> String {
    format!(
        "{}{}/{}/{}",
        config.base_url.trim_end_matches('/'),
        config.asset_root_web,
        utf8_percent_encode(folder, PATH_SEGMENT),
        utf8_percent_encode(filename, PATH_SEGMENT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let mut config = UploadConfig::new("/srv/ezassets", "t");
        config.base_url = "https://file.example.com/".to_string();

        assert_eq!(
            public_url(&config, "team-a", "0123456789abcdef.png"),
            "https://file.example.com/ezassets/team-a/0123456789abcdef.png"
        );
    }

    #[test]
    fn test_public_url_encodes_segments() {
        let config = UploadConfig::new("/srv/ezassets", "t");
        assert_eq!(
            public_url(&config, "a b", "c/d~e.png"),
            "http://localhost:3000/ezassets/a%20b/c%2Fd~e.png"
        );
    }
}
