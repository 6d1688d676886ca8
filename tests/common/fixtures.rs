//! Image and catalog fixtures

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// PNG signature followed by the start of an IHDR chunk
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

/// Minimal JPEG with an Exif IFD holding only an ISO value
pub fn jpeg_with_iso(iso: u16) -> Vec<u8> {
    let [lo, hi] = iso.to_le_bytes();
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x34];
    bytes.extend_from_slice(b"Exif\0\0");
    bytes.extend_from_slice(&[b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
    // IFD0 → Exif IFD at 26
    bytes.extend_from_slice(&[
        0x01, 0x00, 0x69, 0x87, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x1A, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00,
    ]);
    // Exif IFD: PhotographicSensitivity
    bytes.extend_from_slice(&[
        0x01, 0x00, 0x27, 0x88, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, lo, hi, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00,
    ]);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

/// One catalog entry
pub struct Entry<'a> {
    pub name: &'a str,
    pub hash: &'a str,
    pub size: usize,
}

/// S3-style listing of `entries`
pub fn listing(entries: &[Entry<'_>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>test-bucket</Name>
  <IsTruncated>false</IsTruncated>
"#,
    );
    for entry in entries {
        xml.push_str(&format!(
            "  <Contents>\n    <Key>{}</Key>\n    <LastModified>2016-11-01T17:15:41.000Z</LastModified>\n    <ETag>&quot;{}&quot;</ETag>\n    <Size>{}</Size>\n    <StorageClass>STANDARD</StorageClass>\n  </Contents>\n",
            entry.name, entry.hash, entry.size
        ));
    }
    xml.push_str("</ListBucketResult>");
    xml
}

/// Mount the catalog at `/catalog`
pub async fn mount_catalog(server: &MockServer, entries: &[Entry<'_>]) {
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(entries)))
        .mount(server)
        .await;
}

/// Mount a blob under `/blobs/{name}`, expecting it to be requested `times` times
pub async fn mount_blob(server: &MockServer, name: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/blobs/{}", name)))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}
