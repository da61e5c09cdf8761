//! Canned payloads for upload tests.

use bytes::Bytes;

/// Eight-byte PNG signature followed by filler, sized to `len`.
///
/// Not a decodable image — just realistic-looking binary for transfer tests.
#[must_use]
pub fn png_fixture(len: usize) -> Bytes {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
    let mut data = Vec::with_capacity(len.max(SIGNATURE.len()));
    data.extend_from_slice(&SIGNATURE);
    data.resize(len.max(SIGNATURE.len()), 0xAB);
    Bytes::from(data)
}

/// MP3 frame-sync bytes followed by filler, sized to `len`.
#[must_use]
pub fn mp3_fixture(len: usize) -> Bytes {
    const SYNC: [u8; 2] = [0xFF, 0xFB];
    let mut data = Vec::with_capacity(len.max(SYNC.len()));
    data.extend_from_slice(&SYNC);
    data.resize(len.max(SYNC.len()), 0xCD);
    Bytes::from(data)
}
