//! Relayed payloads
//!
//! The relay never looks inside a message. Text stays text and binary stays
//! binary so transports can re-emit exactly what they received. Both variants
//! are reference-counted buffers: a clone per recipient copies no bytes, and
//! they convert into WebSocket frames as-is.

use bytes::Bytes;
use tokio_tungstenite::tungstenite::Utf8Bytes;

/// Opaque message body, shared between all recipients of one broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(Utf8Bytes),
    Binary(Bytes),
}

impl Payload {
    /// Wraps raw bytes, as text when they are valid UTF-8
    pub fn from_bytes(data: Bytes) -> Self {
        match Utf8Bytes::try_from(data.clone()) {
            Ok(text) => Payload::Text(text),
            Err(_) => Payload::Binary(data),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(data) => &data[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text.as_str()),
            Payload::Binary(_) => None,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(Utf8Bytes::from(text))
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(Utf8Bytes::from(text))
    }
}

impl From<Utf8Bytes> for Payload {
    fn from(text: Utf8Bytes) -> Self {
        Payload::Text(text)
    }
}

impl From<&[u8]> for Payload {
    fn from(data: &[u8]) -> Self {
        Payload::Binary(Bytes::copy_from_slice(data))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::Binary(Bytes::from(data))
    }
}

impl From<Bytes> for Payload {
    fn from(data: Bytes) -> Self {
        Payload::Binary(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_buffer() {
        let text = Payload::from("hello".to_string());
        assert_eq!(text.as_bytes().as_ptr(), text.clone().as_bytes().as_ptr());

        let binary = Payload::from(vec![1u8, 2, 3]);
        assert_eq!(binary.as_bytes().as_ptr(), binary.clone().as_bytes().as_ptr());
    }

    #[test]
    fn text_and_binary_keep_their_kind() {
        let text = Payload::from("héllo");
        assert_eq!(text.as_text(), Some("héllo"));
        assert_eq!(text.len(), "héllo".len());

        let binary = Payload::from(vec![0u8, 159, 255]);
        assert_eq!(binary.as_text(), None);
        assert_eq!(binary.as_bytes(), &[0, 159, 255]);
        assert!(!binary.is_empty());
    }

    #[test]
    fn raw_bytes_become_text_only_when_utf8() {
        let text = Payload::from_bytes(Bytes::from_static(b"plain"));
        assert_eq!(text, Payload::from("plain"));

        let binary = Payload::from_bytes(Bytes::from_static(&[0xff, 0x00]));
        assert_eq!(binary, Payload::from(vec![0xffu8, 0x00]));
    }
}
