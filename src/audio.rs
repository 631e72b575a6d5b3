use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

pub const DEFAULT_MIME: &str = "audio/mpeg";

/// Where the page's audio element gets its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// The whole file, base64-encoded into a data URI.
    Embedded { mime: String, payload: String },
    /// A path written into the page verbatim.
    Linked(String),
}

impl AudioSource {
    pub fn embed(bytes: &[u8], mime: &str) -> Self {
        AudioSource::Embedded {
            mime: mime.to_string(),
            payload: BASE64_STANDARD.encode(bytes),
        }
    }

    pub fn link<S: Into<String>>(path: S) -> Self {
        AudioSource::Linked(path.into())
    }

    /// Value for the `src` attribute.
    pub fn src(&self) -> String {
        match self {
            AudioSource::Embedded { mime, payload } => format!("data:{};base64,{}", mime, payload),
            AudioSource::Linked(path) => path.clone(),
        }
    }

    /// Value for the `type` attribute.
    pub fn mime(&self) -> &str {
        match self {
            AudioSource::Embedded { mime, .. } => mime,
            AudioSource::Linked(_) => DEFAULT_MIME,
        }
    }

    /// Decodes a `data:<mime>;base64,<payload>` URI back into its bytes.
    #[cfg(test)]
    pub fn from_data_uri(uri: &str) -> Option<Vec<u8>> {
        let rest = uri.strip_prefix("data:")?;
        let (_, payload) = rest.split_once(";base64,")?;
        BASE64_STANDARD.decode(payload).ok()
    }
}
