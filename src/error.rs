//! Error type shared by every stage of the sticker pipeline.

/// Errors produced while composing or re-encoding a sticker.
///
/// A size-budget miss is not an error: the negotiation loop always
/// returns its best-effort buffer instead of failing the request.
#[derive(Debug, thiserror::Error)]
pub enum StickerError {
    #[error("failed to decode input image: {0}")]
    Decode(String),

    #[error("invalid parameter for effect '{effect}': {reason}")]
    InvalidEffectParameter {
        effect: &'static str,
        reason: String,
    },

    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    #[error("unknown frame: {0}")]
    UnknownFrame(String),

    #[error("unknown text position: {0}")]
    UnknownTextPosition(String),

    #[error("text is {len} characters long (max: {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("failed to encode sticker: {0}")]
    Encoding(String),

    #[error("failed to render overlay: {0}")]
    Render(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("sticker task failed: {0}")]
    Task(String),
}

impl StickerError {
    pub(crate) fn invalid_param(effect: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEffectParameter {
            effect,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StickerError>;
