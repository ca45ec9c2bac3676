/// Errors that can occur when naming a channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// A name component was empty.
    #[error("channel {component} must not be empty")]
    EmptyComponent { component: &'static str },

    /// A name component contains a character that would break the dotted form.
    #[error("invalid character {ch:?} in channel {component} {value:?}")]
    InvalidCharacter {
        component: &'static str,
        value: String,
        ch: char,
    },
}

pub type Result<T> = std::result::Result<T, ChannelError>;
