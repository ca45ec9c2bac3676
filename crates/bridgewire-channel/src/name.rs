use crate::error::{ChannelError, Result};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "dev.bridgewire";

/// Build the fully-qualified channel name `<namespace>.<api>.<method>`.
///
/// The namespace may itself be dotted; the API and method names may not.
pub fn channel_name(namespace: &str, api: &str, method: &str) -> Result<String> {
    check_component("namespace", namespace, true)?;
    check_component("api", api, false)?;
    check_component("method", method, false)?;
    Ok(format!("{namespace}.{api}.{method}"))
}

fn check_component(component: &'static str, value: &str, allow_dots: bool) -> Result<()> {
    if value.is_empty() {
        return Err(ChannelError::EmptyComponent { component });
    }
    let bad = value
        .chars()
        .find(|&ch| ch.is_whitespace() || ch.is_control() || (ch == '.' && !allow_dots));
    if let Some(ch) = bad {
        return Err(ChannelError::InvalidCharacter {
            component,
            value: value.to_string(),
            ch,
        });
    }
    if allow_dots && (value.starts_with('.') || value.ends_with('.') || value.contains("..")) {
        return Err(ChannelError::InvalidCharacter {
            component,
            value: value.to_string(),
            ch: '.',
        });
    }
    Ok(())
}
