use bridgewire_channel::{channel_name, ChannelError, DEFAULT_NAMESPACE};

/// Configuration for binding or calling an API surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Prefix for every channel name (default: [`DEFAULT_NAMESPACE`]).
    pub namespace: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Channel name for `api.method` under this namespace.
    pub fn channel(&self, api: &str, method: &str) -> Result<String, ChannelError> {
        channel_name(&self.namespace, api, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_namespace() {
        let config = DispatchConfig::default();
        assert_eq!(config.channel("Api", "noop").unwrap(), "dev.bridgewire.Api.noop");
    }

    #[test]
    fn custom_namespace() {
        let config = DispatchConfig::with_namespace("dev.flutter.pigeon");
        assert_eq!(
            config.channel("HostTrivialApi", "noop").unwrap(),
            "dev.flutter.pigeon.HostTrivialApi.noop"
        );
    }
}
