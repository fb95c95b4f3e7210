use crate::Error;
use crate::configuration::{ComponentConfig, NotifyConfiguration, collect_components};
use serde::Deserialize;

/// Serde compatible representation of [`NotifyConfiguration`] that handles any [`ComponentConfig`].
#[derive(Deserialize)]
pub(super) struct NotifyConfigFile {
    #[serde(default)]
    component: Vec<Box<dyn ComponentConfig>>,
}

impl NotifyConfigFile {
    /// Parse [`NotifyConfiguration`] from provided TOML.
    pub fn parse(string: &str) -> Result<NotifyConfiguration, Error> {
        let parsed: NotifyConfigFile = toml::from_str(string)?;
        parsed.try_into()
    }
}

impl TryFrom<NotifyConfigFile> for NotifyConfiguration {
    type Error = Error;

    fn try_from(value: NotifyConfigFile) -> Result<Self, Self::Error> {
        NotifyConfiguration::new(collect_components(value.component)?)
    }
}
