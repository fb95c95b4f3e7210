mod configuration_file;

use crate::Error;
use crate::components::Component;
use std::collections::HashSet;
use std::time::Duration;

/// A data structure that can be deserialized and converted into a [`Component`].
#[typetag::deserialize(tag = "type")]
pub trait ComponentConfig {
    /// Convert this `ComponentConfig` into a [`Component`].
    fn to_component(&self) -> Result<Box<dyn Component>, Error>;
}

/// A set of named components ready to send messages.
#[derive(Debug, Clone)]
pub struct NotifyConfiguration {
    components: Vec<Box<dyn Component>>,
}

impl NotifyConfiguration {
    /// Create a new `NotifyConfiguration`.
    pub fn new(components: Vec<Box<dyn Component>>) -> Result<Self, Error> {
        let config = Self { components };
        Self::validate(config)
    }

    /// Return all components.
    pub fn components(&self) -> &[Box<dyn Component>] {
        &self.components
    }

    /// Return the component with the given name.
    pub fn component(&self, name: &str) -> Option<&dyn Component> {
        self.components.iter().find(|component| component.name() == name).map(|component| &**component)
    }

    fn validate(config: NotifyConfiguration) -> Result<NotifyConfiguration, Error> {
        if config.components.is_empty() {
            return Err(Error::MissingComponent);
        }

        let mut names = HashSet::new();
        for component in &config.components {
            if !names.insert(component.name()) {
                return Err(Error::DuplicateComponentName(component.name().to_string()));
            }
        }

        Ok(config)
    }
}

impl TryFrom<&str> for NotifyConfiguration {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        configuration_file::NotifyConfigFile::parse(value)
    }
}

fn collect_components(component_configs: Vec<Box<dyn ComponentConfig>>) -> Result<Vec<Box<dyn Component>>, Error> {
    component_configs.iter().map(|cfg| cfg.to_component()).collect()
}

pub(crate) fn timeout_from_secs(seconds: i64) -> Result<Duration, Error> {
    match seconds > 0 {
        true => Ok(Duration::from_secs(seconds as u64)),
        false => Err(Error::invalid_component_configuration(format!(
            "timeout must be a positive number of seconds, got {}",
            seconds
        ))),
    }
}

pub(crate) fn port_from_i64(port: i64) -> Result<u16, Error> {
    match port <= u16::MAX as i64 && port > u16::MIN as i64 {
        true => Ok(port as u16),
        false => Err(Error::InvalidPortNumber(port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(timeout_from_secs(15).unwrap(), Duration::from_secs(15));
        assert!(matches!(timeout_from_secs(0), Err(Error::InvalidComponentConfiguration(_))));
    }

    #[test]
    fn port_range() {
        assert_eq!(port_from_i64(8123).unwrap(), 8123);
        assert_eq!(port_from_i64(65535).unwrap(), 65535);
        assert!(matches!(port_from_i64(0), Err(Error::InvalidPortNumber(0))));
        assert!(matches!(port_from_i64(70000), Err(Error::InvalidPortNumber(70000))));
    }
}
