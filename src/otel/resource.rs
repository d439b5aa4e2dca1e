use super::config::{OTelConfigError, OTelRuntimeConfig};
use crate::defaults::{SERVICE_NAME_RESOURCE_KEY, UNSET_SERVICE_NAME};
use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use std::collections::HashSet;

/// Builds the [Resource] describing the instrumented service: the resolved service name plus the
/// configured resource attributes, without any key listed in the disabled keys.
///
/// No resource detector is used, the resource only reflects the provided configuration.
pub fn build_resource(config: &OTelRuntimeConfig) -> Result<Resource, OTelConfigError> {
    let disabled_keys: HashSet<&str> = config
        .experimental_resource_disabled_keys()
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();

    let attributes = config
        .resource_attribute_pairs()?
        .into_iter()
        .filter(|(key, _)| key != SERVICE_NAME_RESOURCE_KEY)
        .filter(|(key, _)| !disabled_keys.contains(key.as_str()))
        .map(|(key, value)| KeyValue::new(key, value));

    let mut builder = Resource::builder_empty().with_attributes(attributes);
    if !disabled_keys.contains(SERVICE_NAME_RESOURCE_KEY) {
        let service_name = config.service_name().unwrap_or(UNSET_SERVICE_NAME);
        builder = builder.with_service_name(service_name.to_string());
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::{Key, Value};

    fn resource_value(resource: &Resource, key: &'static str) -> Option<Value> {
        resource.get(&Key::from_static_str(key))
    }

    #[test]
    fn resource_with_service_name_and_attributes() {
        let config = OTelRuntimeConfig::with_resource_attributes(&[
            "deployment.environment=prod",
            "service.name=from-attributes",
        ])
        .resolve_service_name(None)
        .unwrap();

        let resource = build_resource(&config).unwrap();

        assert_eq!(
            resource_value(&resource, "service.name"),
            Some(Value::from("from-attributes"))
        );
        assert_eq!(
            resource_value(&resource, "deployment.environment"),
            Some(Value::from("prod"))
        );
        assert_eq!(resource.len(), 2);
    }

    #[test]
    fn disabled_keys_are_filtered() {
        let config = OTelRuntimeConfig {
            experimental_resource_disabled_keys: Some(vec![
                "host.name".to_string(),
                "service.name".to_string(),
            ]),
            ..OTelRuntimeConfig::with_resource_attributes(&["host.name=box", "team=core"])
        };

        let resource = build_resource(&config).unwrap();

        assert_eq!(resource_value(&resource, "host.name"), None);
        assert_eq!(resource_value(&resource, "service.name"), None);
        assert_eq!(resource_value(&resource, "team"), Some(Value::from("core")));
    }

    #[test]
    fn unresolved_service_name_falls_back_to_unset() {
        let resource = build_resource(&OTelRuntimeConfig::default()).unwrap();

        assert_eq!(
            resource_value(&resource, "service.name"),
            Some(Value::from("unset"))
        );
    }
}
