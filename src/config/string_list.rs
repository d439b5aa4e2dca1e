use serde::{Deserialize, Deserializer};

/// Deserializes an optional list of strings which can be expressed either as a sequence or as a
/// single comma-separated string, e.g. `key1=val1,key2=val2`. Blank entries are dropped.
pub(crate) fn deserialize_optional_string_list<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        String(String),
        List(Vec<String>),
    }

    let Some(value) = Option::<StringOrList>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let entries = match value {
        StringOrList::String(s) => split_list(&s),
        StringOrList::List(list) => list
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(String::from)
            .collect(),
    };
    Ok(Some(entries))
}

/// Splits a comma-separated value into its trimmed, non-empty entries.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}
