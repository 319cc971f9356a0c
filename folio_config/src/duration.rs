use std::ops::Deref;

use serde::Deserialize;

/// Duration parsed from a human-readable string like `"15m"` or `"1h 30m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw)
            .map(Self)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid duration: {raw:?}")))
    }
}

fn parse(raw: &str) -> Option<std::time::Duration> {
    let mut total = 0u64;
    for part in raw.split_whitespace() {
        let mut chars = part.chars();
        let unit = chars.next_back()?;
        let value = chars.as_str().parse::<u64>().ok()?;
        let scale = match unit {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(scale)?)?;
    }
    Some(std::time::Duration::from_secs(total))
}
