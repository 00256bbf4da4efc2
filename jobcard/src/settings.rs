//! The shop identity printed on receipts.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSettings {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl ShopSettings {
    pub const DEFAULT_NAME: &'static str = "Service Job Card";

    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
        }
    }

    /// The settings as saved: a blank name falls back to [`ShopSettings::DEFAULT_NAME`].
    pub fn normalized(self) -> Self {
        if self.name.trim().is_empty() {
            Self {
                name: Self::DEFAULT_NAME.to_owned(),
                ..self
            }
        } else {
            self
        }
    }
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_owned(),
            address: String::new(),
            phone: String::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_name_falls_back_to_default() {
        let settings = ShopSettings::new("  ", "1 Main Road", "0800").normalized();

        assert_eq!(settings.name, "Service Job Card");
        assert_eq!(settings.address, "1 Main Road");
        assert_eq!(
            ShopSettings::new("FixIt", "", "").normalized().name,
            "FixIt"
        );
    }

    #[test]
    fn reads_partial_records() {
        let settings: ShopSettings = serde_json::from_value(json!({"phone": "0800"})).unwrap();

        assert_eq!(settings.name, "Service Job Card");
        assert_eq!(settings.phone, "0800");
        assert_eq!(settings.address, "");
    }
}
