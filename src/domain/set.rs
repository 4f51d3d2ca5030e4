use crate::domain::id;
use crate::domain::lifecycle::Lifecycle;
use crate::domain::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg_attr(test, derive(Default))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Set {
    pub id: String,
    pub name: String,
    pub alias: String,
    /// Rarity id to asset id.
    #[serde(default)]
    pub assets: BTreeMap<String, String>,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Set {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn asset_for(&self, id_rarity: &str) -> Option<&str> {
        self.assets.get(id_rarity).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetInput {
    pub id: Option<String>,
    pub name: String,
    pub alias: String,
    pub assets: BTreeMap<String, String>,
}

impl SetInput {
    #[must_use]
    pub fn resolved_id(&self) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => id::set_id(&self.name),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(String::from("set name must not be empty"));
        }
        if self.alias.trim().is_empty() {
            return Err(format!("set {:?} has no alias", self.name));
        }
        Ok(())
    }

    #[must_use]
    pub fn into_set(self, previous: Option<&Set>, now: Timestamp) -> Set {
        Set {
            id: self.resolved_id(),
            lifecycle: Lifecycle::written(previous.map(|set| &set.lifecycle), now),
            name: self.name,
            alias: self.alias,
            assets: self.assets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_input() -> SetInput {
        SetInput {
            id: None,
            name: String::from("Set Mock"),
            alias: String::from("stm"),
            assets: BTreeMap::from([(String::from("r1"), String::from("a1"))]),
        }
    }

    #[test]
    fn test_resolved_id_is_derived_from_name() {
        assert_eq!(
            create_test_input().resolved_id(),
            "0ae32590-73da-52fd-a98e-ad9894d9f772"
        );
    }

    #[test]
    fn test_resolved_id_keeps_external_id() {
        let mut input = create_test_input();
        input.id = Some(String::from("s1"));
        assert_eq!(input.resolved_id(), "s1");
    }

    #[test]
    fn test_blank_id_is_derived() {
        let mut input = create_test_input();
        input.id = Some(String::from("  "));
        assert_eq!(input.resolved_id(), id::set_id("Set Mock"));
    }

    #[test]
    fn test_validate() {
        assert!(create_test_input().validate().is_ok());
        let mut input = create_test_input();
        input.name = String::new();
        assert!(input.validate().is_err());
        let mut input = create_test_input();
        input.alias = String::from(" ");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_into_set() {
        let now = Timestamp::now();
        let set = create_test_input().into_set(None, now);
        assert_eq!(set.name(), "Set Mock");
        assert_eq!(set.asset_for("r1"), Some("a1"));
        assert_eq!(set.lifecycle.updated_at, now);
    }
}
