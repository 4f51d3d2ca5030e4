use uuid::Uuid;

/// Stable identifier for an in-process entity, derived from its canonical key.
#[must_use]
pub fn derive_id(kind: &str, key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{kind}#{key}").as_bytes()).to_string()
}

#[must_use]
pub fn rarity_id(name: &str) -> String {
    derive_id("Rarity", name)
}

#[must_use]
pub fn set_id(name: &str) -> String {
    derive_id("Set", name)
}

#[must_use]
pub fn card_id(id_set: &str, name: &str) -> String {
    derive_id("Card", &format!("{id_set}#{name}"))
}
