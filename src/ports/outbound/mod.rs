pub mod asset_store;
pub mod card_store;
pub mod document_client;
