/// Opaque identifier of a portfolio (UUID-shaped when minted here).
pub type PortfolioId = String;

/// Opaque identifier of a block, unique within its portfolio and never reused.
pub type BlockId = String;

/// Opaque identifier of the account that owns a portfolio.
pub type OwnerId = String;

/// Opaque reference to a media object held by the media collaborator.
pub type MediaRef = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Mint a fresh opaque identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_distinct() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn minted_ids_are_uuid_shaped() {
        let id = new_id();
        assert_eq!(id.len(), 36);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
