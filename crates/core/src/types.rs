/// Server-assigned job identifier. Opaque to the client.
pub type JobId = String;

/// Server-assigned asset identifier. Opaque to the client.
pub type AssetId = String;
