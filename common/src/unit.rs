//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a status change of an entity.
#[derive(Clone, Copy, Debug)]
pub struct StatusChange;

/// Marker type describing a final decision upon an entity.
#[derive(Clone, Copy, Debug)]
pub struct Decision;

/// Marker type describing a moment an entity was recorded.
#[derive(Clone, Copy, Debug)]
pub struct Recording;

/// Marker type describing an ownership change.
#[derive(Clone, Copy, Debug)]
pub struct OwnershipChange;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
