//! Operations a resource endpoint exposes

use bitflags::bitflags;

bitflags! {
    /// Set of operations mounted for one resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BulkActions: u8 {
        /// List the filtered collection
        const LIST = 0b0000_0001;
        /// Create one record or a batch, chosen by payload shape
        const CREATE = 0b0000_0010;
        /// Full and partial bulk update of the filtered collection
        const UPDATE = 0b0000_0100;
        /// Bulk destroy of the filtered collection
        const DESTROY = 0b0000_1000;
        /// Single-record retrieve, update, partial update and destroy
        const DETAIL = 0b0001_0000;
    }
}

impl BulkActions {
    pub const BULK_CREATE: Self = Self::CREATE;
    pub const BULK_UPDATE: Self = Self::UPDATE;
    pub const BULK_DESTROY: Self = Self::DESTROY;
    pub const LIST_BULK_CREATE: Self = Self::LIST.union(Self::CREATE);
    pub const LIST_BULK_CREATE_UPDATE: Self = Self::LIST_BULK_CREATE.union(Self::UPDATE);
    pub const LIST_BULK_CREATE_DESTROY: Self = Self::LIST_BULK_CREATE.union(Self::DESTROY);
    pub const LIST_CREATE_BULK_UPDATE_DESTROY: Self =
        Self::LIST_BULK_CREATE_UPDATE.union(Self::DESTROY);
    pub const LIST_BULK_CREATE_UPDATE_DESTROY: Self = Self::all();

    /// Whether any operation is mounted on the collection path.
    pub fn has_collection_routes(&self) -> bool {
        self.intersects(Self::LIST | Self::CREATE | Self::UPDATE | Self::DESTROY)
    }
}

impl Default for BulkActions {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(BulkActions::LIST_BULK_CREATE.contains(BulkActions::LIST));
        assert!(BulkActions::LIST_BULK_CREATE.contains(BulkActions::CREATE));
        assert!(!BulkActions::LIST_BULK_CREATE.contains(BulkActions::UPDATE));
        assert!(BulkActions::LIST_BULK_CREATE_UPDATE_DESTROY.contains(BulkActions::DETAIL));
        assert_eq!(BulkActions::default(), BulkActions::all());
    }

    #[test]
    fn test_collection_routes() {
        assert!(BulkActions::BULK_DESTROY.has_collection_routes());
        assert!(!BulkActions::DETAIL.has_collection_routes());
        assert!(!BulkActions::empty().has_collection_routes());
    }
}
