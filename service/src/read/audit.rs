//! Application log read model definitions.

pub mod trail {
    //! Audit trail of a single [`Property`].
    //!
    //! [`Property`]: crate::domain::Property

    use common::define_pagination;

    use crate::domain::{audit, property};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = audit::Entry;

    /// Cursor pointing to a specific [`audit::Entry`] in the trail.
    pub type Cursor = audit::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`Property`] whose trail is listed.
        ///
        /// [`Property`]: crate::domain::Property
        pub property_id: property::Id,
    }
}
