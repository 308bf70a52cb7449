//! [`Property`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Workflow};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xxhash_rust::xxh3;

use crate::domain::{transfer, user};
#[cfg(doc)]
use crate::domain::{Dispute, Transfer};

/// Registered land parcel.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// [`Hash`] of this [`Property`] used for deduplication.
    ///
    /// [`Hash`]: struct@Hash
    pub hash: Hash,

    /// [`PlotNumber`] of this [`Property`], unique within its sub-city and
    /// kebele.
    pub plot_number: PlotNumber,

    /// [`Location`] of this [`Property`].
    pub location: Location,

    /// [`Kind`] of this [`Property`].
    pub kind: Kind,

    /// [`Area`] of this [`Property`] in square meters.
    pub area: Area,

    /// Registration [`Status`] of this [`Property`].
    pub status: Status,

    /// Indicator whether a non-terminal [`Dispute`] exists for this
    /// [`Property`].
    ///
    /// Derived from the set of [`Dispute`]s and recomputed by the dispute
    /// coordinator on every terminal dispute transition.
    pub has_active_dispute: bool,

    /// ID of the single non-terminal [`Transfer`] of this [`Property`], if
    /// one is in progress.
    ///
    /// Acts as the transfer exclusivity lock.
    pub current_transfer: Option<transfer::Id>,

    /// ID of the [`User`] currently owning this [`Property`].
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// Past owners of this [`Property`], oldest first.
    pub ownership_history: Vec<OwnershipRecord>,

    /// [`DateTime`] when this [`Property`] was registered.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the [`Status`] of this [`Property`] last changed.
    pub status_updated_at: StatusDateTime,
}

impl Property {
    /// Checks the preconditions for initiating a new ownership [`Transfer`]
    /// of this [`Property`], in their prescribed order.
    ///
    /// # Errors
    ///
    /// With the first failing [`TransferObstacle`].
    pub fn ensure_transferable(
        &self,
        initiator: user::Id,
    ) -> Result<(), TransferObstacle> {
        use TransferObstacle as O;

        if self.owner_id != initiator {
            return Err(O::NotOwner);
        }
        if self.has_active_dispute {
            return Err(O::ActiveDispute);
        }
        if self.current_transfer.is_some() {
            return Err(O::TransferInProgress);
        }

        Ok(())
    }

    /// Moves this [`Property`] to the provided [`Status`].
    ///
    /// Entering [`Status::Rejected`] or [`Status::NeedsUpdate`] doesn't touch
    /// [`Property::has_active_dispute`] or [`Property::current_transfer`]:
    /// those are independent locks.
    ///
    /// # Errors
    ///
    /// If the transition table has no edge from the current [`Status`] to the
    /// provided one.
    pub fn transition_to(
        &mut self,
        to: Status,
        at: StatusDateTime,
    ) -> Result<(), IllegalTransition> {
        self.status = self.status.apply(to).ok_or(IllegalTransition {
            from: self.status,
            to,
        })?;
        self.status_updated_at = at;
        Ok(())
    }

    /// Applies a completed ownership [`Transfer`] to this [`Property`]:
    /// records the outgoing owner in the history, installs the new owner,
    /// moves the [`Status`] to [`Status::Transferred`] and releases the
    /// [`Property::current_transfer`] lock.
    ///
    /// # Errors
    ///
    /// If the current [`Status`] has no edge to [`Status::Transferred`].
    pub fn apply_ownership_change(
        &mut self,
        new_owner: user::Id,
        at: OwnershipChangeDateTime,
    ) -> Result<(), IllegalTransition> {
        self.transition_to(Status::Transferred, at.coerce())?;
        self.ownership_history.push(OwnershipRecord {
            owner_id: self.owner_id,
            transferred_at: at,
        });
        self.owner_id = new_owner;
        self.current_transfer = None;
        Ok(())
    }

    /// Releases the [`Property::current_transfer`] lock.
    pub fn release_transfer(&mut self) {
        self.current_transfer = None;
    }
}

/// ID of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Hash of a [`Property`] used for deduplication.
///
/// Two registration applications describing the same plot within the same
/// sub-city and kebele produce the same [`Hash`].
///
/// [`Hash`]: struct@Hash
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Hash(Uuid);

impl Hash {
    /// Calculates a new [`Hash`] for a [`Property`].
    ///
    /// [`Hash`]: struct@Hash
    #[must_use]
    pub fn new(
        region: &Region,
        sub_city: &SubCity,
        kebele: &Kebele,
        plot_number: &PlotNumber,
    ) -> Self {
        use std::hash::Hash as _;

        // WARNING: Avoid changing the order of the fields in the hasher,
        //          because it will be a breaking change requiring to migrate
        //          all existing hashes in the database to the new format.
        let mut hasher = xxh3::Xxh3Builder::new().build();
        region.hash(&mut hasher);
        sub_city.hash(&mut hasher);
        kebele.hash(&mut hasher);
        plot_number.hash(&mut hasher);

        Self(Uuid::from_u128(hasher.digest128()))
    }
}

/// Administrative location of a [`Property`].
#[derive(Clone, Debug)]
pub struct Location {
    /// [`Region`] this [`Property`] is located in.
    pub region: Region,

    /// [`SubCity`] this [`Property`] is located in.
    pub sub_city: SubCity,

    /// [`Kebele`] this [`Property`] is located in.
    pub kebele: Kebele,

    /// [`Street`] this [`Property`] is located on, if recorded.
    pub street: Option<Street>,

    /// [`HouseNumber`] of this [`Property`], if assigned.
    pub house_number: Option<HouseNumber>,
}

/// Region a [`Property`] is located in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Region(String);

impl Region {
    /// Creates a new [`Region`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `region` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Creates a new [`Region`] if the given `region` is valid.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Option<Self> {
        let region = region.into();
        Self::check(&region).then_some(Self(region))
    }

    /// Checks whether the given `region` is a valid [`Region`].
    fn check(region: impl AsRef<str>) -> bool {
        let region = region.as_ref();
        region.trim() == region && !region.is_empty() && region.len() <= 128
    }
}

impl FromStr for Region {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Region`")
    }
}

/// Sub-city a [`Property`] is located in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct SubCity(String);

impl SubCity {
    /// Creates a new [`SubCity`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `sub_city` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(sub_city: impl Into<String>) -> Self {
        Self(sub_city.into())
    }

    /// Creates a new [`SubCity`] if the given `sub_city` is valid.
    #[must_use]
    pub fn new(sub_city: impl Into<String>) -> Option<Self> {
        let sub_city = sub_city.into();
        Self::check(&sub_city).then_some(Self(sub_city))
    }

    /// Checks whether the given `sub_city` is a valid [`SubCity`].
    fn check(sub_city: impl AsRef<str>) -> bool {
        let sub_city = sub_city.as_ref();
        sub_city.trim() == sub_city
            && !sub_city.is_empty()
            && sub_city.len() <= 128
    }
}

impl FromStr for SubCity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `SubCity`")
    }
}

/// Kebele a [`Property`] is located in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Kebele(String);

impl Kebele {
    /// Creates a new [`Kebele`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `kebele` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(kebele: impl Into<String>) -> Self {
        Self(kebele.into())
    }

    /// Creates a new [`Kebele`] if the given `kebele` is valid.
    #[must_use]
    pub fn new(kebele: impl Into<String>) -> Option<Self> {
        let kebele = kebele.into();
        Self::check(&kebele).then_some(Self(kebele))
    }

    /// Checks whether the given `kebele` is a valid [`Kebele`].
    fn check(kebele: impl AsRef<str>) -> bool {
        let kebele = kebele.as_ref();
        kebele.trim() == kebele && !kebele.is_empty() && kebele.len() <= 64
    }
}

impl FromStr for Kebele {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Kebele`")
    }
}

/// Street a [`Property`] is located on.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Street(String);

impl Street {
    /// Creates a new [`Street`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `street` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(street: impl Into<String>) -> Self {
        Self(street.into())
    }

    /// Creates a new [`Street`] if the given `street` is valid.
    #[must_use]
    pub fn new(street: impl Into<String>) -> Option<Self> {
        let street = street.into();
        Self::check(&street).then_some(Self(street))
    }

    /// Checks whether the given `street` is a valid [`Street`].
    fn check(street: impl AsRef<str>) -> bool {
        let street = street.as_ref();
        street.trim() == street && !street.is_empty() && street.len() <= 256
    }
}

impl FromStr for Street {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Street`")
    }
}

/// House number of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct HouseNumber(String);

impl HouseNumber {
    /// Creates a new [`HouseNumber`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `num` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(num: impl Into<String>) -> Self {
        Self(num.into())
    }

    /// Creates a new [`HouseNumber`] if the given `num` is valid.
    #[must_use]
    pub fn new(num: impl Into<String>) -> Option<Self> {
        let num = num.into();
        Self::check(&num).then_some(Self(num))
    }

    /// Checks whether the given `num` is a valid [`HouseNumber`].
    fn check(num: impl AsRef<str>) -> bool {
        let num = num.as_ref();
        num.trim() == num && !num.is_empty() && num.len() <= 32
    }
}

impl FromStr for HouseNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `HouseNumber`")
    }
}

/// Plot number of a [`Property`], unique within its sub-city and kebele.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct PlotNumber(String);

impl PlotNumber {
    /// Creates a new [`PlotNumber`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `num` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(num: impl Into<String>) -> Self {
        Self(num.into())
    }

    /// Creates a new [`PlotNumber`] if the given `num` is valid.
    #[must_use]
    pub fn new(num: impl Into<String>) -> Option<Self> {
        let num = num.into();
        Self::check(&num).then_some(Self(num))
    }

    /// Checks whether the given `num` is a valid [`PlotNumber`].
    fn check(num: impl AsRef<str>) -> bool {
        /// Regular expression checking [`PlotNumber`] invariants:
        /// - Must start with a letter or a digit;
        /// - May contain letters, digits, slashes and dashes;
        /// - Must be between 1 and 32 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-Za-z0-9][A-Za-z0-9/-]{0,31}$")
                .expect("valid regex")
        });

        REGEX.is_match(num.as_ref())
    }
}

impl FromStr for PlotNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PlotNumber`")
    }
}

define_kind! {
    #[doc = "Kind of a [`Property`]."]
    enum Kind {
        #[doc = "Residential parcel."]
        Residential = 1,

        #[doc = "Commercial parcel."]
        Commercial = 2,

        #[doc = "Industrial parcel."]
        Industrial = 3,

        #[doc = "Agricultural parcel."]
        Agricultural = 4,
    }
}

/// Area of a [`Property`] in square meters.
///
/// Always strictly positive.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Area(Decimal);

impl Area {
    /// Creates a new [`Area`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `sq_meters` value is strictly
    /// positive.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(sq_meters: Decimal) -> Self {
        Self(sq_meters)
    }

    /// Creates a new [`Area`] if the given `sq_meters` value is valid.
    #[must_use]
    pub fn new(sq_meters: Decimal) -> Option<Self> {
        (sq_meters.is_sign_positive() && !sq_meters.is_zero())
            .then_some(Self(sq_meters))
    }

    /// Returns this [`Area`] in square meters.
    #[must_use]
    pub fn sq_meters(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Area {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sq_meters = Decimal::from_str(s).map_err(|_| "invalid `Area`")?;
        Self::new(sq_meters).ok_or("invalid `Area`")
    }
}

define_kind! {
    #[doc = "Registration status of a [`Property`]."]
    enum Status {
        #[doc = "The application is awaiting document validation."]
        Pending = 1,

        #[doc = "The application documents passed validation."]
        DocumentsValidated = 2,

        #[doc = "The registration payment is completed."]
        PaymentCompleted = 3,

        #[doc = "The registration is approved."]
        Approved = 4,

        #[doc = "The application is rejected."]
        Rejected = 5,

        #[doc = "The application is returned to the applicant for an update."]
        NeedsUpdate = 6,

        #[doc = "Ownership of the [`Property`] has been transferred."]
        Transferred = 7,
    }
}

impl Workflow for Status {
    type Event = Status;

    fn apply(self, to: Status) -> Option<Self> {
        use Status as S;

        let legal = match self {
            S::Pending => {
                matches!(to, S::DocumentsValidated | S::Rejected | S::NeedsUpdate)
            }
            S::DocumentsValidated => {
                matches!(to, S::PaymentCompleted | S::Rejected | S::NeedsUpdate)
            }
            S::PaymentCompleted => {
                matches!(to, S::Approved | S::Rejected | S::NeedsUpdate)
            }
            S::NeedsUpdate => matches!(to, S::Pending),
            S::Approved => matches!(to, S::Transferred),
            S::Rejected | S::Transferred => false,
        };

        legal.then_some(to)
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Transferred)
    }
}

/// Reason why a [`Property`] cannot start a new ownership [`Transfer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransferObstacle {
    /// The initiator is not the current owner of the [`Property`].
    NotOwner,

    /// An active [`Dispute`] blocks transfers of the [`Property`].
    ActiveDispute,

    /// Another [`Transfer`] of the [`Property`] is already in progress.
    TransferInProgress,
}

/// Illegal [`Status`] transition attempt.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("illegal `Property` status transition: {from} -> {to}")]
pub struct IllegalTransition {
    /// [`Status`] the [`Property`] was in.
    pub from: Status,

    /// [`Status`] the transition was attempted into.
    pub to: Status,
}

/// Record of a past owner of a [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct OwnershipRecord {
    /// ID of the [`User`] who owned the [`Property`].
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// [`DateTime`] when the ownership was transferred away.
    pub transferred_at: OwnershipChangeDateTime,
}

/// [`DateTime`] when a [`Property`] was registered.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] when the [`Status`] of a [`Property`] last changed.
pub type StatusDateTime = DateTimeOf<(Property, unit::StatusChange)>;

/// [`DateTime`] when an ownership change of a [`Property`] happened.
pub type OwnershipChangeDateTime = DateTimeOf<(Property, unit::OwnershipChange)>;

#[cfg(test)]
mod spec {
    use common::{DateTimeOf, Workflow as _};

    use crate::domain::user;

    use super::{
        Area, Hash, Kebele, Kind, Location, PlotNumber, Property, Region,
        Status, SubCity, TransferObstacle,
    };

    fn property(owner: user::Id) -> Property {
        let region = Region::new("Addis Ababa").unwrap();
        let sub_city = SubCity::new("Bole").unwrap();
        let kebele = Kebele::new("03").unwrap();
        let plot_number = PlotNumber::new("AA/BO/03-0042").unwrap();
        Property {
            id: super::Id::new(),
            hash: Hash::new(&region, &sub_city, &kebele, &plot_number),
            plot_number,
            location: Location {
                region,
                sub_city,
                kebele,
                street: None,
                house_number: None,
            },
            kind: Kind::Residential,
            area: Area::new("250.5".parse().unwrap()).unwrap(),
            status: Status::Pending,
            has_active_dispute: false,
            current_transfer: None,
            owner_id: owner,
            ownership_history: Vec::new(),
            created_at: DateTimeOf::now(),
            status_updated_at: DateTimeOf::now(),
        }
    }

    #[test]
    fn follows_registration_transition_table() {
        use Status as S;

        for (from, to, legal) in [
            (S::Pending, S::DocumentsValidated, true),
            (S::Pending, S::PaymentCompleted, false),
            (S::Pending, S::Approved, false),
            (S::Pending, S::Rejected, true),
            (S::Pending, S::NeedsUpdate, true),
            (S::DocumentsValidated, S::PaymentCompleted, true),
            (S::DocumentsValidated, S::Approved, false),
            (S::DocumentsValidated, S::Rejected, true),
            (S::PaymentCompleted, S::Approved, true),
            (S::PaymentCompleted, S::NeedsUpdate, true),
            (S::NeedsUpdate, S::Pending, true),
            (S::NeedsUpdate, S::Approved, false),
            (S::Approved, S::Transferred, true),
            (S::Approved, S::Rejected, false),
            (S::Rejected, S::Pending, false),
            (S::Transferred, S::Pending, false),
            (S::Pending, S::Transferred, false),
        ] {
            assert_eq!(
                from.apply(to),
                legal.then_some(to),
                "edge {from} -> {to}",
            );
        }
    }

    #[test]
    fn illegal_transition_leaves_property_unchanged() {
        let mut p = property(user::Id::new());
        let err = p
            .transition_to(Status::Approved, DateTimeOf::now())
            .unwrap_err();

        assert_eq!(err.from, Status::Pending);
        assert_eq!(err.to, Status::Approved);
        assert_eq!(p.status, Status::Pending);
    }

    #[test]
    fn checks_transfer_preconditions_in_order() {
        let owner = user::Id::new();
        let mut p = property(owner);

        assert_eq!(
            p.ensure_transferable(user::Id::new()),
            Err(TransferObstacle::NotOwner),
        );

        p.has_active_dispute = true;
        p.current_transfer = Some(crate::domain::transfer::Id::new());
        // The dispute check precedes the active-transfer check, and the
        // ownership check precedes both.
        assert_eq!(
            p.ensure_transferable(user::Id::new()),
            Err(TransferObstacle::NotOwner),
        );
        assert_eq!(
            p.ensure_transferable(owner),
            Err(TransferObstacle::ActiveDispute),
        );

        p.has_active_dispute = false;
        assert_eq!(
            p.ensure_transferable(owner),
            Err(TransferObstacle::TransferInProgress),
        );

        p.current_transfer = None;
        assert_eq!(p.ensure_transferable(owner), Ok(()));
    }

    #[test]
    fn ownership_change_swaps_owner_and_records_history() {
        let old_owner = user::Id::new();
        let new_owner = user::Id::new();
        let mut p = property(old_owner);
        p.status = Status::Approved;
        p.current_transfer = Some(crate::domain::transfer::Id::new());

        p.apply_ownership_change(new_owner, DateTimeOf::now()).unwrap();

        assert_eq!(p.owner_id, new_owner);
        assert_eq!(p.status, Status::Transferred);
        assert_eq!(p.current_transfer, None);
        assert_eq!(p.ownership_history.len(), 1);
        assert_eq!(p.ownership_history[0].owner_id, old_owner);
    }

    #[test]
    fn ownership_change_requires_approved_status() {
        let mut p = property(user::Id::new());
        assert!(p
            .apply_ownership_change(user::Id::new(), DateTimeOf::now())
            .is_err());
        assert_eq!(p.status, Status::Pending);
        assert!(p.ownership_history.is_empty());
    }

    #[test]
    fn hash_identifies_plot_within_kebele() {
        let hash = |region: &str, sub_city: &str, kebele: &str, plot: &str| {
            Hash::new(
                &Region::new(region).unwrap(),
                &SubCity::new(sub_city).unwrap(),
                &Kebele::new(kebele).unwrap(),
                &PlotNumber::new(plot).unwrap(),
            )
        };

        assert_eq!(
            hash("Addis Ababa", "Bole", "03", "42"),
            hash("Addis Ababa", "Bole", "03", "42"),
        );
        assert_ne!(
            hash("Addis Ababa", "Bole", "03", "42"),
            hash("Addis Ababa", "Bole", "04", "42"),
        );
        assert_ne!(
            hash("Addis Ababa", "Bole", "03", "42"),
            hash("Addis Ababa", "Yeka", "03", "42"),
        );
    }

    #[test]
    fn validates_plot_numbers() {
        assert!(PlotNumber::new("AA/BO/03-0042").is_some());
        assert!(PlotNumber::new("42").is_some());
        assert!(PlotNumber::new("").is_none());
        assert!(PlotNumber::new("/42").is_none());
        assert!(PlotNumber::new("plot 42").is_none());
    }

    #[test]
    fn validates_areas() {
        assert!(Area::new("0.01".parse().unwrap()).is_some());
        assert!(Area::new("0".parse().unwrap()).is_none());
        assert!(Area::new("-250".parse().unwrap()).is_none());
    }
}
