//! Evidence [`Document`] definitions.
//!
//! The same shape serves both [`Transfer`] evidence and [`Dispute`] evidence.
//! Binary content lives in the external document store; a [`Document`] only
//! carries the opaque [`FileId`] reference to it.
//!
//! [`Dispute`]: crate::domain::Dispute
//! [`Transfer`]: crate::domain::Transfer

use common::{define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{audit, user};

/// Piece of evidence attached to a workflow.
#[derive(Clone, Debug)]
pub struct Document {
    /// ID of this [`Document`].
    pub id: Id,

    /// [`Kind`] of this [`Document`].
    pub kind: Kind,

    /// Reference to the stored file in the external document store.
    pub file: FileId,

    /// [`DateTime`] when this [`Document`] was uploaded.
    pub uploaded_at: UploadDateTime,

    /// Officer [`Review`] of this [`Document`], once performed.
    pub review: Option<Review>,
}

impl Document {
    /// Indicates whether this [`Document`] has an approving [`Review`].
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.review
            .as_ref()
            .is_some_and(|r| r.verdict == Verdict::Approved)
    }
}

/// ID of a [`Document`].
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

define_kind! {
    #[doc = "Kind of a [`Document`]."]
    enum Kind {
        #[doc = "Signed sale agreement."]
        SaleAgreement = 1,

        #[doc = "National ID card of a party."]
        IdCard = 2,

        #[doc = "Title deed of the property."]
        TitleDeed = 3,

        #[doc = "Tax clearance certificate."]
        TaxClearanceCertificate = 4,

        #[doc = "Court order mandating the operation."]
        CourtOrder = 5,

        #[doc = "Inheritance certificate."]
        InheritanceCertificate = 6,

        #[doc = "Photograph of the parcel or its markings."]
        Photograph = 7,

        #[doc = "Any other supporting document."]
        Other = 8,
    }
}

/// Opaque reference to a file in the external document store.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct FileId(String);

impl FileId {
    /// Creates a new [`FileId`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`FileId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`FileId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 512
    }
}

impl FromStr for FileId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FileId`")
    }
}

/// Not-yet-recorded piece of evidence accepted from the boundary.
#[derive(Clone, Debug)]
pub struct Upload {
    /// [`Kind`] of the uploaded document.
    pub kind: Kind,

    /// Reference to the stored file in the external document store.
    pub file: FileId,
}

impl From<Upload> for Document {
    fn from(upload: Upload) -> Self {
        let Upload { kind, file } = upload;
        Self {
            id: Id::new(),
            kind,
            file,
            uploaded_at: DateTimeOf::now(),
            review: None,
        }
    }
}

/// Officer verdict upon a single [`Document`].
#[derive(Clone, Debug)]
pub struct Review {
    /// [`Verdict`] of this [`Review`].
    pub verdict: Verdict,

    /// Mandatory [`audit::Notes`] explaining the [`Verdict`].
    pub notes: audit::Notes,

    /// ID of the [`User`] who reviewed the [`Document`].
    ///
    /// [`User`]: crate::domain::User
    pub reviewed_by: user::Id,

    /// [`DateTime`] when the [`Review`] was performed.
    pub reviewed_at: ReviewDateTime,
}

define_kind! {
    #[doc = "Verdict of a [`Review`]."]
    enum Verdict {
        #[doc = "The [`Document`] is accepted."]
        Approved = 1,

        #[doc = "The [`Document`] is rejected."]
        Rejected = 2,

        #[doc = "The [`Document`] must be revised and resubmitted."]
        NeedsRevision = 3,
    }
}

/// [`DateTime`] when a [`Document`] was uploaded.
pub type UploadDateTime = DateTimeOf<(Document, unit::Creation)>;

/// [`DateTime`] when a [`Review`] was performed.
pub type ReviewDateTime = DateTimeOf<(Review, unit::Decision)>;
