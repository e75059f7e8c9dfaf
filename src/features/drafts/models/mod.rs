mod details;
mod draft;
mod location;
mod media;
mod report_fields;
mod session;

pub use details::DraftDetails;
pub use draft::ReportDraft;
pub use location::{CoordinateUpdate, DraftLocation, GeocodeTicket};
pub use media::{
    IncomingFile, MediaError, MediaFile, MediaIntake, MediaKind, PreviewHandle, PreviewRegistry,
};
pub use report_fields::{ReportCategory, ReportPriority, ReportSeverity};
pub use session::{MapState, WizardSession, WizardStep};
