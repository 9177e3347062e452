//! Annotation report port trait.

use crate::domain::error::JournalError;
use crate::domain::journal::AnnotatedTrade;

/// Port for writing annotated journal rows.
pub trait ReportPort {
    fn write(&self, annotations: &[AnnotatedTrade]) -> Result<(), JournalError>;
}
