mod report_form;
mod wizard_service;

pub use report_form::{FormPart, ReportForm};
pub use wizard_service::WizardService;
