mod report_status;

pub use report_status::ReportStatus;
