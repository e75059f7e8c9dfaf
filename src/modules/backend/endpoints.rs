/// Paths of the municipal backend REST API, relative to `BACKEND_BASE_URL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEndpoint {
    /// `GET` lists all reports, `POST` creates one (multipart)
    Reports,
    /// Reports created by the caller
    MyReports,
    /// Reports assigned to the calling staff member
    AssignedReports,
    /// `GET`/`PUT`/`DELETE` a single report
    Report(String),
    AssignReport(String),
    ReportStatus(String),
}

impl BackendEndpoint {
    pub fn path(&self) -> String {
        match self {
            BackendEndpoint::Reports => "/reports".to_string(),
            BackendEndpoint::MyReports => "/reports/my/reports".to_string(),
            BackendEndpoint::AssignedReports => "/reports/assigned/me".to_string(),
            BackendEndpoint::Report(id) => format!("/reports/{}", urlencoding::encode(id)),
            BackendEndpoint::AssignReport(id) => {
                format!("/reports/{}/assign", urlencoding::encode(id))
            }
            BackendEndpoint::ReportStatus(id) => {
                format!("/reports/{}/status", urlencoding::encode(id))
            }
        }
    }
}
