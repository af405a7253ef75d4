pub mod navigation;
pub mod review;
pub mod session;

pub use navigation::{access_for, Access, Route};
pub use review::{build_checklist, ApplicationReviewService};
pub use session::{AuthSession, SessionManager};
