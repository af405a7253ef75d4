pub mod directory;
pub mod matching;
pub mod media;
pub mod presentation;
pub mod ranking;
pub mod search;
pub mod sequencing;
pub mod shaping;
pub mod survey;

pub use directory::DoctorDirectoryService;
pub use matching::match_score;
pub use media::MediaResolver;
pub use presentation::DoctorPresenter;
pub use ranking::{rank_doctors, RankKey};
pub use search::DoctorSearchService;
pub use sequencing::{SearchSequencer, SearchTicket};
pub use shaping::{shape_results, ShapedDoctor};
pub use survey::{SurveyAnswers, SurveyMatch, SurveyMatchView};
