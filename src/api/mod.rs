pub mod audio;
pub mod report;
pub mod video;

pub use audio::SpeechAnalyzer;
pub use report::InterviewReport;
pub use video::{AnalyzerError, AxisReport, DetectorSet, InterviewAnalyzer};
