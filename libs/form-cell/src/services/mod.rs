pub mod assessments;
pub mod forms;

pub use assessments::AssessmentService;
pub use forms::FormService;
