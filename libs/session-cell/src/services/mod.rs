pub mod assignment;
pub mod daily;
pub mod history;
pub mod queue;
pub mod reconcile;

pub use assignment::AssignmentService;
pub use daily::DailyChairsService;
pub use history::MeetingService;
pub use queue::QueueService;
