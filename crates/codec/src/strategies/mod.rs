mod parallel;
mod rowwise;

pub use parallel::ParallelRowRuns;
pub use rowwise::RowRuns;
