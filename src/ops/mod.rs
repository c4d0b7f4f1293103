pub mod category_ops;
pub mod subtask_ops;
pub mod task_ops;
pub mod view;

pub use task_ops::TaskError;
