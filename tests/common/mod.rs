pub use flowdag_test_utils::builders;
pub use flowdag_test_utils::proxies;
pub use flowdag_test_utils::{collecting_sink, drive_to_settle, init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
