// Authors: Robert Lopez

use std::fmt;

/// A simple error type to mimic `panic!` via the
/// `test_error!` macro when using `TestServer::run_test`.
///
/// ---
/// Example Usage:
/// ```
///
/// let test_server: TestServer = ...;
///
/// test_server.run_test(
///     |uploader, server| async move {
///         let outcome = uploader.upload(file).await;
///
///         if !outcome.is_success() {
///             // Ends test, by returning `Err(TestError(message))`
///             test_error!("upload failed: {:?}", outcome);
///         }
///
///         Ok(())
///     }
/// ).await.unwrap();
/// ```
#[derive(Debug)]
pub struct TestError(pub String);

/// Macro to mimic `panic!` when using `TestServer::run_test`.
#[macro_export]
macro_rules! test_error {
    ($fmt:expr $(, $arg:expr)*) => {
        return Err($crate::tests::util::test_error::TestError(format!($fmt $(, $arg)*)).into())
    };
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TestError {}
