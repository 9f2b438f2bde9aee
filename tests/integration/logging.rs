use tempfile::TempDir;
use treefs::logging::{init_logging, LogOutput, LoggingConfig, LoggingError};
use treefs::FileSystem;

// Only test in this binary that touches the global subscriber.
#[test]
fn init_logging_installs_once() {
    let temp = TempDir::new().unwrap();
    let config = LoggingConfig {
        enabled: false,
        output: LogOutput::File,
        file: Some(temp.path().join("treefs.log")),
        ..LoggingConfig::default()
    };

    init_logging(&config).unwrap();
    FileSystem::in_memory().create_directory("/after-init").unwrap();

    assert!(matches!(
        init_logging(&config),
        Err(LoggingError::AlreadyInitialized)
    ));
}
