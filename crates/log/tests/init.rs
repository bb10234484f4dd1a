//! Global installation
//!
//! Kept in its own test binary: only one subscriber can be installed per
//! process.

use keycycle_log::{Config, Fields, Format, LogError};

#[test]
fn test_second_init_fails_cleanly() {
    // GIVEN a JSON logger with global fields
    let config = Config {
        fields: Fields {
            service: Some("keycycle".into()),
            ..Fields::default()
        },
        ..Config::production()
    }
    .with_format(Format::Json);

    // WHEN it is installed twice
    let guard = keycycle_log::init_with(config).unwrap();
    tracing::info!(accounts = 1, "installed");
    let second = keycycle_log::init();

    // THEN the second attempt reports an error instead of panicking
    assert!(matches!(second, Err(LogError::Init(_))));
    drop(guard);
}
