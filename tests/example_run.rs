//! Integration tests for the `example run` command.
use branchcast::cli::RunOpts;
use branchcast::cli::example::handle_example_run_command;
use branchcast::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("BRANCHCAST_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().join("results")),
        overwrite: false,
        as_of: None,
    };
    handle_example_run_command("demo", &opts, Some(Settings::default())).unwrap();
}
