#[cfg(test)]
mod cli_help_tests {
    use assert_cmd::prelude::*;
    use std::process::Command;
    use tempfile::TempDir;

    /// Point the binary at a throwaway configuration directory so the
    /// tests never touch the user's real configuration.
    fn zcrm_in_temp_config() -> (Command, TempDir) {
        let config_dir = TempDir::new().unwrap();
        let mut cmd = Command::cargo_bin("zcrm").unwrap();
        cmd.env("ZCRM_CONFIG_DIR", config_dir.path());
        (cmd, config_dir)
    }

    #[test]
    fn test_cli_help_output() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        let assert_result = cmd.arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        // Verify that the help output contains expected elements
        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Options:"));
        assert!(help_output.contains("Commands:"));

        // Verify that the command groups are present
        assert!(help_output.contains("auth"));
        assert!(help_output.contains("config"));

        // Verify that help flags are present
        assert!(help_output.contains("-h, --help"));
        assert!(help_output.contains("-V, --version"));

        // Verify that the application name appears in the help
        assert!(help_output.contains("zcrm"));
    }

    #[test]
    fn test_auth_subcommand_help() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        let assert_result = cmd.arg("auth").arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("generate-access-token"));
        assert!(help_output.contains("refresh-access-token"));
    }

    #[test]
    fn test_generate_access_token_help_mentions_the_grant_token() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        let assert_result = cmd
            .arg("auth")
            .arg("generate-access-token")
            .arg("--help")
            .assert()
            .success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("GRANT_TOKEN"));
        assert!(help_output.contains("--format"));
        assert!(help_output.contains("--pretty"));
    }

    #[test]
    fn test_config_subcommand_help() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        let assert_result = cmd.arg("config").arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("get"));
        assert!(help_output.contains("path"));
        assert!(help_output.contains("export"));
    }

    #[test]
    fn test_running_without_a_command_shows_usage() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        let assert_result = cmd.assert().failure();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stderr);
        assert!(help_output.contains("Usage:"));
    }
}
