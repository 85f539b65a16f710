#[cfg(test)]
mod auth_command_tests {
    use assert_cmd::prelude::*;
    use predicates::prelude::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn zcrm_in_temp_config() -> (Command, TempDir) {
        let config_dir = TempDir::new().unwrap();
        let mut cmd = Command::cargo_bin("zcrm").unwrap();
        cmd.env("ZCRM_CONFIG_DIR", config_dir.path());
        (cmd, config_dir)
    }

    #[test]
    fn test_generate_access_token_requires_a_grant_token() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        cmd.arg("auth")
            .arg("generate-access-token")
            .assert()
            .failure()
            .stderr(predicate::str::contains("GRANT_TOKEN"));
    }

    #[test]
    fn test_refresh_access_token_without_a_stored_token_warns_and_succeeds() {
        // No token has ever been stored in the throwaway configuration
        // directory, so the command must finish without calling out to
        // the accounts server.
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        cmd.arg("auth").arg("refresh-access-token").assert().success();
    }

    #[test]
    fn test_first_run_creates_a_default_configuration_file() {
        let (mut cmd, config_dir) = zcrm_in_temp_config();

        cmd.arg("config").arg("path").assert().success();
        assert!(config_dir.path().join("config.yml").exists());
    }

    #[test]
    fn test_config_path_points_into_the_configuration_directory() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        cmd.arg("config")
            .arg("path")
            .assert()
            .success()
            .stdout(predicate::str::contains("config.yml"));
    }

    #[test]
    fn test_config_get_prints_the_configuration_as_json() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        cmd.arg("config")
            .arg("get")
            .assert()
            .success()
            .stdout(predicate::str::contains("client_id"));
    }

    #[test]
    fn test_config_export_writes_the_requested_file() {
        let (mut cmd, config_dir) = zcrm_in_temp_config();
        let exported = config_dir.path().join("exported.yml");

        cmd.arg("config")
            .arg("export")
            .arg("--output")
            .arg(&exported)
            .assert()
            .success();
        assert!(exported.exists());
    }

    #[test]
    fn test_config_export_requires_an_output_path() {
        let (mut cmd, _config_dir) = zcrm_in_temp_config();

        cmd.arg("config")
            .arg("export")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--output"));
    }
}
