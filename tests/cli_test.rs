//! Integration tests for the ectoken CLI.
//!
//! Tests argument parsing, help text, version output, subcommand routing,
//! encrypt/decrypt/roundtrip behavior, and error handling.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ectoken");
    cmd.env_remove("ECTOKEN_KEY").env_remove("RUST_LOG");
    cmd
}

// --- Help and Version ---

#[test]
fn test_no_args_shows_usage_hint() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_flag_shows_description() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Edgecast"))
        .stdout(predicate::str::contains("encrypt"))
        .stdout(predicate::str::contains("decrypt"))
        .stdout(predicate::str::contains("roundtrip"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ectoken"))
        .stdout(predicate::str::contains("0.1.0"));
}

// --- Subcommand Help ---

#[test]
fn test_encrypt_help_shows_claim_options() {
    cmd()
        .args(["encrypt", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--valid-for"))
        .stdout(predicate::str::contains("--allow-country"))
        .stdout(predicate::str::contains("--allow-url"))
        .stdout(predicate::str::contains("--client-ip"))
        .stdout(predicate::str::contains("--plaintext"))
        .stdout(predicate::str::contains("--key-env"));
}

#[test]
fn test_encrypt_help_includes_shell_history_warning() {
    cmd()
        .args(["encrypt", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shell history"));
}

#[test]
fn test_decrypt_help_shows_options() {
    cmd()
        .args(["decrypt", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--token-env"))
        .stdout(predicate::str::contains("--time-travel"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("[TOKEN]"));
}

#[test]
fn test_unknown_subcommand_fails() {
    cmd().arg("unknown").assert().failure().stderr(
        predicate::str::contains("invalid value 'unknown'")
            .or(predicate::str::contains("unrecognized subcommand")),
    );
}

// --- Encrypt ---

#[test]
fn test_encrypt_outputs_decryptable_token() {
    let output = cmd()
        .args([
            "encrypt",
            "--valid-for",
            "365d",
            "--allow-country",
            "DE",
            "--allow-url",
            "/assets",
            "--key",
            common::TEST_KEY,
        ])
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let token = common::decrypt_with_test_key(&stdout);
    assert_eq!(token.allowed_countries()[0].as_str(), "DE");
    assert_eq!(token.allowed_urls(), ["/assets"]);
    assert!(token.expires_at().is_some());
}

#[test]
fn test_encrypt_json_mode_outputs_valid_json() {
    let output = cmd()
        .args([
            "encrypt",
            "--json",
            "--expires-at",
            "1700000000",
            "--allow-country",
            "de,fr",
            "--key",
            common::TEST_KEY,
        ])
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON output");
    assert_eq!(
        parsed["plaintext"],
        "ec_expire=1700000000&ec_country_allow=DE,FR"
    );
    assert_eq!(parsed["claims"]["ec_expire"], 1700000000);
    let token = common::decrypt_with_test_key(parsed["token"].as_str().unwrap());
    assert_eq!(token.to_plaintext(), parsed["plaintext"]);
}

#[test]
fn test_encrypt_from_plaintext() {
    let output = cmd()
        .args(["encrypt", "--plaintext", common::KAT_PLAINTEXT])
        .env("MY_CDN_KEY", common::TEST_KEY)
        .args(["--key-env", "MY_CDN_KEY"])
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let token = common::decrypt_with_test_key(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(token.to_plaintext(), common::KAT_PLAINTEXT);
}

#[test]
fn test_encrypt_invalid_plaintext_fails() {
    cmd()
        .args(["encrypt", "--plaintext", "ec_expire", "--key", common::TEST_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed claim segment"));
}

#[test]
fn test_encrypt_without_claims_fails() {
    cmd()
        .args(["encrypt", "--key", common::TEST_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("token is empty"));
}

#[test]
fn test_encrypt_invalid_country_fails() {
    cmd()
        .args(["encrypt", "--allow-country", "Germany", "--key", common::TEST_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ec_country_allow"));
}

#[test]
fn test_encrypt_invalid_duration_fails() {
    cmd()
        .args(["encrypt", "--valid-for", "7x", "--allow-url", "/a", "--key", "k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown unit 'x'"));
}

#[test]
fn test_encrypt_without_key_fails() {
    cmd()
        .args(["encrypt", "--allow-url", "/assets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no key provided"));
}

#[test]
fn test_encrypt_uses_default_key_env_var() {
    let output = cmd()
        .args(["encrypt", "--allow-url", "/assets"])
        .env("ECTOKEN_KEY", common::TEST_KEY)
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let token = common::decrypt_with_test_key(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(token.allowed_urls(), ["/assets"]);
}

#[test]
fn test_encrypt_key_env_not_set_shows_error() {
    cmd()
        .args(["encrypt", "--allow-url", "/a", "--key-env", "NONEXISTENT_EC_KEY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NONEXISTENT_EC_KEY"));
}

#[test]
fn test_encrypt_empty_key_fails() {
    cmd()
        .args(["encrypt", "--allow-url", "/a", "--key", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key must not be empty"));
}

// --- Decrypt ---

#[test]
fn test_decrypt_shows_plaintext_and_claims() {
    cmd()
        .args(["decrypt", common::KAT_TOKEN, "--key", common::TEST_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Plaintext ---"))
        .stdout(predicate::str::contains(common::KAT_PLAINTEXT))
        .stdout(predicate::str::contains("--- Claims ---"))
        .stdout(predicate::str::contains("\"ec_country_allow\""))
        .stdout(predicate::str::contains("\"/assets\""));
}

#[test]
fn test_decrypt_shows_expired_status() {
    cmd()
        .args(["decrypt", common::KAT_TOKEN, "--key", common::TEST_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token Status"))
        .stdout(predicate::str::contains("Expires at:   2023-11-14T22:13:20Z"))
        .stdout(predicate::str::contains("EXPIRED"));
}

#[test]
fn test_decrypt_time_travel_before_expiry_is_valid() {
    cmd()
        .args([
            "decrypt",
            common::KAT_TOKEN,
            "--key",
            common::TEST_KEY,
            "--time-travel",
            "2023-11-13T22:13:20Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID (expires in 1d)"))
        .stdout(predicate::str::contains("Evaluated at: 2023-11-13T22:13:20Z"));
}

#[test]
fn test_decrypt_invalid_time_travel_fails() {
    cmd()
        .args([
            "decrypt",
            common::KAT_TOKEN,
            "--key",
            common::TEST_KEY,
            "--time-travel",
            "yesterday",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid time expression"));
}

#[test]
fn test_decrypt_json_mode_outputs_valid_json() {
    let output = cmd()
        .args(["decrypt", "--json", common::KAT_TOKEN, "--key", common::TEST_KEY])
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON output");
    assert_eq!(parsed["plaintext"], common::KAT_PLAINTEXT);
    assert_eq!(parsed["claims"]["ec_country_allow"][0], "DE");
    assert_eq!(parsed["claims"]["ec_url_allow"][0], "/assets");
    assert_eq!(parsed["status"]["state"], "expired");
}

#[test]
fn test_decrypt_json_mode_no_section_headers() {
    cmd()
        .args(["decrypt", "--json", common::KAT_TOKEN, "--key", common::TEST_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Claims ---").not())
        .stdout(predicate::str::contains("Token Status").not());
}

#[test]
fn test_decrypt_output_has_no_color_when_piped() {
    cmd()
        .args(["decrypt", common::KAT_TOKEN, "--key", common::TEST_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_decrypt_from_stdin_with_trailing_newline() {
    cmd()
        .args(["decrypt", "--key", common::TEST_KEY])
        .write_stdin(format!("{}\n", common::KAT_TOKEN))
        .assert()
        .success()
        .stdout(predicate::str::contains(common::KAT_PLAINTEXT));
}

#[test]
fn test_decrypt_oversized_stdin_fails() {
    cmd()
        .args(["decrypt", "--key", common::TEST_KEY])
        .write_stdin("A".repeat(64 * 1024 + 1))
        .assert()
        .failure()
        .stderr(predicate::str::contains("input too large"));
}

#[test]
fn test_decrypt_from_env_var() {
    cmd()
        .args(["decrypt", "--token-env", "TEST_EC_TOKEN", "--key", common::TEST_KEY])
        .env("TEST_EC_TOKEN", common::KAT_TOKEN)
        .assert()
        .success()
        .stdout(predicate::str::contains(common::KAT_PLAINTEXT));
}

#[test]
fn test_decrypt_env_var_not_set_shows_error() {
    cmd()
        .args(["decrypt", "--token-env", "NONEXISTENT_EC_TOKEN", "--key", "k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NONEXISTENT_EC_TOKEN"));
}

#[test]
fn test_decrypt_invalid_env_var_name_with_equals() {
    cmd()
        .args(["decrypt", "--token-env", "BAD=NAME", "--key", "k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid environment variable name"));
}

#[test]
fn test_decrypt_no_token_shows_error() {
    cmd()
        .args(["decrypt", "--key", common::TEST_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no token provided"));
}

#[test]
fn test_decrypt_empty_token_arg_shows_error() {
    cmd()
        .args(["decrypt", "", "--key", common::TEST_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no token provided"));
}

#[test]
fn test_decrypt_wrong_key_fails() {
    cmd()
        .args(["decrypt", common::KAT_TOKEN, "--key", common::WRONG_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("decryption failed"));
}

#[test]
fn test_decrypt_invalid_base64_shows_error() {
    cmd()
        .args(["decrypt", common::INVALID_TOKEN, "--key", common::TEST_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base64url"));
}

#[test]
fn test_decrypt_short_token_shows_error() {
    cmd()
        .args(["decrypt", "AAAA", "--key", common::TEST_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("token too short"));
}

#[test]
fn test_decrypt_error_does_not_echo_key() {
    cmd()
        .args(["decrypt", common::KAT_TOKEN, "--key", "hunter2-secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hunter2-secret").not());
}

// --- Encrypt | Decrypt pipeline ---

#[test]
fn test_encrypt_output_pipes_into_decrypt() {
    let encrypted = cmd()
        .args([
            "encrypt",
            "--valid-for",
            "1h",
            "--allow-proto",
            "https",
            "--deny-country",
            "us",
            "--key",
            common::TEST_KEY,
        ])
        .output()
        .expect("failed to execute");
    assert!(encrypted.status.success());

    cmd()
        .args(["decrypt", "--key", common::TEST_KEY])
        .write_stdin(encrypted.stdout)
        .assert()
        .success()
        .stdout(predicate::str::contains("ec_country_deny=US"))
        .stdout(predicate::str::contains("ec_proto_allow=https"))
        .stdout(predicate::str::contains("VALID"));
}

// --- Roundtrip ---

#[test]
fn test_roundtrip_prints_each_stage() {
    cmd()
        .args([
            "roundtrip",
            "--valid-for",
            "365d",
            "--allow-country",
            "DE",
            "--allow-url",
            "/assets",
            "--key",
            common::TEST_KEY,
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^token: ec_expire=\d+&ec_country_allow=DE&ec_url_allow=/assets$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^encrypted: [A-Za-z0-9_-]+$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^decrypted: ec_expire=\d+&ec_country_allow=DE&ec_url_allow=/assets$").unwrap());
}

#[test]
fn test_roundtrip_invalid_claim_fails_before_printing() {
    cmd()
        .args(["roundtrip", "--allow-url", "assets", "--key", common::TEST_KEY])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("URL path must start with '/'"));
}

#[test]
fn test_roundtrip_without_claims_uses_demonstration_token() {
    cmd()
        .args(["roundtrip", "--key", common::TEST_KEY])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^token: ec_expire=\d+&ec_country_allow=DE&ec_url_allow=/assets$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^decrypted: ec_expire=\d+&ec_country_allow=DE&ec_url_allow=/assets$").unwrap());
}

// --- Logging ---

#[test]
fn test_verbose_logs_go_to_stderr() {
    cmd()
        .args(["-v", "roundtrip", "--allow-url", "/assets", "--key", common::TEST_KEY])
        .assert()
        .success()
        .stderr(predicate::str::contains("round trip succeeded"))
        .stdout(predicate::str::contains("round trip succeeded").not());
}

#[test]
fn test_quiet_by_default() {
    cmd()
        .args(["roundtrip", "--allow-url", "/assets", "--key", common::TEST_KEY])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_debug_logs_redact_plaintext() {
    cmd()
        .args([
            "-vv",
            "encrypt",
            "--plaintext",
            "ec_country_allow=DE&ec_url_allow=/secretpath",
            "--key",
            common::TEST_KEY,
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("dispatching"))
        .stderr(predicate::str::contains("/secretpath").not());
}

#[test]
fn test_debug_logs_redact_claim_values() {
    cmd()
        .args(["-vv", "roundtrip", "--allow-url", "/secretpath", "--key", common::TEST_KEY])
        .assert()
        .success()
        .stderr(predicate::str::contains("dispatching"))
        .stderr(predicate::str::contains("/secretpath").not());
}

#[test]
fn test_logs_have_no_color_when_piped() {
    cmd()
        .args(["-v", "roundtrip", "--allow-url", "/assets", "--key", common::TEST_KEY])
        .assert()
        .success()
        .stderr(predicate::str::contains("round trip succeeded"))
        .stderr(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_json_log_format() {
    cmd()
        .args([
            "-v",
            "--log-format",
            "json",
            "encrypt",
            "--allow-url",
            "/assets",
            "--key",
            common::TEST_KEY,
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("\"level\":\"INFO\""));
}

// --- Exit Codes ---

#[test]
fn test_help_exits_with_zero() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_no_args_exits_with_nonzero() {
    cmd().assert().failure();
}
