use assert_cmd::Command;
use assert_cmd::cargo_bin;
use predicates::prelude::*;

fn cli() -> Command {
    let mut cmd = Command::new(cargo_bin!("seamlesschex"));
    cmd.env("SEAMLESSCHEX_API_KEY", "sk_test_cli")
        .env("SEAMLESSCHEX_TEST_MODE", "true")
        .env_remove("SEAMLESSCHEX_STORE")
        .env_remove("SEAMLESSCHEX_MEMO");
    cmd
}

#[test]
fn test_unsupported_operation_is_rejected() {
    cli()
        .arg("refund")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "The refund operation is not implemented by this gateway",
        ));
}

#[test]
fn test_unknown_operation_is_rejected() {
    cli()
        .arg("teleport")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown operation: teleport"));
}

#[test]
fn test_missing_operation_prints_usage() {
    cli()
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage: seamlesschex"));
}

#[test]
fn test_purchase_without_amount_fails_before_sending() {
    cli()
        .arg("purchase")
        .arg("-")
        .write_stdin(
            r#"{
                "memo": "test",
                "card": {
                    "first_name": "Example",
                    "last_name": "Customer",
                    "number": "1111000016",
                    "routing": "999900001",
                    "email": "customer@example.com"
                }
            }"#,
        )
        .assert()
        .failure()
        .stderr(predicate::str::contains("The amount parameter is required"));
}

#[test]
fn test_tokenization_with_invalid_routing_fails_before_sending() {
    cli()
        .arg("create_token")
        .write_stdin(
            r#"{
                "store": "store.com",
                "card": {
                    "firstName": "Example",
                    "lastName": "Customer",
                    "bank_account": "1111-0000-16",
                    "bank_routing": "12345678"
                }
            }"#,
        )
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Bank Account routing number should be 9 digits",
        ));
}

#[test]
fn test_missing_options_file_is_reported() {
    cli()
        .arg("purchase")
        .arg("does-not-exist.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to read options from does-not-exist.json",
        ));
}
