use assert_cmd::Command;
use predicates::prelude::*;

fn bin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pwcrypt"));
    cmd.env_remove("PWCRYPT_ALGORITHM").env_remove("PWCRYPT_LOG");
    cmd
}

#[test]
fn fixed_salt_output_is_deterministic() {
    let expected = pwcrypt::crypto::crypt(b"correct horse", "$6$UD23qlwjerf$").unwrap();

    bin()
        .arg("--pipe")
        .arg("--algorithm")
        .arg("SHA512")
        .arg("--salt")
        .arg("UD23qlwjerf")
        .write_stdin("correct horse\n")
        .assert()
        .success()
        .stdout(format!("{expected}\n"));
}

#[test]
fn random_salt_uses_crypt_alphabet() {
    bin()
        .arg("--pipe")
        .write_stdin("pw\n")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\$6\$[./0-9A-Za-z]{16}\$[./0-9A-Za-z]{86}\n$").unwrap());
}

#[test]
fn sha256_by_short_flag() {
    bin()
        .args(["-p", "-a", "sha256", "-s", "saltstring"])
        .write_stdin("Hello world!\n")
        .assert()
        .success()
        .stdout("$5$saltstring$5B8vYYiY.CVt1RlTTf8KbXBH3hsxY/GNooZF.0Sh8N1\n");
}

#[test]
fn algorithm_from_environment() {
    bin()
        .env("PWCRYPT_ALGORITHM", "5")
        .args(["--pipe", "--salt", "abc"])
        .write_stdin("pw\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$5$abc$"));
}

#[test]
fn prompts_go_to_stderr_in_pipe_mode() {
    bin()
        .args(["--pipe", "--type", "email", "--salt", "abc"])
        .write_stdin("pw\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("input email passphrase:"))
        .stdout(predicate::str::contains("passphrase").not());
}

#[test]
fn confirm_retries_until_match() {
    let expected = pwcrypt::crypto::crypt(b"right!", "$6$abc$").unwrap();

    bin()
        .args(["--pipe", "--confirm", "--salt", "abc"])
        .write_stdin("wrong!\nright!\nright!\nright!\n")
        .assert()
        .success()
        .stdout(format!("{expected}\n"))
        .stderr(predicate::str::contains("inputs did not match"))
        .stderr(predicate::str::contains("repeat passphrase:"));
}

#[test]
fn no_confirm_overrides_confirm() {
    bin()
        .args(["--pipe", "--confirm", "--no-confirm", "--salt", "abc"])
        .write_stdin("pw\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("repeat").not());
}

#[test]
fn empty_input_fails() {
    bin()
        .arg("--pipe")
        .write_stdin("")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("end of input"));
}

#[test]
fn confirmation_cut_short_fails() {
    bin()
        .args(["--pipe", "--confirm"])
        .write_stdin("only once\n")
        .assert()
        .failure()
        .stdout("");
}

#[test]
fn unknown_algorithm_fails() {
    bin()
        .args(["--pipe", "--algorithm", "garbage"])
        .write_stdin("pw\n")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("crypt failed"));
}

#[test]
fn version_flag_prints_version() {
    bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_options() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--algorithm"))
        .stdout(predicate::str::contains("--salt"))
        .stdout(predicate::str::contains("--confirm"));
}
