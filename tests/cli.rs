use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ADMIN: &str = "admin@weldmatch.test";
const WELDER: &str = "welder@weldmatch.test";
const EMPLOYER: &str = "employer@weldmatch.test";
const PASSWORD: &str = "spatter-and-slag";

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"key_params":{"memory_cost":8,"time_cost":1,"parallelism":1}}"#,
    )
    .unwrap();
    dir
}

fn weldmatch(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("weldmatch").unwrap();
    cmd.env("WELDMATCH_DATA_DIR", dir.path())
        .env("WELDMATCH_MASTER_KEY", "integration-master-secret")
        .env("RUST_LOG", "off")
        .env_remove("WELDMATCH_USER")
        .env_remove("WELDMATCH_PASSWORD");
    cmd
}

fn add_user(dir: &TempDir, email: &str, role: &str) {
    weldmatch(dir)
        .args(["--as", ADMIN, "--password", PASSWORD, "user", "add", email, "--role", role])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Created user: {}", email)));
}

fn setup() -> TempDir {
    let dir = data_dir();
    weldmatch(&dir).arg("init").assert().success();
    add_user(&dir, ADMIN, "admin");
    add_user(&dir, WELDER, "welder");
    add_user(&dir, EMPLOYER, "employer");
    dir
}

fn create_welder_profile(dir: &TempDir) -> String {
    let output = weldmatch(dir)
        .args([
            "--as",
            WELDER,
            "profile",
            "create",
            "welder_profiles",
            "--set",
            "first_name=Alex",
            "--set",
            "ssn=123-45-6789",
            "--set",
            "phone=555-867-0199",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find_map(|l| l.strip_prefix("Created welder_profiles record: "))
        .unwrap()
        .trim()
        .to_string()
}

#[test]
fn fields_lists_registry() {
    let dir = data_dir();
    weldmatch(&dir)
        .args(["fields", "certifications"])
        .assert()
        .success()
        .stdout(predicate::str::contains("certificate_number"))
        .stdout(predicate::str::contains("ssn").not());
}

#[test]
fn fields_rejects_unknown_entity() {
    let dir = data_dir();
    weldmatch(&dir)
        .args(["fields", "invoices"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown entity"));
}

#[test]
fn init_writes_master_key() {
    let dir = data_dir();
    weldmatch(&dir)
        .env_remove("WELDMATCH_MASTER_KEY")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated master key"));

    assert!(dir.path().join("master.key").exists());

    weldmatch(&dir)
        .env_remove("WELDMATCH_MASTER_KEY")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Master key already exists"));
}

#[test]
fn only_admin_creates_admins() {
    let dir = setup();
    weldmatch(&dir)
        .args([
            "--as", WELDER, "--password", PASSWORD, "user", "add", "x@weldmatch.test", "--role",
            "admin",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"));
}

#[test]
fn show_masks_sensitive_fields() {
    let dir = setup();
    let record = create_welder_profile(&dir);

    weldmatch(&dir)
        .args(["--as", WELDER, "profile", "show", "welder_profiles", record.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("***-**-6789"))
        .stdout(predicate::str::contains("Alex"))
        .stdout(predicate::str::contains("123-45-6789").not());

    let stored =
        std::fs::read_to_string(dir.path().join("data").join("welder_profiles.json")).unwrap();
    assert!(!stored.contains("123-45-6789"));
    assert!(stored.contains("enc:v1:"));
}

#[test]
fn reveal_needs_correct_password() {
    let dir = setup();
    let record = create_welder_profile(&dir);

    weldmatch(&dir)
        .args([
            "--as", WELDER, "--password", "not-the-password", "profile", "reveal",
            "welder_profiles", record.as_str(), "ssn",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect password"));

    weldmatch(&dir)
        .args([
            "--as", WELDER, "--password", PASSWORD, "profile", "reveal", "welder_profiles",
            record.as_str(), "ssn",
        ])
        .assert()
        .success()
        .stdout("123-45-6789\n");

    weldmatch(&dir)
        .args(["--as", ADMIN, "audit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VERIFY_FAIL"))
        .stdout(predicate::str::contains("REVEAL"))
        .stdout(predicate::str::contains("[ssn]"))
        .stdout(predicate::str::contains("123-45-6789").not());
}

#[test]
fn lockout_persists_between_runs() {
    let dir = setup();
    let record = create_welder_profile(&dir);
    let reveal_with = |password: &str| {
        weldmatch(&dir)
            .args([
                "--as", WELDER, "--password", password, "profile", "reveal", "welder_profiles",
                record.as_str(), "ssn",
            ])
            .assert()
            .failure()
    };

    for _ in 0..4 {
        reveal_with("not-the-password").stderr(predicate::str::contains("Incorrect password"));
    }
    reveal_with("not-the-password").stderr(predicate::str::contains("Verification locked"));

    // Still locked in a fresh run, even with the right password
    reveal_with(PASSWORD)
        .stderr(predicate::str::contains("Verification locked"))
        .stdout(predicate::str::contains("123-45-6789").not());
}

#[test]
fn oversized_auto_hide_is_a_config_error() {
    let dir = setup();
    let record = create_welder_profile(&dir);
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"key_params":{"memory_cost":8,"time_cost":1,"parallelism":1},
            "reveal":{"auto_hide_secs":100000000000000000}}"#,
    )
    .unwrap();

    weldmatch(&dir)
        .args(["--as", WELDER, "profile", "show", "welder_profiles", record.as_str()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("auto_hide_secs"));
}

#[test]
fn employer_sees_masked_but_cannot_reveal() {
    let dir = setup();
    let record = create_welder_profile(&dir);

    weldmatch(&dir)
        .args(["--as", EMPLOYER, "profile", "show", "welder_profiles", record.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("(***) ***-0199"));

    weldmatch(&dir)
        .args([
            "--as", EMPLOYER, "--password", PASSWORD, "profile", "reveal", "welder_profiles",
            record.as_str(), "phone",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"));
}

#[test]
fn update_and_export() {
    let dir = setup();
    let record = create_welder_profile(&dir);

    weldmatch(&dir)
        .args([
            "--as",
            WELDER,
            "profile",
            "update",
            "welder_profiles",
            record.as_str(),
            "--set",
            "phone=555-000-1111",
            "--unset",
            "first_name",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated welder_profiles"));

    weldmatch(&dir)
        .args([
            "--as", WELDER, "--password", PASSWORD, "profile", "export", "welder_profiles",
            record.as_str(), "--format", "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"phone\": \"555-000-1111\""))
        .stdout(predicate::str::contains("first_name").not());

    weldmatch(&dir)
        .args(["--as", ADMIN, "audit", "export"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("timestamp,action,user_id"))
        .stdout(predicate::str::contains(",EXPORT,"));
}

#[test]
fn non_admin_cannot_export_audit() {
    let dir = setup();
    weldmatch(&dir)
        .args(["--as", WELDER, "audit", "export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"));
}
