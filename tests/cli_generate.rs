use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn vcr() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("vcr"))
}

/// Config whose generator is /bin/cat: the "generated" document is the
/// fixture itself, which is how the suite's own smoke path works.
fn cat_config(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, r#"{"generator": "/bin/cat"}"#).unwrap();
    path
}

fn write_fixture(dir: &std::path::Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

const VALID_CREDENTIAL: &str = r#"{
  "@context": ["https://www.w3.org/2018/credentials/v1", "https://example.com/contexts/v1"],
  "id": "http://example.gov/credentials/3732",
  "type": ["VerifiableCredential", "UniversityDegreeCredential"],
  "issuer": "https://example.edu",
  "issuanceDate": "2020-03-16T22:37:26.544Z",
  "credentialSubject": {"id": "did:example:abcdef"}
}"#;

#[test]
fn generate_prints_the_parsed_document() {
    let tmp = TempDir::new().unwrap();
    let config = cat_config(tmp.path());
    write_fixture(tmp.path(), "example-1.jsonld", VALID_CREDENTIAL);

    vcr()
        .args([
            "generate",
            "--config",
            config.to_str().unwrap(),
            "--input-dir",
            tmp.path().to_str().unwrap(),
            "example-1.jsonld",
        ])
        .assert()
        .success()
        .stdout(contains("https://www.w3.org/2018/credentials/v1"))
        .stdout(contains("UniversityDegreeCredential"));
}

#[test]
fn generate_rejects_fixture_with_invalidity_marker() {
    let tmp = TempDir::new().unwrap();
    let config = cat_config(tmp.path());
    write_fixture(tmp.path(), "example-1-bad-url.jsonld", VALID_CREDENTIAL);

    vcr()
        .args([
            "generate",
            "--config",
            config.to_str().unwrap(),
            "--input-dir",
            tmp.path().to_str().unwrap(),
            "example-1-bad-url.jsonld",
        ])
        .assert()
        .failure()
        .stderr(contains("invalid fixture"));
}

#[test]
fn generate_token_prints_raw_stdout() {
    let tmp = TempDir::new().unwrap();
    let config = cat_config(tmp.path());
    write_fixture(tmp.path(), "example-1.jsonld", "eyJhbGciOiJub25lIn0.e30.\n");

    vcr()
        .args([
            "generate",
            "--token",
            "--config",
            config.to_str().unwrap(),
            "--input-dir",
            tmp.path().to_str().unwrap(),
            "example-1.jsonld",
        ])
        .assert()
        .success()
        .stdout(contains("eyJhbGciOiJub25lIn0.e30."));
}

#[test]
fn generate_without_presentation_generator_fails_for_presentations() {
    let tmp = TempDir::new().unwrap();
    let config = cat_config(tmp.path());
    write_fixture(tmp.path(), "example-1.jsonld", VALID_CREDENTIAL);

    vcr()
        .args([
            "generate",
            "--presentation",
            "--config",
            config.to_str().unwrap(),
            "--input-dir",
            tmp.path().to_str().unwrap(),
            "example-1.jsonld",
        ])
        .assert()
        .failure()
        .stderr(contains("no generator for presentations"));
}

#[test]
fn check_passes_for_canonical_context() {
    let tmp = TempDir::new().unwrap();
    let config = cat_config(tmp.path());
    write_fixture(tmp.path(), "example-1.jsonld", VALID_CREDENTIAL);

    vcr()
        .args([
            "check",
            "--config",
            config.to_str().unwrap(),
            "--input-dir",
            tmp.path().to_str().unwrap(),
            "example-1.jsonld",
        ])
        .assert()
        .success()
        .stdout(contains("ok: example-1.jsonld"));
}

#[test]
fn check_fails_for_wrong_canonical_context() {
    let tmp = TempDir::new().unwrap();
    let config = cat_config(tmp.path());
    write_fixture(
        tmp.path(),
        "example-9.jsonld",
        r#"{"@context": ["https://example.com/v9"], "type": "VerifiableCredential"}"#,
    );

    vcr()
        .args([
            "check",
            "--config",
            config.to_str().unwrap(),
            "--input-dir",
            tmp.path().to_str().unwrap(),
            "example-9.jsonld",
        ])
        .assert()
        .failure()
        .stderr(contains("@context"));
}
