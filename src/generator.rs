//! Transport adapter for driving implementation generators.
//!
//! One uniform `generate` call covers the three ways an implementation can
//! be exercised: a local subprocess that prints a document, a REST endpoint
//! that returns one inside a response envelope, and a subprocess that prints
//! a raw signed token for the JWT tests. The mode is an explicit tagged
//! variant picked from configuration shape up front, so the call site never
//! branches on field presence.
//!
//! A single attempt per call, no retry. A rejected call is not inherently a
//! harness failure: for fixtures named with the invalidity marker the
//! *caller* expects rejection, and the test layer decides which polarity is
//! correct.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::{Artifact, ConfigError, GeneratorConfig};

/// Substring in a fixture filename marking it as deliberately invalid. Every
/// transport mode must reject such fixtures.
pub const INVALID_FIXTURE_MARKER: &str = "bad";

#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Subprocess wrote to stderr, exited nonzero, or timed out.
    #[error("generator execution failed: {0}")]
    Execution(String),

    /// Subprocess output was not a well-formed document.
    #[error("generator output is not a well-formed document: {0}")]
    Parse(#[from] serde_json::Error),

    /// HTTP transport failure: timeout, non-2xx status, or a response
    /// envelope missing the expected field.
    #[error("generator request failed: {0}")]
    Request(String),

    /// The fixture is marked invalid; the adapter refuses to hand its
    /// output to the caller.
    #[error("no output for invalid fixture {0}")]
    InvalidFixture(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read fixture {path}: {source}")]
    Fixture {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What the caller wants back from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A parsed JSON document.
    Document,
    /// The raw stdout string, uninterpreted; the caller decodes it as a
    /// compact JWS.
    Token,
}

/// Result of one adapter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    Document(Value),
    Token(String),
}

impl Generated {
    pub fn as_document(&self) -> Option<&Value> {
        match self {
            Generated::Document(doc) => Some(doc),
            Generated::Token(_) => None,
        }
    }
}

/// Resolved transport, built once from configuration shape.
#[derive(Debug, Clone)]
enum Transport {
    /// Run `<command> <options> <fixture path>` and parse stdout.
    Subprocess {
        command: String,
        options: Vec<String>,
        timeout: Duration,
    },
    /// POST the fixture to `<base_url><path>` with bearer auth.
    Http {
        url: String,
        auth_header: Option<String>,
        timeout: Duration,
        artifact: Artifact,
    },
    /// Subprocess transport returning raw stdout as a token string.
    TokenSubprocess {
        command: String,
        options: Vec<String>,
        timeout: Duration,
    },
}

/// One implementation's generator, bound to an input-fixture directory.
pub struct Generator {
    transport: Transport,
    input_dir: PathBuf,
}

impl Generator {
    /// Select the transport from configuration shape: a `restapi` block
    /// means HTTP; otherwise a subprocess, plain or token-producing
    /// depending on `output`.
    pub fn from_config(
        config: &GeneratorConfig,
        artifact: Artifact,
        output: OutputKind,
        input_dir: &Path,
    ) -> Result<Self, GeneratorError> {
        let target = config.generator_for(artifact)?.to_string();

        let transport = if let Some(rest) = &config.restapi {
            if output == OutputKind::Token {
                warn!("restapi config ignores token output, returning documents");
            }
            let auth_header = rest.oauth_token.as_ref().map(|token| {
                let scheme = rest.oauth_token_type.as_deref().unwrap_or("Bearer");
                format!("{scheme} {token}")
            });
            Transport::Http {
                url: format!("{}{}", rest.base_url.trim_end_matches('/'), target),
                auth_header,
                timeout: Duration::from_millis(rest.timeout_ms),
                artifact,
            }
        } else {
            let options = match &config.generator_options {
                Some(raw) => shell_words::split(raw)
                    .map_err(|e| GeneratorError::Execution(format!("bad generatorOptions: {e}")))?,
                None => Vec::new(),
            };
            let timeout = Duration::from_millis(config.subprocess_timeout_ms);
            match output {
                OutputKind::Document => Transport::Subprocess {
                    command: target,
                    options,
                    timeout,
                },
                OutputKind::Token => Transport::TokenSubprocess {
                    command: target,
                    options,
                    timeout,
                },
            }
        };

        Ok(Self {
            transport,
            input_dir: input_dir.to_path_buf(),
        })
    }

    /// Produce a document (or raw token) from the named fixture. One
    /// attempt; any transport failure surfaces as an error to the caller.
    pub async fn generate(&self, fixture: &str) -> Result<Generated, GeneratorError> {
        let result = match &self.transport {
            Transport::Subprocess {
                command,
                options,
                timeout,
            } => {
                let stdout = self.run_subprocess(command, options, fixture, *timeout).await?;
                Ok(Generated::Document(serde_json::from_str(&stdout)?))
            }
            Transport::TokenSubprocess {
                command,
                options,
                timeout,
            } => {
                let stdout = self.run_subprocess(command, options, fixture, *timeout).await?;
                Ok(Generated::Token(stdout.trim().to_string()))
            }
            Transport::Http {
                url,
                auth_header,
                timeout,
                artifact,
            } => self.request(url, auth_header.as_deref(), *timeout, *artifact, fixture).await,
        };

        // Fixtures marked invalid must never yield output, even when the
        // generator under test happily produced some.
        if fixture.contains(INVALID_FIXTURE_MARKER) {
            debug!(fixture, "rejecting output for invalid fixture");
            return Err(GeneratorError::InvalidFixture(fixture.to_string()));
        }
        result
    }

    async fn run_subprocess(
        &self,
        command: &str,
        options: &[String],
        fixture: &str,
        timeout: Duration,
    ) -> Result<String, GeneratorError> {
        let fixture_path = self.input_dir.join(fixture);
        let mut argv = shell_words::split(command)
            .map_err(|e| GeneratorError::Execution(format!("bad generator command: {e}")))?;
        if argv.is_empty() {
            return Err(GeneratorError::Execution("empty generator command".into()));
        }
        let program = argv.remove(0);
        argv.extend_from_slice(options);
        argv.push(fixture_path.to_string_lossy().into_owned());

        debug!(program = %program, args = ?argv, "spawning generator");
        let child = Command::new(&program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        let output = tokio::time::timeout(timeout, child)
            .await
            .map_err(|_| {
                GeneratorError::Execution(format!(
                    "generator timed out after {}ms",
                    timeout.as_millis()
                ))
            })?
            .map_err(|e| GeneratorError::Execution(format!("failed to spawn {program}: {e}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(GeneratorError::Execution(stderr.trim().to_string()));
        }
        if !output.status.success() {
            return Err(GeneratorError::Execution(format!(
                "generator exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn request(
        &self,
        url: &str,
        auth_header: Option<&str>,
        timeout: Duration,
        artifact: Artifact,
        fixture: &str,
    ) -> Result<Generated, GeneratorError> {
        let fixture_path = self.input_dir.join(fixture);
        let fixture_doc: Value = serde_json::from_str(
            &std::fs::read_to_string(&fixture_path).map_err(|source| GeneratorError::Fixture {
                path: fixture_path.clone(),
                source,
            })?,
        )?;

        let (request_field, response_field) = match artifact {
            Artifact::Credential => ("credential", "credential"),
            Artifact::Presentation => ("presentation", "presentation"),
        };
        let body = serde_json::json!({ request_field: fixture_doc, "options": {} });

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeneratorError::Request(e.to_string()))?;
        let mut request = client.post(url).json(&body);
        if let Some(auth) = auth_header {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GeneratorError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Request(format!(
                "{url} returned {status}"
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| GeneratorError::Request(format!("malformed response envelope: {e}")))?;
        let document = envelope.get(response_field).cloned().ok_or_else(|| {
            GeneratorError::Request(format!(
                "response envelope is missing `{response_field}`"
            ))
        })?;
        Ok(Generated::Document(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn subprocess_config(command: &str) -> GeneratorConfig {
        serde_json::from_str(&format!(r#"{{"generator": "{command}"}}"#)).unwrap()
    }

    fn write_fixture(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn subprocess_mode_parses_stdout_as_document() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(tmp.path(), "example-1.jsonld", r#"{"@context": ["https://www.w3.org/2018/credentials/v1"]}"#);

        let config = subprocess_config("/bin/cat");
        let generator =
            Generator::from_config(&config, Artifact::Credential, OutputKind::Document, tmp.path())
                .unwrap();
        let generated = generator.generate("example-1.jsonld").await.unwrap();
        let doc = generated.as_document().unwrap();
        assert_eq!(
            doc["@context"][0],
            "https://www.w3.org/2018/credentials/v1"
        );
    }

    #[tokio::test]
    async fn invalid_fixture_is_rejected_even_when_generator_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(tmp.path(), "example-1-bad-url.jsonld", r#"{"@context": []}"#);

        let config = subprocess_config("/bin/cat");
        let generator =
            Generator::from_config(&config, Artifact::Credential, OutputKind::Document, tmp.path())
                .unwrap();
        let err = generator.generate("example-1-bad-url.jsonld").await.unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidFixture(_)));
    }

    #[tokio::test]
    async fn unparseable_stdout_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(tmp.path(), "example-1.jsonld", "this is not json");

        let config = subprocess_config("/bin/cat");
        let generator =
            Generator::from_config(&config, Artifact::Credential, OutputKind::Document, tmp.path())
                .unwrap();
        let err = generator.generate("example-1.jsonld").await.unwrap_err();
        assert!(matches!(err, GeneratorError::Parse(_)));
    }

    #[tokio::test]
    async fn missing_fixture_surfaces_as_execution_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config = subprocess_config("/bin/cat");
        let generator =
            Generator::from_config(&config, Artifact::Credential, OutputKind::Document, tmp.path())
                .unwrap();
        // cat prints the error on stderr, which the adapter treats as failure.
        let err = generator.generate("missing.jsonld").await.unwrap_err();
        assert!(matches!(err, GeneratorError::Execution(_)));
    }

    #[tokio::test]
    async fn token_mode_returns_raw_stdout() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(tmp.path(), "example-1.jsonld", "eyJhbGciOiJub25lIn0.e30.\n");

        let config = subprocess_config("/bin/cat");
        let generator =
            Generator::from_config(&config, Artifact::Credential, OutputKind::Token, tmp.path())
                .unwrap();
        match generator.generate("example-1.jsonld").await.unwrap() {
            Generated::Token(token) => assert_eq!(token, "eyJhbGciOiJub25lIn0.e30."),
            Generated::Document(_) => panic!("expected a token"),
        }
    }

    #[test]
    fn http_transport_is_selected_by_restapi_presence() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{"generator": "/credentials/issue", "restapi": {"baseUrl": "https://x.example"}}"#,
        )
        .unwrap();
        let generator = Generator::from_config(
            &config,
            Artifact::Credential,
            OutputKind::Document,
            Path::new("/tmp"),
        )
        .unwrap();
        assert!(matches!(generator.transport, Transport::Http { .. }));
    }
}
