//! Shared helpers for integration tests.
//!
//! The media tools and the answer backend are replaced by small `sh`
//! scripts; the speech provider is a wiremock server.

use orflax::config::{CompanionConfig, ServerConfig};
use orflax::{AppState, CompanionServer};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bytes served as "compressed audio" by the mock speech provider.
pub(crate) const FAKE_MP3: &[u8] = b"ID3-fake-mp3-bytes";

/// Write an executable shell script.
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Stand-in for `ffmpeg -y -i <in> <out>`: copies the input.
pub(crate) fn fake_ffmpeg(dir: &Path) -> PathBuf {
    write_script(dir, "ffmpeg", r#"cp "$3" "$4""#)
}

/// Stand-in for `rhubarb -f json -o <out> -r <recognizer> <wav>`.
pub(crate) fn fake_rhubarb(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "rhubarb",
        r#"printf '{"metadata":{"soundFile":"%s","duration":0.4},"mouthCues":[{"start":0.0,"end":0.2,"value":"B"},{"start":0.2,"end":0.4,"value":"X"}]}' "$7" > "$4""#,
    )
}

/// Answer backend that prints a diagnostic line followed by `document`.
pub(crate) fn answer_script(dir: &Path, document: &str) -> PathBuf {
    write_script(
        dir,
        "answer",
        &format!("echo \"Querying: $1\"\ncat <<'EOF'\n{document}\nEOF"),
    )
}

/// Mock speech provider answering synthesis and voice-list calls.
pub(crate) async fn mock_tts() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/text-to-speech/[^/]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "voices": [{"voice_id": "9BWtsMINqrJLrRacOk9x", "name": "Aria"}]
        })))
        .mount(&server)
        .await;
    server
}

/// Config wired to scripts in `dir` and the speech provider at `tts_url`.
pub(crate) fn test_config(dir: &Path, tts_url: &str, answer_document: &str) -> CompanionConfig {
    let mut config = CompanionConfig::default();
    config.server = ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
    };
    config.answer.program = answer_script(dir, answer_document);
    config.answer.args = Vec::new();
    config.answer.timeout_secs = 10;
    config.tts.api_url = tts_url.to_owned();
    config.tts.api_key = "test-key".to_owned();
    config.tools.ffmpeg = fake_ffmpeg(dir);
    config.tools.rhubarb = fake_rhubarb(dir);
    config.tools.timeout_secs = 10;
    config.pipeline.artifact_dir = dir.join("artifacts");
    config.scripts.dir = dir.join("scripts");
    config
}

/// Start a server for `config` on an ephemeral port.
pub(crate) async fn start_server(config: &CompanionConfig) -> CompanionServer {
    let state = AppState::from_config(config).await;
    CompanionServer::start(state, &config.server)
        .await
        .expect("start server")
}

pub(crate) fn url(server: &CompanionServer, path: &str) -> String {
    format!("http://{}{path}", server.addr())
}
