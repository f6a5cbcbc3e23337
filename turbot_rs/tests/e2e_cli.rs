//! End-to-End CLI Tests for turbot
//!
//! Each test runs the real binary in a scratch directory with its own HOME,
//! credential file and, where the API is involved, a fake Turbot API.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Read;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;

/// One request seen by the fake API: method, url (with query) and body.
type Seen = (String, String, String);

/// Serve `responses` in order, one per request, then stop.
fn fake_api(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Seen>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind fake api");
    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .expect("tcp port");
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(20)) else {
                break;
            };
            let mut request_body = String::new();
            let _ = request.as_reader().read_to_string(&mut request_body);
            seen.push((
                request.method().to_string(),
                request.url().to_string(),
                request_body,
            ));
            let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("header");
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
        seen
    });
    (format!("http://127.0.0.1:{}", port), handle)
}

/// The binary, isolated in `dir`.
fn turbot(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("turbot");
    cmd.current_dir(dir)
        .env_clear()
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("TURBOT_NETRC", dir.join(".netrc"))
        .env("TURBOT_HOST", "http://127.0.0.1:9");
    cmd
}

/// The binary pointed at `host` with a non-interactive API key.
fn turbot_with_key(dir: &Path, host: &str) -> Command {
    let mut cmd = turbot(dir);
    cmd.env("TURBOT_HOST", host).env("TURBOT_API_KEY", "apikey01");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run turbot");
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================
// Help and Dispatch
// ============================================

mod help_and_dispatch {
    use super::*;

    #[test]
    fn no_arguments_shows_root_help() {
        let temp = TempDir::new().expect("temp dir");
        turbot(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "Usage: turbot COMMAND [--bot BOT] [command-specific-options]\n",
            ))
            .stdout(predicate::str::contains(
                "  auth  # Login or logout from Turbot\n",
            ))
            .stdout(predicate::str::contains("Additional topics:"));
    }

    #[test]
    fn help_flag_matches_help_command() {
        let temp = TempDir::new().expect("temp dir");
        let via_flag = stdout_of(turbot(temp.path()).args(["bots:info", "-h"]));
        let via_help = stdout_of(turbot(temp.path()).args(["help", "bots:info"]));
        assert_eq!(via_flag, via_help);
        assert!(via_flag.starts_with("Usage: turbot bots:info\n"));
        assert!(via_flag.contains("-s, --shell"));
    }

    #[test]
    fn help_for_alias_names_its_target() {
        let temp = TempDir::new().expect("temp dir");
        turbot(temp.path())
            .args(["help", "push"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "Alias: push redirects to bots:push\nUsage: turbot bots:push\n",
            ));
    }

    #[test]
    fn namespace_help_lists_its_commands() {
        let temp = TempDir::new().expect("temp dir");
        turbot(temp.path())
            .args(["help", "auth"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Additional commands, type \"turbot help COMMAND\" for more details:",
            ))
            .stdout(predicate::str::contains("  auth:login   # Login to Turbot"));
    }

    #[test]
    fn unknown_command_is_suggested() {
        let temp = TempDir::new().expect("temp dir");
        turbot(temp.path())
            .arg("bot")
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(
                " !    `bot` is not a turbot command.\n !    Perhaps you meant `bots`.\n !    See `turbot help` for a list of available commands.\n",
            );
    }

    #[test]
    fn version_prints_user_agent() {
        let temp = TempDir::new().expect("temp dir");
        let expected = format!("turbot/{} (", env!("CARGO_PKG_VERSION"));
        turbot(temp.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::starts_with(expected));
    }

    #[test]
    fn missing_option_value_shows_help_and_fails() {
        let temp = TempDir::new().expect("temp dir");
        turbot(temp.path())
            .args(["bots:info", "--bot"])
            .assert()
            .code(1)
            .stdout(predicate::str::starts_with("Usage: turbot bots:info\n"))
            .stderr(" !    missing argument: --bot\n");
    }

    #[test]
    fn extra_arguments_are_rejected() {
        let temp = TempDir::new().expect("temp dir");
        turbot(temp.path())
            .args(["version", "a", "b"])
            .assert()
            .code(1)
            .stdout(predicate::str::starts_with("Usage: turbot version\n"))
            .stderr(" !    Invalid arguments: \"a\" and \"b\"\n");
    }
}

// ============================================
// Auth
// ============================================

mod auth {
    use super::*;

    #[test]
    fn token_comes_from_environment_key() {
        let temp = TempDir::new().expect("temp dir");
        turbot_with_key(temp.path(), "http://127.0.0.1:9")
            .arg("auth:token")
            .assert()
            .success()
            .stdout("apikey01\n");
    }

    #[test]
    fn whoami_without_credentials_fails() {
        let temp = TempDir::new().expect("temp dir");
        turbot(temp.path())
            .arg("auth:whoami")
            .assert()
            .code(1)
            .stderr(" !    not logged in\n");
    }

    #[test]
    fn login_saves_credentials_to_netrc() {
        let temp = TempDir::new().expect("temp dir");
        let (host, server) = fake_api(vec![(200, r#"{"api_key": "abc123"}"#)]);
        turbot(temp.path())
            .env("TURBOT_HOST", &host)
            .arg("login")
            .write_stdin("me@example.com\nsecret\n")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("Enter your Turbot email and password.\n"))
            .stdout(predicate::str::ends_with("Authentication successful.\n"));

        let seen = server.join().expect("server");
        assert_eq!(seen[0].0, "POST");
        assert_eq!(seen[0].1, "/api/users/api_key");
        assert!(seen[0].2.contains("me@example.com"));

        let netrc = std::fs::read_to_string(temp.path().join(".netrc")).expect("netrc");
        assert!(netrc.contains("machine api.127.0.0.1"));
        assert!(netrc.contains("machine code.127.0.0.1"));
        assert!(netrc.contains("abc123"));

        turbot(temp.path())
            .env("TURBOT_HOST", &host)
            .arg("auth:whoami")
            .assert()
            .success()
            .stdout("me@example.com\n");
    }

    #[test]
    fn stale_key_triggers_login_and_retry() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(
            temp.path().join(".netrc"),
            "# personal\nmachine api.127.0.0.1 login me@example.com password stale\n",
        )
        .expect("netrc");
        let (host, server) = fake_api(vec![
            (401, "{}"),
            (200, r#"{"api_key": "fresh"}"#),
            (200, r#"{"data": []}"#),
        ]);
        turbot(temp.path())
            .env("TURBOT_HOST", &host)
            .arg("bots")
            .write_stdin("me@example.com\nsecret\n")
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "Authentication failure\nEnter your Turbot email and password.\n",
            ))
            .stdout(predicate::str::ends_with(
                "Authentication successful.\nYou have no bots.\n",
            ));

        let seen = server.join().expect("server");
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].1, "/api/bots?api_key=stale");
        assert_eq!(seen[1].1, "/api/users/api_key");
        assert_eq!(seen[2].1, "/api/bots?api_key=fresh");

        let netrc = std::fs::read_to_string(temp.path().join(".netrc")).expect("netrc");
        assert!(netrc.starts_with("# personal\nmachine api.127.0.0.1 login me@example.com password fresh\n"));
    }

    #[test]
    fn rejected_environment_key_is_fatal() {
        let temp = TempDir::new().expect("temp dir");
        let (host, server) = fake_api(vec![(401, "{}")]);
        turbot_with_key(temp.path(), &host)
            .arg("bots")
            .assert()
            .code(1)
            .stdout("Authentication failure\n");
        assert_eq!(server.join().expect("server").len(), 1);
    }
}

// ============================================
// Bots
// ============================================

mod bots {
    use super::*;

    const MANIFEST: &str = r#"{
        "bot_id": "example",
        "data_type": "dummy",
        "files": ["scraper.rb"],
        "identifying_fields": ["name"],
        "language": "ruby"
    }"#;

    #[test]
    fn empty_bot_list() {
        let temp = TempDir::new().expect("temp dir");
        let (host, server) = fake_api(vec![(200, r#"{"data": []}"#)]);
        turbot_with_key(temp.path(), &host)
            .arg("bots")
            .assert()
            .success()
            .stdout("You have no bots.\n");
        let seen = server.join().expect("server");
        assert_eq!(seen[0].1, "/api/bots?api_key=apikey01");
    }

    #[test]
    fn bot_list_is_sorted() {
        let temp = TempDir::new().expect("temp dir");
        let (host, _server) =
            fake_api(vec![(200, r#"{"data": [{"bot_id": "zeta"}, {"bot_id": "alpha"}]}"#)]);
        turbot_with_key(temp.path(), &host)
            .arg("list")
            .assert()
            .success()
            .stdout("=== Bots\nalpha\nzeta\n\n");
    }

    #[test]
    fn upstream_error_message_is_shown() {
        let temp = TempDir::new().expect("temp dir");
        let (host, _server) = fake_api(vec![(
            402,
            r#"{"error_code": "bot-not-found", "message": "No bot registered for bot_id example\nIf you have renamed your bot, ..."}"#,
        )]);
        turbot_with_key(temp.path(), &host)
            .args(["bots:info", "--bot", "example"])
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(" !    No bot registered for bot_id example\n !    If you have renamed your bot, ...\n");
    }

    #[test]
    fn info_uses_manifest_bot_and_shell_output() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join("manifest.json"), MANIFEST).expect("manifest");
        let (host, server) = fake_api(vec![(
            200,
            r#"{"data": {"bot_id": "example", "state": "scheduled", "created_at": "2010-01-01T00:00:00.000Z"}}"#,
        )]);
        turbot_with_key(temp.path(), &host)
            .args(["info", "--shell"])
            .assert()
            .success()
            .stdout("bot_id=example\ncreated_at=2010-01-01T00:00:00.000Z\nstate=scheduled\n");
        let seen = server.join().expect("server");
        assert_eq!(seen[0].1, "/api/bots/example?api_key=apikey01");
    }

    #[test]
    fn no_bot_anywhere() {
        let temp = TempDir::new().expect("temp dir");
        turbot_with_key(temp.path(), "http://127.0.0.1:9")
            .arg("bots:info")
            .assert()
            .code(1)
            .stderr(predicate::str::starts_with(" !    No bot specified.\n"));
    }

    #[test]
    fn generate_writes_template_and_registers() {
        let temp = TempDir::new().expect("temp dir");
        let (host, server) = fake_api(vec![
            (404, r#"{"message": "Bot not found"}"#),
            (200, r#"{"data": {"bot_id": "my_bot"}}"#),
        ]);
        turbot_with_key(temp.path(), &host)
            .args(["bots:generate", "--bot", "my_bot", "--language", "python"])
            .assert()
            .success()
            .stdout("Created new bot template at my_bot!\n");

        let bot_dir = temp.path().join("my_bot");
        assert!(bot_dir.join("scraper.py").is_file());
        assert!(bot_dir.join("LICENSE.txt").is_file());
        let manifest = std::fs::read_to_string(bot_dir.join("manifest.json")).expect("manifest");
        assert!(manifest.contains("\"bot_id\": \"my_bot\""));
        assert!(manifest.contains("\"scraper.py\""));

        let seen = server.join().expect("server");
        assert_eq!(seen[1].0, "POST");
        assert!(seen[1].1.starts_with("/api/bots?"));
        assert!(seen[1].2.contains("\"bot_id\":\"my_bot\""));
    }

    #[test]
    fn generate_refuses_registered_bot() {
        let temp = TempDir::new().expect("temp dir");
        let (host, _server) = fake_api(vec![(200, r#"{"data": {"bot_id": "my_bot"}}"#)]);
        turbot_with_key(temp.path(), &host)
            .args(["bots:generate", "--bot", "my_bot"])
            .assert()
            .code(1)
            .stderr(" !    There's already a bot called my_bot registered with Turbot. Bot names must be unique.\n");
        assert!(!temp.path().join("my_bot").exists());
    }

    #[test]
    fn validate_reports_missing_manifest_key() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join("manifest.json"), MANIFEST).expect("manifest");
        turbot(temp.path())
            .arg("bots:validate")
            .assert()
            .code(1)
            .stderr(" !    Manifest is missing publisher\n");
    }

    #[test]
    fn push_can_be_declined() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join("manifest.json"), MANIFEST).expect("manifest");
        turbot_with_key(temp.path(), "http://127.0.0.1:9")
            .arg("push")
            .write_stdin("n\n")
            .assert()
            .code(1)
            .stdout(predicate::str::starts_with(
                "This will submit your bot and its data for review.\n",
            ))
            .stderr(" !    Aborting push\n");
    }

    #[test]
    fn push_uploads_archive() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join("manifest.json"), MANIFEST).expect("manifest");
        std::fs::write(temp.path().join("scraper.rb"), "puts '{}'\n").expect("scraper");
        let (host, server) = fake_api(vec![(200, r#"{"data": {}}"#)]);
        turbot_with_key(temp.path(), &host)
            .arg("bots:push")
            .write_stdin("\n")
            .assert()
            .success()
            .stdout(predicate::str::ends_with("as soon as we can. THANK YOU!\n"));
        let seen = server.join().expect("server");
        assert_eq!(seen[0].0, "PUT");
        assert!(seen[0].1.starts_with("/api/bots/example/code?"));
    }
}
