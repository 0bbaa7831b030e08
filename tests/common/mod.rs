//! Shared fixtures: scratch projects, git repositories and a one-shot HTTP endpoint.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const PACKAGE_JSON: &str = "{\n  \"name\": \"widget\",\n  \"version\": \"1.2.3\",\n  \"private\": true\n}\n";

pub const CONFIG_XML: &str = "<?xml version='1.0' encoding='utf-8'?>\n<widget id=\"com.acme.widget\" version=\"1.2.3\">\n    <name>Widget</name>\n</widget>\n";

pub const CHANGELOG: &str = "# Changelog\n\nGenerated by the changelog script.\n\n### 1.2.4 (2016-03-01)\n\n* **bump:** fix manifest sync\n";

/// Project directory and optional bare `origin` next to it
pub struct Fixture {
    _dir: TempDir,
    pub work: PathBuf,
    pub origin: PathBuf,
}

/// Write `files` under `dir`, creating parents
pub fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// A plain directory with the standard manifests and changelog
pub fn plain_project() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("work");
    fs::create_dir_all(&work).unwrap();
    write_files(
        &work,
        &[
            ("package.json", PACKAGE_JSON),
            ("config.xml", CONFIG_XML),
            ("CHANGELOG.md", CHANGELOG),
        ],
    );
    (dir, work)
}

/// Run git in `dir`, panicking on failure; returns trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("LC_ALL", "C")
        .output()
        .expect("git is installed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Committed project on `master` with a bare `origin` it has been pushed to
pub fn project_with_origin() -> Fixture {
    let (dir, work) = plain_project();
    let origin = dir.path().join("origin.git");
    fs::create_dir_all(&origin).unwrap();
    git(&origin, &["init", "--bare", "--quiet"]);

    git(&work, &["init", "--quiet"]);
    git(&work, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    git(&work, &["config", "user.name", "Release Bot"]);
    git(&work, &["config", "user.email", "release@example.com"]);
    git(&work, &["config", "commit.gpgsign", "false"]);
    git(&work, &["config", "tag.gpgsign", "false"]);
    git(&work, &["add", "."]);
    git(&work, &["commit", "--quiet", "-m", "init"]);
    git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);
    git(&work, &["push", "--quiet", "origin", "master"]);

    let work = fs::canonicalize(work).unwrap();
    Fixture {
        _dir: dir,
        work,
        origin,
    }
}

/// Accept one HTTP request, answer with `status` and `body`, and hand back
/// the raw request text.
pub async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Split a raw request into lowercased head and body
pub fn split_request(raw: &str) -> (String, String) {
    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    (head.to_ascii_lowercase(), body.to_string())
}
