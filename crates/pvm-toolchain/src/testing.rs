//! Fakes for the process and network seams.

use crate::transport::Transport;
use async_trait::async_trait;
use pvm_core::{CommandOutput, CommandRunner, Error, Invocation, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// SHA-256 of `ARCHIVE_BODY`.
pub const ARCHIVE_SHA256: &str = "0c982986710a026635603031674053ca851fc0e3ea760094a34f59b84f7f6da6";

pub const ARCHIVE_BODY: &str = "archive-bytes";

/// A two-release manifest; only `php-8.4.1.tar.gz` carries a digest of
/// [`ARCHIVE_BODY`].
pub fn sample_manifest_json() -> &'static str {
    r#"{
  "8": {
    "announcement": true,
    "date": "21 Nov 2024",
    "tags": ["security"],
    "source": [
      {
        "filename": "php-8.4.1.tar.gz",
        "name": "PHP 8.4.1 (tar.gz)",
        "sha256": "0c982986710a026635603031674053ca851fc0e3ea760094a34f59b84f7f6da6",
        "date": "21 Nov 2024"
      },
      {
        "filename": "php-8.4.1.tar.xz",
        "name": "PHP 8.4.1 (tar.xz)",
        "sha256": "94c8a4fd419d45748951fa6d73bd55f6bdf0adaefb8814880a67baa66027311f",
        "date": "21 Nov 2024"
      }
    ],
    "version": "8.4.1",
    "supported_versions": ["8.1", "8.2", "8.3", "8.4"]
  },
  "7": {
    "announcement": true,
    "date": "03 Nov 2022",
    "tags": [],
    "source": [
      {
        "filename": "php-7.4.33.tar.gz",
        "name": "PHP 7.4.33 (tar.gz)",
        "sha256": "5a2337996f07c8a097e03d46263b5c98d2c8e355227756351421003bea8f463e",
        "date": "03 Nov 2022"
      }
    ],
    "version": "7.4.33"
  }
}"#
}

/// Records invocations and simulates what tar, configure and make leave on disk.
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    fail_on: Option<String>,
    side_effects: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            side_effects: true,
        }
    }

    /// Exit non-zero for `program`.
    pub fn fail_on(mut self, program: &str) -> Self {
        self.fail_on = Some(program.to_string());
        self
    }

    pub fn without_side_effects(mut self) -> Self {
        self.side_effects = false;
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.program).collect()
    }

    fn simulate(&self, invocation: &Invocation) -> CommandOutput {
        self.calls.lock().unwrap().push(invocation.clone());

        if self.fail_on.as_deref() == Some(invocation.program.as_str()) {
            return CommandOutput {
                exit_code: 2,
                stdout: String::new(),
                stderr: format!("{}: simulated failure", invocation.program),
                duration: Duration::ZERO,
            };
        }

        if self.side_effects {
            let cwd = invocation.working_dir.clone().unwrap_or_default();
            match invocation.program.as_str() {
                "tar" => simulate_tar(&invocation.args),
                "./configure" => std::fs::write(cwd.join("Makefile"), "all:\n").unwrap(),
                "make" => {
                    std::fs::create_dir_all(cwd.join("sapi/cli")).unwrap();
                    std::fs::write(cwd.join("sapi/cli/php"), "").unwrap();
                }
                _ => {}
            }
        }

        CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            duration: Duration::ZERO,
        }
    }
}

fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn simulate_tar(args: &[String]) {
    let (Some(archive), Some(dest)) = (arg_after(args, "-xzf"), arg_after(args, "-C")) else {
        return;
    };
    let name = Path::new(archive)
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(".tar.gz"))
        .unwrap_or("php-unknown");
    let dir = PathBuf::from(dest).join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("configure"), "#!/bin/sh\n").unwrap();
    std::fs::write(dir.join("php.ini-development"), "").unwrap();
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        Ok(self.simulate(invocation))
    }

    async fn capture(&self, invocation: &Invocation) -> Result<CommandOutput> {
        Ok(self.simulate(invocation))
    }
}

/// Serves fixed bodies by URL and counts requests.
pub struct StaticTransport {
    documents: HashMap<String, Vec<u8>>,
    gets: AtomicUsize,
    downloads: AtomicUsize,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            gets: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl AsRef<[u8]>) -> Self {
        self.documents.insert(url.into(), body.as_ref().to_vec());
        self
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn lookup(&self, url: &str) -> Result<&[u8]> {
        self.documents
            .get(url)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::DistributionFetch {
                url: url.to_string(),
                message: "HTTP 404 Not Found".to_string(),
                source: None,
                fixes: vec![],
            })
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.lookup(url).map(<[u8]>::to_vec)
    }

    async fn download(&self, url: &str, dest: &Path, _label: &str) -> Result<u64> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let body = self.lookup(url)?;
        std::fs::write(dest, body).unwrap();
        Ok(body.len() as u64)
    }
}
