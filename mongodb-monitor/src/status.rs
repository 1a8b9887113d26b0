//! Status fetching through the mongo shell
//!
//! The shell is spawned with an argument vector (no `sh -c`), so host, port and
//! credentials are never interpreted by a shell. Every failure mode (spawn
//! error, non-zero exit, timeout) collapses into [`StatusReply::Unreachable`].

use crate::config::{CollectorConfig, Instance};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, warn};

/// Outcome of one status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReply {
    /// Shell exited zero; raw stdout
    Alive(String),
    /// Shell could not be run, failed, or timed out
    Unreachable(String),
}

impl StatusReply {
    pub fn is_alive(&self) -> bool {
        matches!(self, StatusReply::Alive(_))
    }
}

#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch(&self, instance: &Instance) -> StatusReply;
}

/// Runs `mongo --host H --port P [-u U -p P] --quiet --eval SCRIPT`
#[derive(Debug, Clone)]
pub struct MongoShellFetcher {
    mongo_bin: PathBuf,
    eval: String,
    timeout: Duration,
}

impl MongoShellFetcher {
    pub fn new(config: &CollectorConfig) -> Self {
        Self {
            mongo_bin: config.mongo_bin.clone(),
            eval: config.eval.clone(),
            timeout: config.timeout(),
        }
    }

    /// Argument vector for one instance
    pub fn args(&self, instance: &Instance) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--host".into(),
            instance.host.clone().into(),
            "--port".into(),
            instance.port.to_string().into(),
        ];
        if let Some((user, pass)) = instance.credentials() {
            args.extend([OsString::from("-u"), user.into(), OsString::from("-p"), pass.into()]);
        }
        args.extend([OsString::from("--quiet"), OsString::from("--eval"), OsString::from(&self.eval)]);
        args
    }

    async fn run(&self, instance: &Instance) -> anyhow::Result<(String, i32)> {
        let output = tokio::time::timeout(
            self.timeout,
            AsyncCommand::new(&self.mongo_bin)
                .args(self.args(instance))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| anyhow::anyhow!("timed out after {}s", self.timeout.as_secs()))??;

        if !output.stderr.is_empty() {
            debug!("{} stderr: {}", instance, String::from_utf8_lossy(&output.stderr).trim_end());
        }

        let exit_code = output.status.code().unwrap_or(-1);
        Ok((String::from_utf8_lossy(&output.stdout).into_owned(), exit_code))
    }
}

#[async_trait]
impl StatusFetcher for MongoShellFetcher {
    async fn fetch(&self, instance: &Instance) -> StatusReply {
        let start_time = Instant::now();
        debug!("Querying serverStatus on {} via {}", instance, self.mongo_bin.display());

        let reply = match self.run(instance).await {
            Ok((stdout, 0)) => StatusReply::Alive(stdout),
            Ok((_, exit_code)) => StatusReply::Unreachable(format!("mongo shell exited with status {}", exit_code)),
            Err(e) => StatusReply::Unreachable(format!("mongo shell failed: {}", e)),
        };

        match &reply {
            StatusReply::Alive(stdout) => debug!(
                "{} answered in {}ms ({} bytes)",
                instance,
                start_time.elapsed().as_millis(),
                stdout.len()
            ),
            StatusReply::Unreachable(reason) => warn!("{} unreachable: {}", instance, reason),
        }
        reply
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    fn fetcher(bin: &str, timeout_secs: u64) -> MongoShellFetcher {
        MongoShellFetcher::new(&CollectorConfig {
            mongo_bin: PathBuf::from(bin),
            timeout_secs,
            ..CollectorConfig::default()
        })
    }

    #[test]
    fn test_args_without_credentials() {
        let args = fetcher("mongo", 5).args(&Instance::new("127.0.0.1", 27017));
        assert_eq!(
            args,
            ["--host", "127.0.0.1", "--port", "27017", "--quiet", "--eval", "printjson(db.serverStatus())"]
                .map(OsString::from)
        );
    }

    #[test]
    fn test_args_with_credentials() {
        let instance = Instance::new("db; rm -rf /", 27018).with_credentials("monitor", "p@ss word");
        let args = fetcher("mongo", 5).args(&instance);
        assert_eq!(args[1], OsString::from("db; rm -rf /"));
        assert_eq!(&args[4..8], &["-u", "monitor", "-p", "p@ss word"].map(OsString::from));
    }

    #[tokio::test]
    async fn test_zero_exit_is_alive() {
        // echo prints the argument vector it was given
        let reply = fetcher("echo", 5).fetch(&Instance::new("127.0.0.1", 27017)).await;
        match reply {
            StatusReply::Alive(stdout) => assert!(stdout.contains("--port 27017")),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_unreachable() {
        let reply = fetcher("false", 5).fetch(&Instance::new("127.0.0.1", 27017)).await;
        assert!(!reply.is_alive());
    }

    #[tokio::test]
    async fn test_missing_binary_is_unreachable() {
        let reply = fetcher("/nonexistent/mongo", 5).fetch(&Instance::new("127.0.0.1", 27017)).await;
        assert!(matches!(reply, StatusReply::Unreachable(reason) if reason.contains("failed")));
    }

    #[tokio::test]
    async fn test_hung_shell_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("hang.sh");
        {
            let mut file = std::fs::File::create(&script).unwrap();
            writeln!(file, "#!/bin/sh\nsleep 30").unwrap();
        }
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let start = Instant::now();
        let reply = fetcher(script.to_str().unwrap(), 1).fetch(&Instance::new("127.0.0.1", 27017)).await;
        assert!(matches!(reply, StatusReply::Unreachable(reason) if reason.contains("timed out")));
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
