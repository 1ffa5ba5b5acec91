//! Captured credential record.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// One username/password pair submitted by a client.
///
/// Built only after both lines arrived; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCredential {
    captured_at: DateTime<Utc>,
    source_ip: IpAddr,
    username: String,
    password: String,
}

impl CapturedCredential {
    /// Capture at the current instant, truncated to whole seconds.
    pub fn new(source_ip: IpAddr, username: String, password: String) -> Self {
        Self::at(Utc::now(), source_ip, username, password)
    }

    pub fn at(
        captured_at: DateTime<Utc>,
        source_ip: IpAddr,
        username: String,
        password: String,
    ) -> Self {
        Self {
            captured_at: captured_at.trunc_subsecs(0),
            source_ip,
            username,
            password,
        }
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn source_ip(&self) -> IpAddr {
        self.source_ip
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// The credential log line, newline included.
    pub fn to_log_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for CapturedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | IP={} | USER={} | PASS={}",
            self.captured_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            self.source_ip,
            self.username,
            self.password
        )
    }
}
