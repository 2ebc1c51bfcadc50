//! Usage-access permission checks.
//!
//! The host's consent subsystem is only ever read. Newer platforms answer a
//! named op check; older ones only know the numeric op code and, when even
//! that is unavailable, the plain permission grant.

use std::sync::Arc;

use log::debug;

pub const USAGE_STATS_OP: &str = "get_usage_stats";
pub const USAGE_STATS_OP_CODE: u32 = 43;
pub const USAGE_STATS_PERMISSION: &str = "package_usage_stats";
/// First platform version that answers named op checks.
pub const NAMED_OP_MIN_PLATFORM: u32 = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    Allowed,
    Ignored,
    Errored,
    Default,
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("op code {0} is not supported by this host")]
    UnsupportedOp(u32),
    #[error("consent host error: {0}")]
    Host(String),
}

/// Whether usage statistics may be read. Must be cheap and side-effect free.
pub trait UsageAccess: Send + Sync {
    fn is_granted(&self) -> bool;
}

/// Read-only view of the host privacy/consent subsystem.
pub trait ConsentHost: Send + Sync {
    fn check_op(&self, op: &str) -> OpMode;
    fn check_op_code(&self, code: u32) -> Result<OpMode, AccessError>;
    fn permission_granted(&self, permission: &str) -> bool;
}

pub struct NamedOpAccess {
    host: Arc<dyn ConsentHost>,
}

impl NamedOpAccess {
    pub fn new(host: Arc<dyn ConsentHost>) -> Self {
        Self { host }
    }
}

impl UsageAccess for NamedOpAccess {
    fn is_granted(&self) -> bool {
        self.host.check_op(USAGE_STATS_OP) == OpMode::Allowed
    }
}

pub struct LegacyOpAccess {
    host: Arc<dyn ConsentHost>,
}

impl LegacyOpAccess {
    pub fn new(host: Arc<dyn ConsentHost>) -> Self {
        Self { host }
    }
}

impl UsageAccess for LegacyOpAccess {
    fn is_granted(&self) -> bool {
        match self.host.check_op_code(USAGE_STATS_OP_CODE) {
            Ok(mode) => mode == OpMode::Allowed,
            Err(err) => {
                debug!("op code check failed ({}); using permission grant", err);
                self.host.permission_granted(USAGE_STATS_PERMISSION)
            }
        }
    }
}

/// Fixed answer, for hosts without a consent subsystem.
#[derive(Debug, Clone, Copy)]
pub struct StaticAccess(pub bool);

impl UsageAccess for StaticAccess {
    fn is_granted(&self) -> bool {
        self.0
    }
}

pub fn select_access(platform_version: u32, host: Arc<dyn ConsentHost>) -> Arc<dyn UsageAccess> {
    if platform_version >= NAMED_OP_MIN_PLATFORM {
        Arc::new(NamedOpAccess::new(host))
    } else {
        Arc::new(LegacyOpAccess::new(host))
    }
}
