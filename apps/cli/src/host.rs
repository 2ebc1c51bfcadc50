use reconcile::{AccessError, ConsentHost, OpMode, USAGE_STATS_OP, USAGE_STATS_OP_CODE};

/// Consent answers taken from the CLI config; this host has no privacy
/// subsystem of its own.
pub struct ConfigHost {
    usage_access: bool,
}

impl ConfigHost {
    pub fn new(usage_access: bool) -> Self {
        Self { usage_access }
    }

    fn mode(&self) -> OpMode {
        if self.usage_access {
            OpMode::Allowed
        } else {
            OpMode::Ignored
        }
    }
}

impl ConsentHost for ConfigHost {
    fn check_op(&self, op: &str) -> OpMode {
        if op == USAGE_STATS_OP {
            self.mode()
        } else {
            OpMode::Default
        }
    }

    fn check_op_code(&self, code: u32) -> Result<OpMode, AccessError> {
        if code == USAGE_STATS_OP_CODE {
            Ok(self.mode())
        } else {
            Err(AccessError::UnsupportedOp(code))
        }
    }

    fn permission_granted(&self, _permission: &str) -> bool {
        self.usage_access
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reconcile::{UsageAccess, select_access};

    use super::*;

    #[test]
    fn config_answer_reaches_both_access_paths() {
        for version in [21, 28, 29, 34] {
            assert!(select_access(version, Arc::new(ConfigHost::new(true))).is_granted());
            assert!(!select_access(version, Arc::new(ConfigHost::new(false))).is_granted());
        }
    }
}
