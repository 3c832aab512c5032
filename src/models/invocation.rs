use serde::Serialize;

use super::cost::CostReport;
use crate::config::InvocationConfig;
use crate::error::NotifierError;

pub const SUCCESS_MESSAGE: &str = "Cost notification sent to Discord";

// ---------------------------------------------------------------------------
// InvocationResult — What the entry point hands back to the scheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: InvocationBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InvocationBody {
    Success {
        message: String,
        payload: InvocationPayload,
    },
    Failure {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct InvocationPayload {
    pub config: InvocationConfig,
    pub cost: CostReport,
}

impl InvocationResult {
    pub fn success(config: InvocationConfig, cost: CostReport) -> Self {
        Self {
            status_code: 200,
            body: InvocationBody::Success {
                message: SUCCESS_MESSAGE.to_string(),
                payload: InvocationPayload { config, cost },
            },
        }
    }

    pub fn failure(err: &NotifierError) -> Self {
        Self {
            status_code: 500,
            body: InvocationBody::Failure {
                error: format!("Cost notification failed: {err}"),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// The error string of a failed invocation.
    pub fn error(&self) -> Option<&str> {
        match &self.body {
            InvocationBody::Failure { error } => Some(error),
            InvocationBody::Success { .. } => None,
        }
    }

    /// The echoed payload of a successful invocation.
    pub fn payload(&self) -> Option<&InvocationPayload> {
        match &self.body {
            InvocationBody::Success { payload, .. } => Some(payload),
            InvocationBody::Failure { .. } => None,
        }
    }
}
