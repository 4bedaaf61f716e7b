//! HTCondor HoldReasonCode table.
//!
//! Labels and explanations follow the HoldReasonCode list in the HTCondor
//! manual. Codes missing from the table render as `Code <n>`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Label and explanation for a HoldReasonCode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldCodeInfo {
    pub label: &'static str,
    pub reason: &'static str,
}

static HOLD_CODES: Lazy<HashMap<i64, HoldCodeInfo>> = Lazy::new(|| {
    let entries: [(i64, &str, &str); 35] = [
        (1, "UserRequest", "The user put the job on hold with condor_hold."),
        (3, "JobPolicy", "The PERIODIC_HOLD expression evaluated to True. Or, ON_EXIT_HOLD was true."),
        (4, "CorruptedCredential", "The credentials for the job are invalid."),
        (5, "JobPolicyUndefined", "A job policy expression evaluated to Undefined."),
        (6, "FailedToCreateProcess", "The condor_starter failed to start the executable."),
        (7, "UnableToOpenOutput", "The standard output file for the job could not be opened."),
        (8, "UnableToOpenInput", "The standard input file for the job could not be opened."),
        (9, "UnableToOpenOutputStream", "The standard output stream for the job could not be opened."),
        (10, "UnableToOpenInputStream", "The standard input stream for the job could not be opened."),
        (11, "InvalidTransferAck", "An internal HTCondor protocol error was encountered when transferring files."),
        (12, "TransferOutputError", "An error occurred while transferring job output files or self-checkpoint files."),
        (13, "TransferInputError", "An error occurred while transferring job input files."),
        (14, "IwdError", "The initial working directory of the job cannot be accessed."),
        (15, "SubmittedOnHold", "The user requested the job be submitted on hold."),
        (16, "SpoolingInput", "Input files are being spooled."),
        (17, "JobShadowMismatch", "A standard universe job is not compatible with the condor_shadow version available on the submitting machine."),
        (18, "InvalidTransferGoAhead", "An internal HTCondor protocol error was encountered when transferring files."),
        (19, "HookPrepareJobFailure", "<Keyword>_HOOK_PREPARE_JOB was defined but could not be executed or returned failure."),
        (20, "MissedDeferredExecutionTime", "The job missed its deferred execution time and therefore failed to run."),
        (21, "StartdHeldJob", "The job was put on hold because WANT_HOLD in the machine policy was true."),
        (22, "UnableToInitUserLog", "Unable to initialize job event log."),
        (23, "FailedToAccessUserAccount", "Failed to access user account."),
        (24, "NoCompatibleShadow", "No compatible shadow."),
        (25, "InvalidCronSettings", "Invalid cron settings."),
        (26, "SystemPolicy", "SYSTEM_PERIODIC_HOLD evaluated to true."),
        (27, "SystemPolicyUndefined", "The system periodic job policy evaluated to undefined."),
        (32, "MaxTransferInputSizeExceeded", "The maximum total input file transfer size was exceeded."),
        (33, "MaxTransferOutputSizeExceeded", "The maximum total output file transfer size was exceeded."),
        (34, "JobOutOfResources", "Memory usage exceeds a memory limit."),
        (35, "InvalidDockerImage", "Specified Docker image was invalid."),
        (36, "FailedToCheckpoint", "Job failed when sent the checkpoint signal it requested."),
        (43, "PreScriptFailed", "Pre script failed."),
        (44, "PostScriptFailed", "Post script failed."),
        (45, "SingularityTestFailed", "Test of singularity runtime failed before launching a job"),
        (46, "JobDurationExceeded", "The job's allowed duration was exceeded."),
    ];
    let mut map: HashMap<i64, HoldCodeInfo> = entries
        .into_iter()
        .map(|(code, label, reason)| (code, HoldCodeInfo { label, reason }))
        .collect();
    map.insert(
        47,
        HoldCodeInfo {
            label: "JobExecuteExceeded",
            reason: "The job's allowed execution time was exceeded.",
        },
    );
    map.insert(
        48,
        HoldCodeInfo {
            label: "HookShadowPrepareJobFailure",
            reason: "Prepare job shadow hook failed when it was executed; status code indicated job should be held.",
        },
    );
    map
});

/// Look up a HoldReasonCode.
pub fn lookup_hold_code(code: i64) -> Option<&'static HoldCodeInfo> {
    HOLD_CODES.get(&code)
}

/// Label for a code, falling back to `Code <n>` for unknown codes.
pub fn hold_code_label(code: i64) -> String {
    match lookup_hold_code(code) {
        Some(info) => info.label.to_string(),
        None => format!("Code {}", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(hold_code_label(1), "UserRequest");
        assert_eq!(hold_code_label(34), "JobOutOfResources");
        assert_eq!(hold_code_label(48), "HookShadowPrepareJobFailure");
        assert_eq!(
            lookup_hold_code(26).unwrap().reason,
            "SYSTEM_PERIODIC_HOLD evaluated to true."
        );
    }

    #[test]
    fn test_unknown_code() {
        assert!(lookup_hold_code(2).is_none());
        assert_eq!(hold_code_label(99), "Code 99");
    }
}
