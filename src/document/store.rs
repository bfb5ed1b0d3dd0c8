//! Lab document persistence through the remote executor.
//!
//! Lab files live under a fixed root on the lab host; a write replaces the
//! whole file. The document is always written before any live-bridge
//! command so the persisted topology is the authoritative intent.

use log::debug;

use crate::error::Result;
use crate::transport::RemoteExec;

use super::codec;
use super::types::LabFile;

/// Root directory for lab files on the host.
pub const LABS_ROOT: &str = "/opt/unetlab/labs";

/// Absolute host path of a lab file given its API-reported lab path.
pub fn lab_file_path(lab_path: &str) -> String {
    format!("{}/{}", LABS_ROOT, lab_path.trim_start_matches('/'))
}

pub fn load(exec: &mut dyn RemoteExec, lab_path: &str) -> Result<LabFile> {
    let path = lab_file_path(lab_path);
    debug!("reading lab document from {}", path);
    let text = exec.read_file(&path)?;
    codec::decode(&text)
}

pub fn save(exec: &mut dyn RemoteExec, lab_path: &str, doc: &LabFile) -> Result<()> {
    let path = lab_file_path(lab_path);
    debug!("writing lab document to {}", path);
    exec.write_file(&path, &codec::encode(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_file_path() {
        assert_eq!(
            lab_file_path("/demo/link.unl"),
            "/opt/unetlab/labs/demo/link.unl"
        );
        assert_eq!(lab_file_path("link.unl"), "/opt/unetlab/labs/link.unl");
    }
}
