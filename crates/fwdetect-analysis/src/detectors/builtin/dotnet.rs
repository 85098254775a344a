use crate::detectors::builder::DetectorBuilder;
use crate::detectors::traits::{Detector, DetectorCategory, DetectorInfo};

/// .NET (Core) on CoreCLR.
pub struct DotNetDetector;

impl Detector for DotNetDetector {
    fn info(&self) -> DetectorInfo {
        DetectorInfo::new("DotNetDetector", "DotNet", DetectorCategory::Framework)
            .with_description(".NET (CoreCLR)")
    }

    fn define<'r>(&self, builder: DetectorBuilder<'r>) -> DetectorBuilder<'r> {
        builder
            .required("CoreCLR", |checks| checks.contains_loaded_module("coreclr.dll"))
            .optional("Host", |checks| checks.contains_loaded_module("hostfxr.dll"))
            .optional("JIT", |checks| checks.contains_loaded_module("clrjit.dll"))
    }
}
