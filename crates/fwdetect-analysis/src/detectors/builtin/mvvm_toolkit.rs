use crate::detectors::builder::DetectorBuilder;
use crate::detectors::traits::{Detector, DetectorCategory, DetectorInfo};

/// MVVM Toolkit, current and legacy package names.
pub struct MvvmToolkitDetector;

impl Detector for MvvmToolkitDetector {
    fn info(&self) -> DetectorInfo {
        DetectorInfo::new("MVVMToolkitDetector", "MVVM", DetectorCategory::Library)
            .with_description("MVVM Toolkit")
    }

    fn define<'r>(&self, builder: DetectorBuilder<'r>) -> DetectorBuilder<'r> {
        builder.required_any_of("Toolkit Assembly", |alts| {
            alts.alternative("New Version", |checks| {
                checks.contains_module("CommunityToolkit.Mvvm.dll")
            })
            .alternative("Old Version", |checks| {
                checks.contains_module("Microsoft.Toolkit.Mvvm.dll")
            })
        })
    }
}
