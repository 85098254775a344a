use crate::detectors::builder::DetectorBuilder;
use crate::detectors::traits::{Detector, DetectorCategory, DetectorInfo};

/// Windows Presentation Foundation.
pub struct WpfDetector;

impl Detector for WpfDetector {
    fn info(&self) -> DetectorInfo {
        DetectorInfo::new("WPFDetector", "WPF", DetectorCategory::Framework)
            .with_description("Windows Presentation Foundation")
    }

    fn define<'r>(&self, builder: DetectorBuilder<'r>) -> DetectorBuilder<'r> {
        builder
            .required("Presentation Framework", |checks| {
                checks.contains_module("PresentationFramework.dll")
            })
            .required("Presentation Core", |checks| {
                checks.contains_module("PresentationCore.dll")
            })
            .optional("WPF Window", |checks| {
                checks.contains_active_window("HwndWrapper*")
            })
    }
}
