use crate::detectors::builder::DetectorBuilder;
use crate::detectors::traits::{Detector, DetectorCategory, DetectorInfo};

/// Windows Forms on .NET Framework or .NET.
pub struct WinFormsDetector;

impl Detector for WinFormsDetector {
    fn info(&self) -> DetectorInfo {
        DetectorInfo::new("WinFormsDetector", "WinForms", DetectorCategory::Framework)
            .with_description("Windows Forms")
    }

    fn define<'r>(&self, builder: DetectorBuilder<'r>) -> DetectorBuilder<'r> {
        builder
            .required("Windows Forms", |checks| {
                checks.contains_loaded_module("System.Windows.Forms.dll")
            })
            .optional("WinForms Window", |checks| {
                checks.contains_active_window("WindowsForms10.*")
            })
    }
}
